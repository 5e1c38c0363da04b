use serde::{Deserialize, Serialize};

use crate::models::{
    FollowedAuthor, Ingredient, Profile, RecipeDetail, RecipeIngredient, ShortRecipe, Tag, User,
};

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TokenResponse {
    pub auth_token: String,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProfileResponse {
    pub email: String,
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeIngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RecipeResponse {
    pub id: i64,
    pub tags: Vec<TagResponse>,
    pub author: ProfileResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq)]
pub struct ShortRecipeResponse {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct FollowedAuthorResponse {
    #[serde(flatten)]
    pub profile: ProfileResponse,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

impl UserResponse {
    pub fn new(
        User {
            id,
            email,
            username,
            first_name,
            last_name,
            ..
        }: User,
    ) -> Self {
        UserResponse {
            email,
            id,
            username,
            first_name,
            last_name,
        }
    }
}

impl From<Profile> for ProfileResponse {
    fn from(
        Profile {
            id,
            email,
            username,
            first_name,
            last_name,
            avatar,
            is_subscribed,
        }: Profile,
    ) -> Self {
        ProfileResponse {
            email,
            id,
            username,
            first_name,
            last_name,
            is_subscribed,
            avatar,
        }
    }
}

impl From<Tag> for TagResponse {
    fn from(Tag { id, name, slug }: Tag) -> Self {
        TagResponse { id, name, slug }
    }
}

impl From<Ingredient> for IngredientResponse {
    fn from(
        Ingredient {
            id,
            name,
            measurement_unit,
        }: Ingredient,
    ) -> Self {
        IngredientResponse {
            id,
            name,
            measurement_unit,
        }
    }
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(
        RecipeIngredient {
            id,
            name,
            measurement_unit,
            amount,
        }: RecipeIngredient,
    ) -> Self {
        RecipeIngredientResponse {
            id,
            name,
            measurement_unit,
            amount,
        }
    }
}

impl From<ShortRecipe> for ShortRecipeResponse {
    fn from(
        ShortRecipe {
            id,
            name,
            image,
            cooking_time,
        }: ShortRecipe,
    ) -> Self {
        ShortRecipeResponse {
            id,
            name,
            image,
            cooking_time,
        }
    }
}

impl RecipeResponse {
    pub fn new(
        RecipeDetail {
            recipe,
            author,
            tags,
            ingredients,
        }: RecipeDetail,
    ) -> Self {
        RecipeResponse {
            id: recipe.id,
            tags: tags.into_iter().map(TagResponse::from).collect(),
            author: author.into(),
            ingredients: ingredients
                .into_iter()
                .map(RecipeIngredientResponse::from)
                .collect(),
            is_favorited: recipe.is_favorited,
            is_in_shopping_cart: recipe.is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

impl FollowedAuthorResponse {
    pub fn new(
        FollowedAuthor {
            profile,
            recipes,
            recipes_count,
        }: FollowedAuthor,
    ) -> Self {
        FollowedAuthorResponse {
            profile: profile.into(),
            recipes: recipes.into_iter().map(ShortRecipeResponse::from).collect(),
            recipes_count,
        }
    }
}
