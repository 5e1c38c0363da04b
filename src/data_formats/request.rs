use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::{
    INGREDIENT_MAX_AMOUNT, INGREDIENT_MIN_AMOUNT, RECIPE_MAX_COOKING_TIME,
    RECIPE_MIN_COOKING_TIME, RECIPE_NAME_LENGTH, USER_EMAIL_LENGTH, USER_NAME_LENGTH,
};
use crate::errors::RequestError;

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.email.len() > USER_EMAIL_LENGTH || !self.email.contains('@') {
            return Err(RequestError::Validation("email: Enter a valid email address.".into()));
        }
        let username_ok = !self.username.is_empty()
            && self
                .username
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'));
        if !username_ok || self.username.len() > USER_NAME_LENGTH {
            return Err(RequestError::Validation(
                "username: Letters, digits and @/./+/-/_ only.".into(),
            ));
        }
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.trim().is_empty() || value.len() > USER_NAME_LENGTH {
                return Err(RequestError::Validation(format!(
                    "{field}: Must be between 1 and {USER_NAME_LENGTH} characters."
                )));
            }
        }
        if self.password.is_empty() {
            return Err(RequestError::Validation("password: This field may not be blank.".into()));
        }
        Ok(())
    }
}

// ----------------- Recipe Request -----------------
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct IngredientAmount {
    pub id: i64,
    pub amount: i64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CreateRecipeRequest {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i64>,
    pub image: String,
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
}

/// PATCH body. Ingredients and tags are always replaced, so both are
/// required even though the other fields are optional.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateRecipeRequest {
    pub ingredients: Option<Vec<IngredientAmount>>,
    pub tags: Option<Vec<i64>>,
    pub image: Option<String>,
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
}

/// A recipe's ingredient and tag lists after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeComposition {
    pub ingredients: Vec<IngredientAmount>,
    pub tags: Vec<i64>,
}

impl CreateRecipeRequest {
    pub fn validate(&self) -> Result<RecipeComposition, RequestError> {
        validate_name(&self.name)?;
        validate_not_blank("text", &self.text)?;
        validate_not_blank("image", &self.image)?;
        validate_cooking_time(self.cooking_time)?;
        validate_composition(&self.ingredients, &self.tags)
    }
}

impl UpdateRecipeRequest {
    pub fn validate(&self) -> Result<RecipeComposition, RequestError> {
        let ingredients = self.ingredients.as_ref().ok_or_else(|| {
            RequestError::Validation("ingredients: This field is required.".into())
        })?;
        let tags = self
            .tags
            .as_ref()
            .ok_or_else(|| RequestError::Validation("tags: This field is required.".into()))?;
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(text) = &self.text {
            validate_not_blank("text", text)?;
        }
        if let Some(image) = &self.image {
            validate_not_blank("image", image)?;
        }
        if let Some(cooking_time) = self.cooking_time {
            validate_cooking_time(cooking_time)?;
        }
        validate_composition(ingredients, tags)
    }
}

fn validate_name(name: &str) -> Result<(), RequestError> {
    validate_not_blank("name", name)?;
    if name.chars().count() > RECIPE_NAME_LENGTH {
        return Err(RequestError::Validation(format!(
            "name: Ensure this field has no more than {RECIPE_NAME_LENGTH} characters."
        )));
    }
    Ok(())
}

fn validate_not_blank(field: &str, value: &str) -> Result<(), RequestError> {
    if value.trim().is_empty() {
        return Err(RequestError::Validation(format!(
            "{field}: This field may not be blank."
        )));
    }
    Ok(())
}

fn validate_cooking_time(cooking_time: i64) -> Result<(), RequestError> {
    if cooking_time < RECIPE_MIN_COOKING_TIME {
        return Err(RequestError::Validation(format!(
            "cooking_time: Ensure this value is greater than or equal to {RECIPE_MIN_COOKING_TIME}."
        )));
    }
    if cooking_time > RECIPE_MAX_COOKING_TIME {
        return Err(RequestError::Validation(format!(
            "cooking_time: Ensure this value is less than or equal to {RECIPE_MAX_COOKING_TIME}."
        )));
    }
    Ok(())
}

fn validate_composition(
    ingredients: &[IngredientAmount],
    tags: &[i64],
) -> Result<RecipeComposition, RequestError> {
    if ingredients.is_empty() {
        return Err(RequestError::InvalidOperation(
            "At least one ingredient is required.".into(),
        ));
    }
    if let Some(item) = ingredients.iter().find(|i| i.amount < INGREDIENT_MIN_AMOUNT) {
        return Err(RequestError::Validation(format!(
            "amount: Ingredient {} needs an amount of at least {INGREDIENT_MIN_AMOUNT}.",
            item.id
        )));
    }
    if let Some(item) = ingredients.iter().find(|i| i.amount > INGREDIENT_MAX_AMOUNT) {
        return Err(RequestError::Validation(format!(
            "amount: Ingredient {} needs an amount of at most {INGREDIENT_MAX_AMOUNT}.",
            item.id
        )));
    }
    let duplicates = duplicate_ids(ingredients.iter().map(|i| i.id));
    if !duplicates.is_empty() {
        return Err(RequestError::InvalidOperation(format!(
            "Ingredients must not repeat: {duplicates:?}."
        )));
    }

    if tags.is_empty() {
        return Err(RequestError::InvalidOperation("At least one tag is required.".into()));
    }
    let duplicates = duplicate_ids(tags.iter().copied());
    if !duplicates.is_empty() {
        return Err(RequestError::InvalidOperation(format!(
            "Tags must not repeat: {duplicates:?}."
        )));
    }

    Ok(RecipeComposition {
        ingredients: ingredients.to_vec(),
        tags: tags.to_vec(),
    })
}

fn duplicate_ids(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();
    for id in ids {
        if !seen.insert(id) && !duplicates.contains(&id) {
            duplicates.push(id);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> CreateRecipeRequest {
        CreateRecipeRequest {
            ingredients: vec![
                IngredientAmount { id: 1, amount: 200 },
                IngredientAmount { id: 2, amount: 2 },
            ],
            tags: vec![1, 2],
            image: "recipes/pancakes.png".into(),
            name: "Pancakes".into(),
            text: "Mix and fry.".into(),
            cooking_time: 20,
        }
    }

    #[test]
    fn valid_recipe_passes() {
        let composition = recipe().validate().unwrap();
        assert_eq!(composition.tags, vec![1, 2]);
        assert_eq!(composition.ingredients.len(), 2);
    }

    #[test]
    fn empty_ingredients_is_invalid_operation() {
        let mut request = recipe();
        request.ingredients.clear();
        assert!(matches!(request.validate(), Err(RequestError::InvalidOperation(_))));
    }

    #[test]
    fn empty_tags_is_invalid_operation() {
        let mut request = recipe();
        request.tags.clear();
        assert!(matches!(request.validate(), Err(RequestError::InvalidOperation(_))));
    }

    #[test]
    fn duplicate_ingredient_is_invalid_operation() {
        let mut request = recipe();
        request.ingredients.push(IngredientAmount { id: 1, amount: 5 });
        match request.validate() {
            Err(RequestError::InvalidOperation(message)) => assert!(message.contains("[1]")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn duplicate_tag_is_invalid_operation() {
        let mut request = recipe();
        request.tags = vec![3, 3, 3];
        match request.validate() {
            Err(RequestError::InvalidOperation(message)) => assert!(message.contains("[3]")),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn amounts_and_cooking_time_below_minimum_are_validation_errors() {
        let mut request = recipe();
        request.ingredients[0].amount = 0;
        assert!(matches!(request.validate(), Err(RequestError::Validation(_))));

        let mut request = recipe();
        request.cooking_time = 0;
        assert!(matches!(request.validate(), Err(RequestError::Validation(_))));
    }

    #[test]
    fn amounts_and_cooking_time_above_maximum_are_validation_errors() {
        let mut request = recipe();
        request.ingredients[0].amount = INGREDIENT_MAX_AMOUNT;
        request.cooking_time = RECIPE_MAX_COOKING_TIME;
        assert!(request.validate().is_ok());

        let mut request = recipe();
        request.ingredients[1].amount = INGREDIENT_MAX_AMOUNT + 1;
        match request.validate() {
            Err(RequestError::Validation(message)) => assert!(message.contains("at most 32767")),
            other => panic!("unexpected result {other:?}"),
        }

        let mut request = recipe();
        request.ingredients[0].amount = i64::MAX / 2 + 1;
        assert!(matches!(request.validate(), Err(RequestError::Validation(_))));

        let mut request = recipe();
        request.cooking_time = RECIPE_MAX_COOKING_TIME + 1;
        assert!(matches!(request.validate(), Err(RequestError::Validation(_))));
    }

    #[test]
    fn blank_or_long_name_is_rejected() {
        let mut request = recipe();
        request.name = "   ".into();
        assert!(matches!(request.validate(), Err(RequestError::Validation(_))));

        let mut request = recipe();
        request.name = "x".repeat(RECIPE_NAME_LENGTH + 1);
        assert!(matches!(request.validate(), Err(RequestError::Validation(_))));
    }

    #[test]
    fn update_requires_ingredients_and_tags() {
        let request = UpdateRecipeRequest {
            name: Some("Renamed".into()),
            tags: Some(vec![1]),
            ..Default::default()
        };
        match request.validate() {
            Err(RequestError::Validation(message)) => assert!(message.starts_with("ingredients")),
            other => panic!("unexpected result {other:?}"),
        }

        let request = UpdateRecipeRequest {
            ingredients: Some(vec![IngredientAmount { id: 4, amount: 1 }]),
            tags: Some(vec![1]),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn register_request_rejects_bad_username() {
        let request = RegisterRequest {
            email: "cook@example.com".into(),
            username: "bad name!".into(),
            first_name: "Ann".into(),
            last_name: "Cook".into(),
            password: "secret".into(),
        };
        assert!(matches!(request.validate(), Err(RequestError::Validation(_))));
    }
}
