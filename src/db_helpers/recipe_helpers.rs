use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::data_formats::{
    CreateRecipeRequest, IngredientAmount, Pagination, RecipeComposition, UpdateRecipeRequest,
};
use crate::errors::RequestError;
use crate::filters::RecipeFilter;
use crate::models::{Recipe, RecipeDetail, RecipeIngredient, ShortRecipe, Tag};

use super::{find_unknown_tag_slugs, get_profile_in_db, QueryBuilder};

const RECIPE_QUERY: &str = r#"
    SELECT recipes.id,
           recipes.author_id,
           recipes.name,
           recipes.text,
           recipes.image,
           recipes.cooking_time,
           EXISTS (SELECT 1
                   FROM   favorites
                   WHERE  favorites.recipe_id = recipes.id
                          AND favorites.user_id = $1)  AS is_favorited,
           EXISTS (SELECT 1
                   FROM   cart_items
                   WHERE  cart_items.recipe_id = recipes.id
                          AND cart_items.user_id = $1) AS is_in_shopping_cart
    FROM   recipes
"#;

pub async fn list_recipes_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
    filter: &RecipeFilter,
    pagination: Pagination,
) -> Result<(Vec<RecipeDetail>, i64), RequestError> {
    if let Some(slug) = find_unknown_tag_slugs(pool, &filter.tags).await?.first() {
        return Err(RequestError::Validation(format!(
            "tags: Select a valid choice. {slug} is not one of the available choices."
        )));
    }

    let (count_where, count_params) = filter.to_sql(0);
    let count_query = format!("SELECT COUNT(*) FROM recipes {count_where}");
    let mut count = sqlx::query_scalar::<Sqlite, i64>(&count_query);
    for param in count_params {
        count = count.bind(param);
    }
    let count = count.fetch_one(pool).await?;
    pagination.check_in_range(count)?;

    // $1 is the viewer in the select list.
    let (where_clause, params) = filter.to_sql(1);
    let limit_at = params.len() + 2;
    let query = format!(
        "{RECIPE_QUERY} {where_clause} ORDER BY recipes.id DESC LIMIT ${limit_at} OFFSET ${}",
        limit_at + 1
    );
    let mut recipes = sqlx::query_as::<Sqlite, Recipe>(&query).bind(viewer);
    for param in params {
        recipes = recipes.bind(param);
    }
    let recipes = recipes
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;

    let mut result = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        result.push(load_recipe_detail(pool, viewer, recipe).await?);
    }
    Ok((result, count))
}

pub async fn get_recipe_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
    id: i64,
) -> Result<Option<RecipeDetail>, RequestError> {
    let query = format!("{RECIPE_QUERY} WHERE recipes.id = $2");
    let recipe = sqlx::query_as::<Sqlite, Recipe>(&query)
        .bind(viewer)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match recipe {
        Some(recipe) => Ok(Some(load_recipe_detail(pool, viewer, recipe).await?)),
        None => Ok(None),
    }
}

pub async fn get_short_recipe_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<ShortRecipe>, RequestError> {
    let result = sqlx::query_as::<Sqlite, ShortRecipe>(
        "SELECT id, name, image, cooking_time FROM recipes WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}

pub async fn get_recipe_author_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<i64>, RequestError> {
    let result = sqlx::query_scalar::<Sqlite, i64>("SELECT author_id FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

async fn load_recipe_detail(
    pool: &SqlitePool,
    viewer: Option<i64>,
    recipe: Recipe,
) -> Result<RecipeDetail, RequestError> {
    let author = get_profile_in_db(pool, viewer, recipe.author_id)
        .await?
        .ok_or(RequestError::ServerError)?;
    let tags = sqlx::query_as::<Sqlite, Tag>(
        r#"
        SELECT tags.id, tags.name, tags.slug
        FROM tags
        JOIN recipe_tags ON recipe_tags.tag_id = tags.id
        WHERE recipe_tags.recipe_id = $1
        ORDER BY tags.name
        "#,
    )
    .bind(recipe.id)
    .fetch_all(pool)
    .await?;
    let ingredients = sqlx::query_as::<Sqlite, RecipeIngredient>(
        r#"
        SELECT ingredients.id,
               ingredients.name,
               ingredients.measurement_unit,
               recipe_ingredients.amount
        FROM recipe_ingredients
        JOIN ingredients ON ingredients.id = recipe_ingredients.ingredient_id
        WHERE recipe_ingredients.recipe_id = $1
        ORDER BY recipe_ingredients.id
        "#,
    )
    .bind(recipe.id)
    .fetch_all(pool)
    .await?;
    Ok(RecipeDetail {
        recipe,
        author,
        tags,
        ingredients,
    })
}

pub async fn create_recipe_in_db(
    pool: &SqlitePool,
    author_id: i64,
    request: CreateRecipeRequest,
    composition: RecipeComposition,
) -> Result<RecipeDetail, RequestError> {
    let mut tx = pool.begin().await?;
    check_references(&mut tx, &composition).await?;

    let recipe_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO recipes (author_id, name, text, image, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(&request.name)
    .bind(&request.text)
    .bind(&request.image)
    .bind(request.cooking_time)
    .fetch_one(&mut tx)
    .await?;

    write_composition(&mut tx, recipe_id, &composition).await?;
    tx.commit().await?;

    get_recipe_in_db(pool, Some(author_id), recipe_id)
        .await?
        .ok_or(RequestError::NotFound("Recipe not found"))
}

/// Applies a PATCH. Tags and ingredient rows are replaced wholesale.
pub async fn update_recipe_in_db(
    pool: &SqlitePool,
    author_id: i64,
    recipe_id: i64,
    UpdateRecipeRequest {
        image,
        name,
        text,
        cooking_time,
        ..
    }: UpdateRecipeRequest,
    composition: RecipeComposition,
) -> Result<RecipeDetail, RequestError> {
    let mut tx = pool.begin().await?;
    let owner =
        sqlx::query_scalar::<Sqlite, i64>("SELECT author_id FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&mut tx)
            .await?;
    match owner {
        None => return Err(RequestError::NotFound("Recipe not found")),
        Some(owner) if owner != author_id => return Err(RequestError::Forbidden),
        Some(_) => {}
    }
    check_references(&mut tx, &composition).await?;

    let builder = QueryBuilder::new(", ", 1)
        .add_param("name", name)
        .add_param("text", text)
        .add_param("image", image)
        .add_param("cooking_time", cooking_time.map(|time| time.to_string()));
    if !builder.is_empty() {
        let (set_clause, params) = builder.build();
        let query = format!("UPDATE recipes SET {set_clause} WHERE id = $1");
        let mut query = sqlx::query(&query).bind(recipe_id);
        for param in params {
            query = query.bind(param);
        }
        query.execute(&mut tx).await?;
    }

    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut tx)
        .await?;
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut tx)
        .await?;
    write_composition(&mut tx, recipe_id, &composition).await?;
    tx.commit().await?;

    get_recipe_in_db(pool, Some(author_id), recipe_id)
        .await?
        .ok_or(RequestError::NotFound("Recipe not found"))
}

pub async fn delete_recipe_in_db(
    pool: &SqlitePool,
    author_id: i64,
    recipe_id: i64,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND author_id = $2")
        .bind(recipe_id)
        .bind(author_id)
        .execute(&mut tx)
        .await?;

    if result.rows_affected() == 0 {
        let exists = sqlx::query_scalar::<Sqlite, bool>(
            "SELECT EXISTS (SELECT 1 FROM recipes WHERE id = $1)",
        )
        .bind(recipe_id)
        .fetch_one(&mut tx)
        .await?;
        return Err(if exists {
            RequestError::Forbidden
        } else {
            RequestError::NotFound("Recipe not found")
        });
    }

    tx.commit().await?;
    Ok(())
}

async fn check_references(
    tx: &mut Transaction<'static, Sqlite>,
    composition: &RecipeComposition,
) -> Result<(), RequestError> {
    for IngredientAmount { id, .. } in &composition.ingredients {
        let exists = sqlx::query_scalar::<Sqlite, bool>(
            "SELECT EXISTS (SELECT 1 FROM ingredients WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if !exists {
            return Err(RequestError::Validation(format!(
                "ingredients: Invalid pk \"{id}\" - object does not exist."
            )));
        }
    }
    for id in &composition.tags {
        let exists =
            sqlx::query_scalar::<Sqlite, bool>("SELECT EXISTS (SELECT 1 FROM tags WHERE id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if !exists {
            return Err(RequestError::Validation(format!(
                "tags: Invalid pk \"{id}\" - object does not exist."
            )));
        }
    }
    Ok(())
}

async fn write_composition(
    tx: &mut Transaction<'static, Sqlite>,
    recipe_id: i64,
    composition: &RecipeComposition,
) -> Result<(), RequestError> {
    for tag_id in &composition.tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(recipe_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
    }
    for IngredientAmount { id, amount } in &composition.ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(id)
        .bind(amount)
        .execute(&mut *tx)
        .await?;
    }
    Ok(())
}
