use sqlx::{Sqlite, SqlitePool};

use crate::{
    errors::RequestError,
    models::{Ingredient, Tag},
};

use super::QueryBuilder;

pub async fn get_tags_in_db(pool: &SqlitePool) -> Result<Vec<Tag>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Tag>("SELECT id, name, slug FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(result)
}

/// The slugs in `slugs` that name no tag, in request order.
pub async fn find_unknown_tag_slugs(
    pool: &SqlitePool,
    slugs: &[String],
) -> Result<Vec<String>, RequestError> {
    if slugs.is_empty() {
        return Ok(vec![]);
    }
    let mut builder = QueryBuilder::new(", ", 0);
    let placeholders = slugs
        .iter()
        .map(|slug| builder.placeholder(slug.clone()))
        .collect::<Vec<_>>()
        .join(", ");
    let (_, params) = builder.build();

    let query = format!("SELECT slug FROM tags WHERE slug IN ({placeholders})");
    let mut known = sqlx::query_scalar::<Sqlite, String>(&query);
    for param in params {
        known = known.bind(param);
    }
    let known = known.fetch_all(pool).await?;
    Ok(slugs
        .iter()
        .filter(|slug| !known.contains(slug))
        .cloned()
        .collect())
}

pub async fn get_tag_in_db(pool: &SqlitePool, id: i64) -> Result<Option<Tag>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Tag>("SELECT id, name, slug FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

/// Ingredients whose name starts with `prefix`, ignoring ASCII case.
pub async fn search_ingredients_in_db(
    pool: &SqlitePool,
    prefix: Option<&str>,
) -> Result<Vec<Ingredient>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Ingredient>(
        r#"
        SELECT id, name, measurement_unit
        FROM ingredients
        WHERE $1 IS NULL
           OR substr(lower(name), 1, length($1)) = lower($1)
        ORDER BY name, measurement_unit
        "#,
    )
    .bind(prefix)
    .fetch_all(pool)
    .await?;
    Ok(result)
}

pub async fn get_ingredient_in_db(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<Ingredient>, RequestError> {
    let result = sqlx::query_as::<Sqlite, Ingredient>(
        "SELECT id, name, measurement_unit FROM ingredients WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(result)
}
