use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::CartLine};

/// Sums ingredient amounts over every recipe in the user's cart.
///
/// Rows are grouped by ingredient id, so ingredients sharing a name but not a
/// unit stay separate lines. Ordered by name using the store's binary
/// collation, then by unit.
pub async fn get_cart_lines_in_db(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<CartLine>, RequestError> {
    let result = sqlx::query_as::<Sqlite, CartLine>(
        r#"
        SELECT ingredients.id                 AS ingredient_id,
               ingredients.name               AS name,
               ingredients.measurement_unit   AS measurement_unit,
               SUM(recipe_ingredients.amount) AS total_amount
        FROM   recipe_ingredients
               JOIN cart_items
                 ON cart_items.recipe_id = recipe_ingredients.recipe_id
               JOIN ingredients
                 ON ingredients.id = recipe_ingredients.ingredient_id
        WHERE  cart_items.user_id = $1
        GROUP  BY ingredients.id
        ORDER  BY ingredients.name, ingredients.measurement_unit
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(result)
}
