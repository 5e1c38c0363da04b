use std::path::PathBuf;

use sqlx::{Sqlite, SqlitePool};

use crate::init_db;

/// Removes the database file and its WAL companions when dropped.
pub struct TempDatabase(PathBuf);

impl Drop for TempDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.0.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

/// A migrated database in a fresh temporary file. Keep the guard alive for
/// as long as the pool is used.
pub async fn test_pool() -> (SqlitePool, TempDatabase) {
    let path = std::env::temp_dir().join(format!("foodgram-unit-{}.db", rand::random::<u64>()));
    let pool = init_db(&format!("sqlite://{}", path.display()))
        .await
        .expect("test database");
    (pool, TempDatabase(path))
}

pub async fn insert_user(pool: &SqlitePool, username: &str) -> i64 {
    sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO users (email, username, first_name, last_name, password)
        VALUES ($1, $2, 'Test', 'User', 'not-a-hash')
        RETURNING id
        "#,
    )
    .bind(format!("{username}@example.com"))
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_ingredient(pool: &SqlitePool, name: &str, unit: &str) -> i64 {
    sqlx::query_scalar::<Sqlite, i64>(
        "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(unit)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn tag_id(pool: &SqlitePool, slug: &str) -> i64 {
    sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Inserts a recipe directly, skipping request validation.
pub async fn insert_recipe(
    pool: &SqlitePool,
    author_id: i64,
    name: &str,
    ingredients: &[(i64, i64)],
) -> i64 {
    let recipe_id = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        INSERT INTO recipes (author_id, name, text, image, cooking_time)
        VALUES ($1, $2, 'Test recipe', 'recipes/test.png', 10)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap();
    for (ingredient_id, amount) in ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .bind(amount)
        .execute(pool)
        .await
        .unwrap();
    }
    recipe_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropping_the_guard_removes_the_database_file() {
        let (pool, db) = test_pool().await;
        let path = db.0.clone();
        assert!(path.exists());

        pool.close().await;
        drop(db);
        assert!(!path.exists());
    }
}
