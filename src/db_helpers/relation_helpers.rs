//! Add/remove for the three binary relations: favorite(user, recipe),
//! cart(user, recipe) and follow(follower, author).
//!
//! The storage layer's `UNIQUE (subject, target)` constraint decides races:
//! a losing concurrent `add` surfaces as `Conflict`, a losing concurrent
//! `remove` as `NotFound`. Nothing is retried.

use sqlx::{Sqlite, SqlitePool};
use tracing::info;

use crate::errors::{is_foreign_key_violation, is_unique_violation, RequestError};
use crate::models::{FollowedAuthor, ShortRecipe};

use super::{get_followed_author_in_db, get_short_recipe_in_db, row_exists};

#[axum::async_trait]
pub trait RelationKind {
    /// Relationship table and its two endpoint columns.
    const TABLE: &'static str;
    const SUBJECT_COLUMN: &'static str;
    const TARGET_COLUMN: &'static str;
    /// Table the target id points into.
    const TARGET_TABLE: &'static str;

    const TARGET_MISSING: &'static str;
    const ALREADY_EXISTS: &'static str;
    const NOT_PRESENT: &'static str;

    /// Extra knobs for the projection, e.g. how many recipes to embed.
    type Options: Sync;
    type Projection: Send;

    fn check_pair(_subject_id: i64, _target_id: i64) -> Result<(), RequestError> {
        Ok(())
    }

    async fn project(
        pool: &SqlitePool,
        subject_id: i64,
        target_id: i64,
        options: &Self::Options,
    ) -> Result<Option<Self::Projection>, RequestError>;
}

pub struct Favorite;
pub struct CartItem;
pub struct Follow;

#[axum::async_trait]
impl RelationKind for Favorite {
    const TABLE: &'static str = "favorites";
    const SUBJECT_COLUMN: &'static str = "user_id";
    const TARGET_COLUMN: &'static str = "recipe_id";
    const TARGET_TABLE: &'static str = "recipes";

    const TARGET_MISSING: &'static str = "Recipe not found";
    const ALREADY_EXISTS: &'static str = "Recipe is already in favorites";
    const NOT_PRESENT: &'static str = "Recipe is not in favorites";

    type Options = ();
    type Projection = ShortRecipe;

    async fn project(
        pool: &SqlitePool,
        _subject_id: i64,
        target_id: i64,
        _options: &(),
    ) -> Result<Option<ShortRecipe>, RequestError> {
        get_short_recipe_in_db(pool, target_id).await
    }
}

#[axum::async_trait]
impl RelationKind for CartItem {
    const TABLE: &'static str = "cart_items";
    const SUBJECT_COLUMN: &'static str = "user_id";
    const TARGET_COLUMN: &'static str = "recipe_id";
    const TARGET_TABLE: &'static str = "recipes";

    const TARGET_MISSING: &'static str = "Recipe not found";
    const ALREADY_EXISTS: &'static str = "Recipe is already in the shopping cart";
    const NOT_PRESENT: &'static str = "Recipe is not in the shopping cart";

    type Options = ();
    type Projection = ShortRecipe;

    async fn project(
        pool: &SqlitePool,
        _subject_id: i64,
        target_id: i64,
        _options: &(),
    ) -> Result<Option<ShortRecipe>, RequestError> {
        get_short_recipe_in_db(pool, target_id).await
    }
}

#[axum::async_trait]
impl RelationKind for Follow {
    const TABLE: &'static str = "follows";
    const SUBJECT_COLUMN: &'static str = "follower_id";
    const TARGET_COLUMN: &'static str = "author_id";
    const TARGET_TABLE: &'static str = "users";

    const TARGET_MISSING: &'static str = "User not found";
    const ALREADY_EXISTS: &'static str = "You are already subscribed to this author";
    const NOT_PRESENT: &'static str = "You are not subscribed to this author";

    /// Recipes embedded per author.
    type Options = u32;
    type Projection = FollowedAuthor;

    fn check_pair(subject_id: i64, target_id: i64) -> Result<(), RequestError> {
        if subject_id == target_id {
            return Err(RequestError::InvalidOperation(
                "You cannot subscribe to yourself".into(),
            ));
        }
        Ok(())
    }

    async fn project(
        pool: &SqlitePool,
        subject_id: i64,
        target_id: i64,
        recipes_limit: &u32,
    ) -> Result<Option<FollowedAuthor>, RequestError> {
        get_followed_author_in_db(pool, subject_id, target_id, *recipes_limit).await
    }
}

/// A freshly created relationship row plus the projection of its target.
#[derive(Debug)]
pub struct Relation<P> {
    pub id: i64,
    pub subject_id: i64,
    pub target_id: i64,
    pub target: P,
}

pub async fn add_relation<K: RelationKind>(
    pool: &SqlitePool,
    subject_id: i64,
    target_id: i64,
    options: &K::Options,
) -> Result<Relation<K::Projection>, RequestError> {
    if !row_exists(pool, K::TARGET_TABLE, target_id).await? {
        return Err(RequestError::NotFound(K::TARGET_MISSING));
    }
    K::check_pair(subject_id, target_id)?;

    let query = format!(
        "INSERT INTO {} ({}, {}) VALUES ($1, $2) RETURNING id",
        K::TABLE,
        K::SUBJECT_COLUMN,
        K::TARGET_COLUMN
    );
    let id = match sqlx::query_scalar::<Sqlite, i64>(&query)
        .bind(subject_id)
        .bind(target_id)
        .fetch_one(pool)
        .await
    {
        Ok(id) => id,
        Err(e) if is_unique_violation(&e) => return Err(RequestError::Conflict(K::ALREADY_EXISTS)),
        Err(e) if is_foreign_key_violation(&e) => {
            return Err(RequestError::NotFound(K::TARGET_MISSING))
        }
        Err(e) => return Err(e.into()),
    };
    info!(table = K::TABLE, subject_id, target_id, "relation added");

    let target = K::project(pool, subject_id, target_id, options)
        .await?
        .ok_or(RequestError::NotFound(K::TARGET_MISSING))?;
    Ok(Relation {
        id,
        subject_id,
        target_id,
        target,
    })
}

pub async fn remove_relation<K: RelationKind>(
    pool: &SqlitePool,
    subject_id: i64,
    target_id: i64,
) -> Result<(), RequestError> {
    let query = format!(
        "DELETE FROM {} WHERE {} = $1 AND {} = $2",
        K::TABLE,
        K::SUBJECT_COLUMN,
        K::TARGET_COLUMN
    );
    let result = sqlx::query(&query)
        .bind(subject_id)
        .bind(target_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        if !row_exists(pool, K::TARGET_TABLE, target_id).await? {
            return Err(RequestError::NotFound(K::TARGET_MISSING));
        }
        return Err(RequestError::NotFound(K::NOT_PRESENT));
    }
    info!(table = K::TABLE, subject_id, target_id, "relation removed");
    Ok(())
}
