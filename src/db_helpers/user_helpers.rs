use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::{Pagination, RegisterRequest},
    errors::{is_unique_violation, RequestError},
    models::{FollowedAuthor, Profile, ShortRecipe, User},
};

const PROFILE_QUERY: &str = r#"
    SELECT users.id,
           users.email,
           users.username,
           users.first_name,
           users.last_name,
           users.avatar,
           EXISTS (SELECT 1
                   FROM   follows
                   WHERE  follows.author_id = users.id
                          AND follows.follower_id = $1) AS is_subscribed
    FROM   users
"#;

pub async fn insert_user(
    pool: &SqlitePool,
    user: &RegisterRequest,
    password_hash: &str,
) -> Result<User, RequestError> {
    let result = sqlx::query_as::<Sqlite, User>(
        r#"
        INSERT INTO users (email, username, first_name, last_name, password)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, email, username, first_name, last_name, password, avatar, created_at
        "#,
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(user) => Ok(user),
        Err(e) if is_unique_violation(&e) => Err(RequestError::Validation(
            "A user with that email or username already exists.".into(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn get_profile_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
    profile_id: i64,
) -> Result<Option<Profile>, RequestError> {
    let query = format!("{PROFILE_QUERY} WHERE users.id = $2");
    let result = sqlx::query_as::<Sqlite, Profile>(&query)
        .bind(viewer)
        .bind(profile_id)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub async fn list_profiles_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
    pagination: Pagination,
) -> Result<(Vec<Profile>, i64), RequestError> {
    let count = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let query = format!("{PROFILE_QUERY} ORDER BY users.username LIMIT $2 OFFSET $3");
    let profiles = sqlx::query_as::<Sqlite, Profile>(&query)
        .bind(viewer)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(pool)
        .await?;
    Ok((profiles, count))
}

/// The author's profile from `viewer`'s point of view, with the newest
/// `recipes_limit` recipes and a total recipe count.
pub async fn get_followed_author_in_db(
    pool: &SqlitePool,
    viewer: i64,
    author_id: i64,
    recipes_limit: u32,
) -> Result<Option<FollowedAuthor>, RequestError> {
    let profile = match get_profile_in_db(pool, Some(viewer), author_id).await? {
        Some(profile) => profile,
        None => return Ok(None),
    };
    let recipes = sqlx::query_as::<Sqlite, ShortRecipe>(
        r#"
        SELECT id, name, image, cooking_time
        FROM recipes
        WHERE author_id = $1
        ORDER BY id DESC
        LIMIT $2
        "#,
    )
    .bind(author_id)
    .bind(i64::from(recipes_limit))
    .fetch_all(pool)
    .await?;
    let recipes_count =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(pool)
            .await?;
    Ok(Some(FollowedAuthor {
        profile,
        recipes,
        recipes_count,
    }))
}

pub async fn list_subscriptions_in_db(
    pool: &SqlitePool,
    follower_id: i64,
    pagination: Pagination,
    recipes_limit: u32,
) -> Result<(Vec<FollowedAuthor>, i64), RequestError> {
    let count =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(follower_id)
            .fetch_one(pool)
            .await?;
    let author_ids = sqlx::query_scalar::<Sqlite, i64>(
        r#"
        SELECT follows.author_id
        FROM follows
        JOIN users ON users.id = follows.author_id
        WHERE follows.follower_id = $1
        ORDER BY users.username
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(follower_id)
    .bind(i64::from(pagination.limit))
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    let mut authors = Vec::with_capacity(author_ids.len());
    for author_id in author_ids {
        if let Some(author) =
            get_followed_author_in_db(pool, follower_id, author_id, recipes_limit).await?
        {
            authors.push(author);
        }
    }
    Ok((authors, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_helpers::{add_relation, Follow};
    use crate::test_utils::{insert_recipe, insert_user as insert_plain_user, test_pool};

    fn register(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            username: username.into(),
            first_name: "Test".into(),
            last_name: "User".into(),
            password: "unused".into(),
        }
    }

    fn usernames(authors: &[FollowedAuthor]) -> Vec<String> {
        authors.iter().map(|a| a.profile.username.clone()).collect()
    }

    #[tokio::test]
    async fn duplicate_email_is_a_validation_error() {
        let (pool, _db) = test_pool().await;
        insert_user(&pool, &register("cook", "cook@example.com"), "hash")
            .await
            .unwrap();

        let result = insert_user(&pool, &register("chef", "cook@example.com"), "hash").await;
        assert!(matches!(result, Err(RequestError::Validation(_))));
    }

    #[tokio::test]
    async fn followed_author_embeds_newest_recipes_up_to_the_limit() {
        let (pool, _db) = test_pool().await;
        let reader = insert_plain_user(&pool, "reader").await;
        let author = insert_plain_user(&pool, "author").await;
        let mut recipes = Vec::new();
        for name in ["First", "Second", "Third", "Fourth"] {
            recipes.push(insert_recipe(&pool, author, name, &[]).await);
        }
        add_relation::<Follow>(&pool, reader, author, &3).await.unwrap();

        let followed = get_followed_author_in_db(&pool, reader, author, 2)
            .await
            .unwrap()
            .unwrap();
        assert!(followed.profile.is_subscribed);
        assert_eq!(followed.recipes_count, 4);
        let ids: Vec<i64> = followed.recipes.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![recipes[3], recipes[2]]);

        let own_view = get_followed_author_in_db(&pool, author, author, 0)
            .await
            .unwrap()
            .unwrap();
        assert!(!own_view.profile.is_subscribed);
        assert!(own_view.recipes.is_empty());
        assert_eq!(own_view.recipes_count, 4);

        assert!(get_followed_author_in_db(&pool, reader, 999, 2)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn subscriptions_are_paginated_by_username() {
        let (pool, _db) = test_pool().await;
        let reader = insert_plain_user(&pool, "reader").await;
        for username in ["carol", "alice", "bob"] {
            let author = insert_plain_user(&pool, username).await;
            insert_recipe(&pool, author, "Dish", &[]).await;
            add_relation::<Follow>(&pool, reader, author, &3).await.unwrap();
        }
        let first = Pagination::new(Some(1), Some(2)).unwrap();
        let (authors, count) = list_subscriptions_in_db(&pool, reader, first, 0)
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(usernames(&authors), vec!["alice", "bob"]);
        assert!(authors.iter().all(|a| a.recipes.is_empty() && a.recipes_count == 1));

        let second = Pagination::new(Some(2), Some(2)).unwrap();
        let (authors, count) = list_subscriptions_in_db(&pool, reader, second, 1)
            .await
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(usernames(&authors), vec!["carol"]);
        assert_eq!(authors[0].recipes.len(), 1);
    }
}
