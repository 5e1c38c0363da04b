mod authentication;
pub mod config;
pub mod constants;
mod data_formats;
mod db_helpers;
mod errors;
mod filters;
mod handlers;
mod models;
pub mod shopping_list;
#[cfg(test)]
mod test_utils;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
pub use errors::{RequestErrorJson, RequestErrorJsonWrapper};
use handlers::*;
use shopping_list::{Clock, SystemClock};
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};
use tracing::info;

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, config: Config, pool: SqlitePool) -> Result<()> {
    let address = config.address()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let app = app
        .layer(Extension(Arc::new(pool)))
        .layer(Extension(clock))
        .layer(Extension(Arc::new(config)));
    info!("Server started on {}", address);
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    } else {
        info!("Database already exists");
    }
    let pool = SqlitePool::connect(db_url).await?;
    info!("Running Migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind an ephemeral port");
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        // ==== USERS ==== //
        .route("/users", get(list_users).post(register_user))
        .route("/users/login", post(login_user))
        .route("/users/me", get(get_current_user))
        .route("/users/subscriptions", get(list_subscriptions))
        .route("/users/:id", get(get_user_profile))
        .route(
            "/users/:id/subscribe",
            post(subscribe_to_author).delete(unsubscribe_from_author),
        )
        // ==== CATALOGUE ==== //
        .route("/tags", get(list_tags))
        .route("/tags/:id", get(get_tag))
        .route("/ingredients", get(list_ingredients))
        .route("/ingredients/:id", get(get_ingredient))
        // ==== RECIPES ==== //
        .route("/recipes", get(list_recipes).post(create_recipe))
        .route("/recipes/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/recipes/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/recipes/:id/get-link", get(get_recipe_short_link))
        .route(
            "/recipes/:id/favorite",
            post(favorite_recipe).delete(unfavorite_recipe),
        )
        .route(
            "/recipes/:id/shopping_cart",
            post(add_to_shopping_cart).delete(remove_from_shopping_cart),
        )
        .route("/s/:id", get(follow_short_link))
        .fallback(not_found)
}
