use foodgram::{init_db, make_router, run_app, Config};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };
    let pool = match init_db(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Database error: {:#}", e);
            std::process::exit(1);
        }
    };
    let router = make_router();
    if let Err(e) = run_app(router, config, pool).await {
        error!("Error: {:#}", e);
    }
}
