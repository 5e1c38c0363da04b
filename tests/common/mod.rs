#![allow(dead_code)]

use std::{path::PathBuf, time::Duration};

use foodgram::{get_random_free_port, init_db, make_router, run_app, Config};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use sqlx::{Sqlite, SqlitePool};

pub const JWT_SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub address: String,
    pub pool: SqlitePool,
    pub client: Client,
    db_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.db_path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

pub async fn spawn_app() -> TestApp {
    std::env::set_var("JWT_SECRET", JWT_SECRET);
    let db_path =
        std::env::temp_dir().join(format!("foodgram-it-{}.db", rand::random::<u64>()));
    let database_url = format!("sqlite://{}", db_path.display());
    let pool = init_db(&database_url).await.expect("test database");

    let (port, _) = get_random_free_port();
    let address = format!("http://127.0.0.1:{port}");
    let config = Config {
        host: "127.0.0.1".into(),
        port,
        database_url,
        public_url: address.clone(),
    };
    tokio::spawn(run_app(make_router(), config, pool.clone()));

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let app = TestApp {
        address,
        pool,
        client,
        db_path,
    };
    app.wait_until_alive().await;
    app
}

impl TestApp {
    async fn wait_until_alive(&self) {
        for _ in 0..50 {
            if let Ok(response) = self.get("/check_health", None).send().await {
                if response.status().is_success() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server did not start at {}", self.address);
    }

    fn with_token(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.header("Authorization", format!("Token {token}")),
            None => builder,
        }
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        Self::with_token(self.client.get(format!("{}{path}", self.address)), token)
    }

    pub fn post(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        Self::with_token(self.client.post(format!("{}{path}", self.address)), token)
    }

    pub fn patch(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        Self::with_token(self.client.patch(format!("{}{path}", self.address)), token)
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        Self::with_token(self.client.delete(format!("{}{path}", self.address)), token)
    }

    /// Registers `username` and logs in.
    pub async fn register(&self, username: &str) -> TestUser {
        let email = format!("{username}@example.com");
        let response = self
            .post("/users", None)
            .json(&json!({
                "email": email,
                "username": username,
                "first_name": "Test",
                "last_name": "User",
                "password": "correct-horse",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = response.json::<Value>().await.unwrap()["id"]
            .as_i64()
            .unwrap();

        let response = self
            .post("/users/login", None)
            .json(&json!({ "email": email, "password": "correct-horse" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = response.json::<Value>().await.unwrap()["auth_token"]
            .as_str()
            .unwrap()
            .to_string();
        TestUser { id, token }
    }

    /// Ingredients are a read-only catalogue over HTTP, so they are seeded directly.
    pub async fn ingredient(&self, name: &str, unit: &str) -> i64 {
        sqlx::query_scalar::<Sqlite, i64>(
            "INSERT INTO ingredients (name, measurement_unit) VALUES ($1, $2) RETURNING id",
        )
        .bind(name)
        .bind(unit)
        .fetch_one(&self.pool)
        .await
        .unwrap()
    }

    pub async fn tag_id(&self, slug: &str) -> i64 {
        let tags: Vec<Value> = self
            .get("/tags", None)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        tags.iter()
            .find(|tag| tag["slug"] == slug)
            .and_then(|tag| tag["id"].as_i64())
            .unwrap()
    }

    pub async fn create_recipe(
        &self,
        author: &TestUser,
        name: &str,
        ingredients: &[(i64, i64)],
        tag_slugs: &[&str],
    ) -> i64 {
        let mut tags = Vec::new();
        for slug in tag_slugs {
            tags.push(self.tag_id(slug).await);
        }
        let ingredients: Vec<Value> = ingredients
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect();
        let response = self
            .post("/recipes", Some(&author.token))
            .json(&json!({
                "ingredients": ingredients,
                "tags": tags,
                "image": "recipes/images/dish.png",
                "name": name,
                "text": "Mix and cook.",
                "cooking_time": 20,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json::<Value>().await.unwrap()["id"]
            .as_i64()
            .unwrap()
    }
}

pub async fn error_message(response: Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["errors"]["body"][0].as_str().unwrap().to_string()
}
