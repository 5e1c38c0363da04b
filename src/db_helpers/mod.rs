use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::User};

mod cart_helpers;
mod catalogue_helpers;
mod recipe_helpers;
mod relation_helpers;
mod user_helpers;

pub use cart_helpers::*;
pub use catalogue_helpers::*;
pub use recipe_helpers::*;
pub use relation_helpers::*;
pub use user_helpers::*;

/// Collects `column = $n` style fragments joined by a separator. Placeholders
/// are numbered after `reserved` parameters the caller binds first.
pub(crate) struct QueryBuilder {
    clauses: Vec<String>,
    params: Vec<String>,
    seperator: &'static str,
    reserved: usize,
}

impl QueryBuilder {
    pub(crate) fn new(seperator: &'static str, reserved: usize) -> Self {
        Self {
            clauses: vec![],
            params: vec![],
            seperator,
            reserved,
        }
    }

    /// Registers a parameter and returns its placeholder.
    pub(crate) fn placeholder(&mut self, value: String) -> String {
        self.params.push(value);
        format!("${}", self.reserved + self.params.len())
    }

    pub(crate) fn add_param(mut self, column: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            let placeholder = self.placeholder(value);
            self.clauses.push(format!("{column} = {placeholder}"));
        }
        self
    }

    pub(crate) fn add_clause(mut self, clause: String) -> Self {
        self.clauses.push(clause);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub(crate) fn build(self) -> (String, Vec<String>) {
        (self.clauses.join(self.seperator), self.params)
    }
}

// ----------------- Helper Functions -----------------

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password, avatar, created_at";

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(result)
}

pub(crate) async fn row_exists(
    pool: &SqlitePool,
    table: &'static str,
    id: i64,
) -> Result<bool, RequestError> {
    let query = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE id = $1)");
    let exists = sqlx::query_scalar::<Sqlite, bool>(&query)
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}
