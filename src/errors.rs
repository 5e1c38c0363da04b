use axum::{http::StatusCode, response::IntoResponse, Json};
use tracing::error;

use crate::JsonResponse;

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("{0}")]
    InvalidOperation(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotAuthorized(&'static str),
    #[error("Forbidden")]
    Forbidden,
    #[error("Internal Server Error")]
    ServerError,
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJsonWrapper {
    pub errors: RequestErrorJson,
}

#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct RequestErrorJson {
    pub body: Vec<String>,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: RequestErrorJson {
                body: vec![error.to_string()],
            },
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::NotFound(_) => StatusCode::NOT_FOUND,
            RequestError::Conflict(_)
            | RequestError::InvalidOperation(_)
            | RequestError::Validation(_) => StatusCode::BAD_REQUEST,
            RequestError::NotAuthorized(_) => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden => StatusCode::FORBIDDEN,
            RequestError::ServerError | RequestError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJsonWrapper> {
        let message = match self {
            RequestError::DatabaseError(e) => {
                error!("Database error: {}", e);
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (self.status_code(), Json(RequestErrorJsonWrapper::new(&message)))
    }
}

/// True when the storage layer rejected a write because the row already exists.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => e.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}

pub fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => e.message().contains("FOREIGN KEY constraint failed"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_errors_map_to_client_statuses() {
        assert_eq!(
            RequestError::NotFound("Recipe not found").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::Conflict("Recipe is already in favorites").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::InvalidOperation("You cannot follow yourself".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::NotAuthorized("Need to be authorized").status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn error_body_uses_the_errors_envelope() {
        let (status, Json(body)) = RequestError::Conflict("Recipe is already in the shopping cart")
            .to_json_response();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.errors.body,
            vec!["Recipe is already in the shopping cart".to_string()]
        );
    }

    #[test]
    fn database_errors_do_not_leak_details() {
        let (status, Json(body)) =
            RequestError::DatabaseError(sqlx::Error::RowNotFound).to_json_response();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.errors.body, vec!["Internal Server Error".to_string()]);
    }

    #[test]
    fn non_database_errors_are_not_constraint_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_foreign_key_violation(&sqlx::Error::PoolTimedOut));
    }
}
