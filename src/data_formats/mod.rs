mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_RECIPES_LIMIT, MAX_PAGE_SIZE};
use crate::errors::RequestError;

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct PageQueryParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct SubscriptionQueryParams {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub recipes_limit: Option<u32>,
}

impl SubscriptionQueryParams {
    pub fn recipes_limit(&self) -> u32 {
        self.recipes_limit.unwrap_or(DEFAULT_RECIPES_LIMIT)
    }
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct IngredientQueryParams {
    #[serde(default)]
    pub name: Option<String>,
}

/// Query string of `GET /recipes`. Parsed by hand from the raw pairs since
/// `tags` may repeat.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeQueryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub author: Option<i64>,
    pub tags: Vec<String>,
}

impl RecipeQueryParams {
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, RequestError> {
        let mut params = RecipeQueryParams::default();
        for (key, value) in pairs {
            match key.as_str() {
                "page" => params.page = Some(parse_number(key, value)?),
                "limit" => params.limit = Some(parse_number(key, value)?),
                "is_favorited" => params.is_favorited = parse_flag(key, value)?,
                "is_in_shopping_cart" => params.is_in_shopping_cart = parse_flag(key, value)?,
                "author" => params.author = Some(parse_number(key, value)?),
                "tags" if !value.is_empty() => params.tags.push(value.clone()),
                _ => {}
            }
        }
        Ok(params)
    }

    pub fn pagination(&self) -> Result<Pagination, RequestError> {
        Pagination::new(self.page, self.limit)
    }
}

pub fn parse_query_pairs(raw: Option<&str>) -> Result<Vec<(String, String)>, RequestError> {
    match raw {
        Some(raw) => serde_urlencoded::from_str(raw)
            .map_err(|_| RequestError::Validation("Malformed query string.".into())),
        None => Ok(Vec::new()),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, RequestError> {
    match value {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" | "" => Ok(false),
        _ => Err(RequestError::Validation(format!(
            "{key}: Expected a boolean, got {value:?}."
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, RequestError> {
    value
        .parse()
        .map_err(|_| RequestError::Validation(format!("{key}: Expected a number, got {value:?}.")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, RequestError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(RequestError::NotFound("Invalid page."));
        }
        let limit = limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }

    /// Pages past the last one are missing, except the first page of an empty list.
    pub fn check_in_range(&self, count: i64) -> Result<(), RequestError> {
        if self.page > 1 && self.offset() >= count {
            return Err(RequestError::NotFound("Invalid page."));
        }
        Ok(())
    }
}
