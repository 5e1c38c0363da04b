use serde::{Deserialize, Serialize};

use super::Pagination;

/// A page of results in the `{count, next, previous, results}` shape.
#[derive(Debug, Deserialize, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Rebuilds the request URL with a different `page` for next/previous links.
pub struct PageLinks {
    base: String,
    pairs: Vec<(String, String)>,
}

impl PageLinks {
    pub fn new(public_url: &str, path: &str, pairs: Vec<(String, String)>) -> Self {
        PageLinks {
            base: format!("{}{}", public_url.trim_end_matches('/'), path),
            pairs: pairs.into_iter().filter(|(key, _)| key != "page").collect(),
        }
    }

    fn url_for(&self, page: u32) -> String {
        let mut pairs = self.pairs.clone();
        if page > 1 {
            pairs.push(("page".to_string(), page.to_string()));
        }
        match serde_urlencoded::to_string(&pairs) {
            Ok(query) if !query.is_empty() => format!("{}?{}", self.base, query),
            _ => self.base.clone(),
        }
    }
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: i64, pagination: Pagination, links: &PageLinks) -> Self {
        let seen = pagination.offset() + results.len() as i64;
        let next = (seen < count).then(|| links.url_for(pagination.page + 1));
        let previous = (pagination.page > 1).then(|| links.url_for(pagination.page - 1));
        Page {
            count,
            next,
            previous,
            results,
        }
    }
}
