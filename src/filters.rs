//! Turns the `GET /recipes` query flags into a SQL `WHERE` clause scoped to
//! the requesting user.
//!
//! Dimensions are combined with `AND`; the slugs inside `tags` with `OR`.
//! Flags that need a user (`is_favorited`, `is_in_shopping_cart`) are dropped
//! for anonymous requests instead of failing.

use crate::data_formats::RecipeQueryParams;
use crate::db_helpers::QueryBuilder;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecipeFilter {
    pub favorited_by: Option<i64>,
    pub in_cart_of: Option<i64>,
    pub author: Option<i64>,
    pub tags: Vec<String>,
}

impl RecipeFilter {
    pub fn new(params: &RecipeQueryParams, viewer: Option<i64>) -> Self {
        RecipeFilter {
            favorited_by: viewer.filter(|_| params.is_favorited),
            in_cart_of: viewer.filter(|_| params.is_in_shopping_cart),
            author: params.author,
            tags: params.tags.clone(),
        }
    }

    /// Builds `WHERE ...` (or an empty string) with `$n` placeholders starting
    /// after `reserved` parameters.
    pub fn to_sql(&self, reserved: usize) -> (String, Vec<String>) {
        let mut builder = QueryBuilder::new(" AND ", reserved);

        if let Some(user_id) = self.favorited_by {
            let user = builder.placeholder(user_id.to_string());
            builder = builder.add_clause(format!(
                "EXISTS (SELECT 1 FROM favorites WHERE favorites.recipe_id = recipes.id \
                 AND favorites.user_id = {user})"
            ));
        }
        if let Some(user_id) = self.in_cart_of {
            let user = builder.placeholder(user_id.to_string());
            builder = builder.add_clause(format!(
                "EXISTS (SELECT 1 FROM cart_items WHERE cart_items.recipe_id = recipes.id \
                 AND cart_items.user_id = {user})"
            ));
        }
        builder = builder.add_param("recipes.author_id", self.author.map(|id| id.to_string()));
        if !self.tags.is_empty() {
            let slugs = self
                .tags
                .iter()
                .map(|slug| builder.placeholder(slug.clone()))
                .collect::<Vec<_>>()
                .join(", ");
            builder = builder.add_clause(format!(
                "EXISTS (SELECT 1 FROM recipe_tags JOIN tags ON tags.id = recipe_tags.tag_id \
                 WHERE recipe_tags.recipe_id = recipes.id AND tags.slug IN ({slugs}))"
            ));
        }

        if builder.is_empty() {
            return (String::new(), vec![]);
        }
        let (clause, params) = builder.build();
        (format!("WHERE {clause}"), params)
    }
}
