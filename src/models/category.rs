use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::post::PostPage;

/// Represents a document of the `categories` collection.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<String>,

    /// Maintained incrementally by the post write path.
    /// Can drift from real membership if an adjustment fails.
    pub post_count: i64,
}

/// DTO for creating a category.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(length(max = 100))]
    pub icon: Option<String>,
}

/// Number of posts carrying a category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: i64,
}

/// Posts filed under one category name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPosts {
    /// `None` when no category document carries the name; posts may still
    /// reference it.
    pub category: Option<Category>,
    #[serde(flatten)]
    pub page: PostPage,
}
