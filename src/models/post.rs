use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use validator::Validate;

use crate::admin::category_sync::SyncReport;
use crate::error::AppError;
use crate::pagination::PageCursor;
use crate::utils::slug::create_slug;

/// Characters of the first content line kept in the excerpt.
const EXCERPT_LEN: usize = 150;

/// Represents a document of the `posts` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,

    /// Denormalized category names, mirrored by `Category::post_count`.
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,

    pub views: i64,
    pub likes: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Author; every post has exactly one.
    pub user_id: String,
}

impl Post {
    /// Public URL slug: `<title-slug>-<id>`.
    pub fn slug(&self) -> String {
        let title = create_slug(&self.title);
        if title.is_empty() {
            self.id.clone()
        } else {
            format!("{}-{}", title, self.id)
        }
    }

    /// Case-insensitive substring match on title or content.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
    }
}

/// DTO for creating or updating a post from the admin console.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(
        min = 1,
        max = 100000,
        message = "Content length must be between 1 and 100000 chars"
    ))]
    pub content: String,

    #[serde(default)]
    #[validate(custom(function = validate_labels))]
    pub categories: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = validate_labels))]
    pub tags: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub image_url: Option<String>,

    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl PostInput {
    /// Category names, trimmed and deduplicated in first-seen order.
    pub fn category_names(&self) -> Vec<String> {
        normalize_labels(&self.categories)
    }

    pub fn tag_names(&self) -> Vec<String> {
        normalize_labels(&self.tags)
    }

    pub fn excerpt(&self) -> String {
        make_excerpt(&self.content)
    }
}

/// Trims entries, drops blanks and duplicates, keeping first occurrences.
pub fn normalize_labels(labels: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.trim();
        if !label.is_empty() && !out.iter().any(|l| l == label) {
            out.push(label.to_string());
        }
    }
    out
}

/// First line of the content, cut to 150 characters, followed by `...`.
pub fn make_excerpt(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    let first_line = content.lines().next().unwrap_or_default();
    let cut: String = first_line.chars().take(EXCERPT_LEN).collect();
    format!("{cut}...")
}

fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}

fn validate_labels(labels: &[String]) -> Result<(), validator::ValidationError> {
    if labels.len() > 50 {
        return Err(validator::ValidationError::new("too_many_labels"));
    }
    for label in labels {
        if label.len() > 100 {
            return Err(validator::ValidationError::new("label_too_long"));
        }
    }
    Ok(())
}

/// Query parameters for cursor paginated post listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    /// Opaque cursor returned as `next_cursor` by the previous page.
    pub cursor: Option<String>,

    /// Number of items to return (default: 10, max: 100).
    pub page_size: Option<u32>,
}

impl PageParams {
    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(10).clamp(1, 100)
    }

    /// The decoded cursor; a malformed one is a 400.
    pub fn decode_cursor(&self) -> Result<Option<PageCursor>, AppError> {
        self.cursor.as_deref().map(PageCursor::decode).transpose()
    }
}

/// One page of posts, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Points at the last returned post; `None` for an empty page.
    pub next_cursor: Option<String>,
    /// True when the page came back full, so another fetch may yield more.
    pub has_more: bool,
}

/// Result of an admin write: the post as stored (or as it was, for a delete)
/// and how the category counters fared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWriteResponse {
    pub post: Post,
    pub category_sync: SyncReport,
}
