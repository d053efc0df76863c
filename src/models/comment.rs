use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A comment document from the `comments` collection.
///
/// Root comments carry no `parent_id`. Replies point at another comment of
/// the same post, so threads form an arbitrarily deep forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub author: String,
    pub content: String,
    pub date: DateTime<Utc>,
    pub likes: i64,
    pub dislikes: i64,
}

impl Comment {
    /// A comment is a root iff it has no (or an empty) parent id.
    pub fn is_root(&self) -> bool {
        self.parent_key().is_none()
    }

    /// The parent id, with empty strings treated as absent.
    pub fn parent_key(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|p| !p.is_empty())
    }
}

/// DTO for creating a new comment.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 2000,
        message = "Comment must be between 1 and 2000 characters"
    ))]
    pub content: String,

    /// Optional: the ID of the comment being replied to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl CreateCommentRequest {
    /// Parent id with blank values dropped, so they are never stored.
    pub fn parent(&self) -> Option<&str> {
        self.parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    Like,
    Dislike,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub kind: VoteKind,
}

/// Counter values after a vote has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCounts {
    pub likes: i64,
    pub dislikes: i64,
}
