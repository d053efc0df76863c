// src/pagination.rs

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const MAIN_COMMENTS_INITIAL: usize = 10;
pub const MAIN_COMMENTS_STEP: usize = 10;
pub const REPLIES_INITIAL: usize = 3;
pub const REPLIES_STEP: usize = 3;

/// Incremental reveal over a fully fetched, sorted collection.
///
/// The limit only ever grows, so items already shown keep their position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealWindow {
    limit: usize,
    step: usize,
}

impl RevealWindow {
    pub const fn new(initial: usize, step: usize) -> Self {
        Self {
            limit: initial,
            step,
        }
    }

    /// Window for top-level comments: 10, growing by 10.
    pub const fn main_comments() -> Self {
        Self::new(MAIN_COMMENTS_INITIAL, MAIN_COMMENTS_STEP)
    }

    /// Window for the direct replies of one comment: 3, growing by 3.
    pub const fn replies() -> Self {
        Self::new(REPLIES_INITIAL, REPLIES_STEP)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// "Load more". No upper bound.
    pub fn grow(&mut self) {
        self.limit = self.limit.saturating_add(self.step);
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> WindowSlice<'a, T> {
        let shown = &items[..items.len().min(self.limit)];
        WindowSlice {
            shown,
            total: items.len(),
        }
    }
}

/// The visible part of a window plus what the UI needs for its "more" button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSlice<'a, T> {
    pub shown: &'a [T],
    pub total: usize,
}

impl<T> WindowSlice<'_, T> {
    pub fn has_more(&self) -> bool {
        self.total > self.shown.len()
    }

    pub fn remaining(&self) -> usize {
        self.total - self.shown.len()
    }
}

/// Position of the last document of a page in `created_at DESC, id DESC`
/// order. Clients only ever see it as an opaque string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    #[serde(rename = "t")]
    pub created_at_ms: i64,
    #[serde(rename = "i")]
    pub id: String,
}

impl PageCursor {
    pub fn after(created_at: DateTime<Utc>, id: &str) -> Self {
        Self {
            created_at_ms: created_at.timestamp_millis(),
            id: id.to_string(),
        }
    }

    pub fn encode(&self) -> String {
        // Serializing two plain fields cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(raw: &str) -> Result<Self, AppError> {
        let invalid = || AppError::BadRequest("Invalid cursor".to_string());
        let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).map_err(|_| invalid())?;
        serde_json::from_slice(&bytes).map_err(|_| invalid())
    }
}
