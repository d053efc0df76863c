use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{category::CategoryCount, post::Post};

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_posts: usize,
    pub posts_this_month: usize,
    /// `"None"` when no post has a category.
    pub most_active_category: String,
    pub total_views: i64,
    pub category_distribution: Vec<CategoryCount>,
}

impl DashboardStats {
    pub fn compute(posts: &[Post], now: DateTime<Utc>) -> Self {
        let month_start = Utc
            .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
            .single()
            .unwrap_or(now);

        let category_distribution = category_distribution(posts);
        // Ties go to the name seen first.
        let most_active_category = category_distribution
            .iter()
            .fold(None::<&CategoryCount>, |best, c| match best {
                Some(b) if b.count >= c.count => Some(b),
                _ => Some(c),
            })
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "None".to_string());

        Self {
            total_posts: posts.len(),
            posts_this_month: posts.iter().filter(|p| p.created_at >= month_start).count(),
            most_active_category,
            total_views: posts.iter().map(|p| p.views.max(0)).sum(),
            category_distribution,
        }
    }
}

/// Posts per category name, computed from membership, first seen first.
pub fn category_distribution(posts: &[Post]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for name in posts.iter().flat_map(|p| p.categories.iter()) {
        match counts.iter_mut().find(|c| &c.name == name) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                name: name.clone(),
                count: 1,
            }),
        }
    }
    counts
}
