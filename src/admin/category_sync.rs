// src/admin/category_sync.rs

// Keeps `Category::post_count` in step with post writes.
//
// Each adjustment is its own atomic store call, awaited one after another.
// There is no surrounding transaction: a failure is logged, the loop moves on,
// and the counter for that category is left off by one until reconciled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The two store operations the sync loop needs.
#[async_trait]
pub trait CategoryCounter {
    async fn category_id_by_name(&self, name: &str) -> Result<Option<String>, AppError>;

    /// Atomically adds `delta` to the category's `post_count`.
    async fn adjust_post_count(&self, category_id: &str, delta: i64) -> Result<(), AppError>;
}

/// Category names whose counters move because of one post write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDelta {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl CategoryDelta {
    pub fn for_create(categories: &[String]) -> Self {
        Self {
            added: categories.to_vec(),
            removed: Vec::new(),
        }
    }

    pub fn for_delete(categories: &[String]) -> Self {
        Self {
            added: Vec::new(),
            removed: categories.to_vec(),
        }
    }

    /// Set difference between the old and new category lists.
    /// Names present in both are left alone.
    pub fn between(old: &[String], new: &[String]) -> Self {
        let mut added: Vec<String> = Vec::new();
        for name in new {
            if !old.contains(name) && !added.contains(name) {
                added.push(name.clone());
            }
        }
        let mut removed: Vec<String> = Vec::new();
        for name in old {
            if !new.contains(name) && !removed.contains(name) {
                removed.push(name.clone());
            }
        }
        Self { added, removed }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// What happened to each category name of a delta.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub applied: Vec<String>,
    /// Names with no matching category document.
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Applies a delta: decrements for removed names, then increments for added
/// ones, one call at a time.
pub async fn apply_delta<C>(counter: &C, delta: &CategoryDelta) -> SyncReport
where
    C: CategoryCounter + Sync,
{
    let mut report = SyncReport::default();
    let steps = delta
        .removed
        .iter()
        .map(|name| (name, -1))
        .chain(delta.added.iter().map(|name| (name, 1)));

    for (name, step) in steps {
        match adjust_one(counter, name, step).await {
            Ok(true) => report.applied.push(name.clone()),
            Ok(false) => {
                tracing::debug!("No category named {:?}, count not adjusted", name);
                report.skipped.push(name.clone());
            }
            Err(e) => {
                tracing::error!("Error adjusting count for category {}: {:?}", name, e);
                report.failed.push(name.clone());
            }
        }
    }
    report
}

async fn adjust_one<C>(counter: &C, name: &str, step: i64) -> Result<bool, AppError>
where
    C: CategoryCounter + Sync,
{
    let Some(id) = counter.category_id_by_name(name).await? else {
        return Ok(false);
    };
    counter.adjust_post_count(&id, step).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Counts {
        by_name: Mutex<HashMap<String, i64>>,
        broken: Vec<String>,
    }

    impl Counts {
        fn with(names: &[&str]) -> Self {
            let counts = Counts::default();
            for name in names {
                counts.by_name.lock().unwrap().insert(name.to_string(), 0);
            }
            counts
        }

        fn get(&self, name: &str) -> i64 {
            self.by_name.lock().unwrap()[name]
        }
    }

    #[async_trait]
    impl CategoryCounter for Counts {
        async fn category_id_by_name(&self, name: &str) -> Result<Option<String>, AppError> {
            Ok(self
                .by_name
                .lock()
                .unwrap()
                .contains_key(name)
                .then(|| name.to_string()))
        }

        async fn adjust_post_count(&self, category_id: &str, delta: i64) -> Result<(), AppError> {
            if self.broken.iter().any(|b| b == category_id) {
                return Err(AppError::InternalServerError("write rejected".to_string()));
            }
            *self.by_name.lock().unwrap().get_mut(category_id).unwrap() += delta;
            Ok(())
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn delta_between_is_a_set_difference() {
        let delta = CategoryDelta::between(&names(&["a", "b", "c"]), &names(&["b", "d", "d"]));
        assert_eq!(delta.added, names(&["d"]));
        assert_eq!(delta.removed, names(&["a", "c"]));

        assert!(CategoryDelta::between(&names(&["x"]), &names(&["x"])).is_empty());
    }

    #[tokio::test]
    async fn n_creates_then_one_delete() {
        let counts = Counts::with(&["Rust"]);
        let cats = names(&["Rust"]);
        for _ in 0..5 {
            apply_delta(&counts, &CategoryDelta::for_create(&cats)).await;
        }
        assert_eq!(counts.get("Rust"), 5);

        apply_delta(&counts, &CategoryDelta::for_delete(&cats)).await;
        assert_eq!(counts.get("Rust"), 4);
    }

    #[tokio::test]
    async fn update_moves_counts() {
        let counts = Counts::with(&["a", "b", "c"]);
        apply_delta(&counts, &CategoryDelta::for_create(&names(&["a", "b"]))).await;

        let report = apply_delta(
            &counts,
            &CategoryDelta::between(&names(&["a", "b"]), &names(&["b", "c"])),
        )
        .await;
        assert_eq!(report.applied, names(&["a", "c"]));
        let after = (counts.get("a"), counts.get("b"), counts.get("c"));
        assert_eq!(after, (0, 1, 1));
    }

    #[tokio::test]
    async fn unknown_names_are_skipped() {
        let counts = Counts::with(&["a"]);
        let delta = CategoryDelta::for_create(&names(&["a", "ghost"]));
        let report = apply_delta(&counts, &delta).await;
        assert_eq!(report.applied, names(&["a"]));
        assert_eq!(report.skipped, names(&["ghost"]));
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_loop() {
        let mut counts = Counts::with(&["a", "b", "c"]);
        counts.broken = names(&["b"]);

        let delta = CategoryDelta::for_create(&names(&["a", "b", "c"]));
        let report = apply_delta(&counts, &delta).await;
        assert_eq!(report.applied, names(&["a", "c"]));
        assert_eq!(report.failed, names(&["b"]));
        assert!(!report.is_clean());
        let after = (counts.get("a"), counts.get("b"), counts.get("c"));
        assert_eq!(after, (1, 0, 1));
    }
}
