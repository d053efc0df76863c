// src/admin/post_list.rs

// State behind the admin "Manage posts" table.
//
// Pages come from the store by cursor. Search and category filters only
// narrow what is already loaded and never trigger a fetch, so matches that
// live in unfetched pages are not shown.

use async_trait::async_trait;

use crate::models::post::{Post, PostPage};

pub const ADMIN_PAGE_SIZE: u32 = 10;

/// Anything that can serve `posts` newest first, one cursor page at a time.
#[async_trait]
pub trait PostSource {
    type Error: Send;

    async fn fetch_page(
        &self,
        cursor: Option<&str>,
        page_size: u32,
    ) -> Result<PostPage, Self::Error>;
}

#[derive(Debug, Clone)]
pub struct AdminPostList {
    posts: Vec<Post>,
    cursor: Option<String>,
    has_more: bool,
    page_size: u32,
    search: String,
    selected: Vec<String>,
}

impl Default for AdminPostList {
    fn default() -> Self {
        Self::new(ADMIN_PAGE_SIZE)
    }
}

impl AdminPostList {
    pub fn new(page_size: u32) -> Self {
        Self {
            posts: Vec::new(),
            cursor: None,
            has_more: true,
            page_size: page_size.max(1),
            search: String::new(),
            selected: Vec::new(),
        }
    }

    /// Fetches the first page and replaces whatever was loaded.
    /// On error nothing changes.
    pub async fn refresh<S>(&mut self, source: &S) -> Result<(), S::Error>
    where
        S: PostSource + Sync,
    {
        let page = source.fetch_page(None, self.page_size).await?;
        self.posts.clear();
        self.cursor = None;
        self.apply_page(page);
        Ok(())
    }

    /// Appends the next page. Returns `Ok(false)` without fetching when
    /// loading more is currently disabled.
    pub async fn load_more<S>(&mut self, source: &S) -> Result<bool, S::Error>
    where
        S: PostSource + Sync,
    {
        if !self.can_load_more() {
            return Ok(false);
        }
        let page = source
            .fetch_page(self.cursor.as_deref(), self.page_size)
            .await?;
        self.apply_page(page);
        Ok(true)
    }

    fn apply_page(&mut self, page: PostPage) {
        // A short page means the scan is exhausted.
        self.has_more = page.posts.len() == self.page_size as usize;
        if page.next_cursor.is_some() {
            self.cursor = page.next_cursor;
        }
        self.posts.extend(page.posts);
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
    }

    pub fn selected_categories(&self) -> &[String] {
        &self.selected
    }

    /// Checks or unchecks one category in the filter menu.
    pub fn toggle_category(&mut self, name: &str, checked: bool) {
        let present = self.selected.iter().any(|c| c == name);
        if checked && !present {
            self.selected.push(name.to_string());
        } else if !checked {
            self.selected.retain(|c| c != name);
        }
    }

    pub fn clear_filters(&mut self) {
        self.search.clear();
        self.selected.clear();
    }

    pub fn is_filtering(&self) -> bool {
        !self.search.trim().is_empty() || !self.selected.is_empty()
    }

    /// "Load more" is offered only while pages remain and no filter is set.
    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.is_filtering()
    }

    /// More posts exist server side than the filter has looked at.
    pub fn is_partial(&self) -> bool {
        self.has_more
    }

    /// Loaded posts passing the search and the category filter.
    pub fn visible(&self) -> Vec<&Post> {
        let needle = self.search.trim().to_lowercase();
        self.posts
            .iter()
            .filter(|post| post.matches_search(&needle))
            .filter(|post| {
                self.selected.is_empty()
                    || post.categories.iter().any(|c| self.selected.contains(c))
            })
            .collect()
    }

    /// The "no posts found" state.
    pub fn is_empty_state(&self) -> bool {
        self.visible().is_empty()
    }

    /// Distinct category names across loaded posts, first seen first.
    pub fn all_categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.posts.iter().flat_map(|p| p.categories.iter()) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Drops a deleted post from the loaded list.
    pub fn remove(&mut self, post_id: &str) -> Option<Post> {
        let idx = self.posts.iter().position(|p| p.id == post_id)?;
        Some(self.posts.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn post(i: usize, title: &str, categories: &[&str]) -> Post {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() - Duration::minutes(i as i64);
        Post {
            id: format!("p{i}"),
            title: title.to_string(),
            content: format!("body of post {i}"),
            excerpt: None,
            image_url: None,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            tags: vec![],
            views: 0,
            likes: 0,
            published: true,
            created_at: at,
            updated_at: at,
            user_id: "u".to_string(),
        }
    }

    /// Serves a fixed newest-first list; the cursor is the next index.
    struct FixedSource {
        posts: Vec<Post>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(posts: Vec<Post>) -> Self {
            Self {
                posts,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PostSource for FixedSource {
        type Error = String;

        async fn fetch_page(
            &self,
            cursor: Option<&str>,
            page_size: u32,
        ) -> Result<PostPage, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("offline".to_string());
            }
            let start: usize = cursor.map(|c| c.parse().unwrap()).unwrap_or(0);
            let end = (start + page_size as usize).min(self.posts.len());
            let posts = self.posts[start.min(end)..end].to_vec();
            Ok(PostPage {
                has_more: posts.len() == page_size as usize,
                next_cursor: (!posts.is_empty()).then(|| end.to_string()),
                posts,
            })
        }
    }

    fn numbered(n: usize) -> Vec<Post> {
        (0..n).map(|i| post(i, &format!("Post {i}"), &[])).collect()
    }

    #[tokio::test]
    async fn full_page_means_more() {
        let source = FixedSource::new(numbered(10));
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();
        assert_eq!(list.posts().len(), 10);
        assert!(list.has_more());
    }

    #[tokio::test]
    async fn short_page_means_exhausted() {
        let source = FixedSource::new(numbered(7));
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();
        assert_eq!(list.posts().len(), 7);
        assert!(!list.has_more());
        assert!(!list.load_more(&source).await.unwrap());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn load_more_appends_in_order() {
        let source = FixedSource::new(numbered(23));
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();
        assert!(list.load_more(&source).await.unwrap());
        assert!(list.load_more(&source).await.unwrap());

        let ids: Vec<String> = list.posts().iter().map(|p| p.id.clone()).collect();
        let expected: Vec<String> = (0..23).map(|i| format!("p{i}")).collect();
        assert_eq!(ids, expected);
        assert!(!list.has_more());
    }

    #[tokio::test]
    async fn refresh_replaces_loaded_posts() {
        let source = FixedSource::new(numbered(15));
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();
        list.load_more(&source).await.unwrap();
        list.refresh(&source).await.unwrap();
        assert_eq!(list.posts().len(), 10);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_state_alone() {
        let mut source = FixedSource::new(numbered(12));
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();

        source.fail = true;
        assert!(list.load_more(&source).await.is_err());
        assert_eq!(list.posts().len(), 10);
        assert!(list.has_more());
    }

    #[tokio::test]
    async fn search_matches_title_or_content_case_insensitively() {
        let source = FixedSource::new(vec![
            post(0, "Learning RUST", &["Rust"]),
            post(1, "Gardening", &["Life"]),
            post(2, "Cooking", &["Life", "Food"]),
        ]);
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();

        list.set_search("rust");
        let ids: Vec<&str> = list.visible().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p0"]);

        list.set_search("BODY OF POST 2");
        let ids: Vec<&str> = list.visible().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p2"]);
    }

    #[tokio::test]
    async fn category_filter_is_any_of() {
        let source = FixedSource::new(vec![
            post(0, "a", &["Rust"]),
            post(1, "b", &["Life"]),
            post(2, "c", &["Life", "Food"]),
            post(3, "d", &[]),
        ]);
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();
        assert_eq!(list.all_categories(), vec!["Rust", "Life", "Food"]);

        list.toggle_category("Food", true);
        list.toggle_category("Rust", true);
        list.toggle_category("Rust", true);
        assert_eq!(list.selected_categories().len(), 2);
        let ids: Vec<&str> = list.visible().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p0", "p2"]);

        list.toggle_category("Food", false);
        list.toggle_category("Rust", false);
        assert_eq!(list.visible().len(), 4);
    }

    #[tokio::test]
    async fn filtering_disables_load_more_and_can_hide_unfetched_matches() {
        let mut posts = numbered(10);
        posts.push(post(10, "Needle", &[]));
        let source = FixedSource::new(posts);
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();

        list.set_search("needle");
        assert!(list.is_empty_state());
        assert!(list.is_partial());
        assert!(!list.can_load_more());
        assert!(!list.load_more(&source).await.unwrap());

        list.clear_filters();
        assert!(list.can_load_more());
        list.load_more(&source).await.unwrap();
        list.set_search("needle");
        assert!(!list.is_empty_state());
    }

    #[tokio::test]
    async fn remove_drops_a_loaded_post() {
        let source = FixedSource::new(numbered(3));
        let mut list = AdminPostList::new(10);
        list.refresh(&source).await.unwrap();
        assert_eq!(list.remove("p1").map(|p| p.id), Some("p1".to_string()));
        assert!(list.remove("p1").is_none());
        assert_eq!(list.posts().len(), 2);
    }
}
