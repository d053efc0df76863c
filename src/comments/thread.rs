// src/comments/thread.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::comments::tree::CommentTree;
use crate::models::comment::Comment;
use crate::pagination::{RevealWindow, WindowSlice};

/// Cap on "load more" clicks replayed from a query string.
const MAX_REPLAYED_CLICKS: usize = 10_000;

/// Comment tree plus the reveal state of one reader.
///
/// The top-level window and every per-comment reply window are independent:
/// expanding one comment's replies never touches another's.
#[derive(Debug, Clone)]
pub struct CommentThread {
    tree: CommentTree,
    main: RevealWindow,
    replies: HashMap<String, RevealWindow>,
}

impl CommentThread {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self {
            tree: CommentTree::build(comments),
            main: RevealWindow::main_comments(),
            replies: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &CommentTree {
        &self.tree
    }

    /// Swaps in a refetched comment list, keeping every window as it was.
    pub fn replace_comments(&mut self, comments: Vec<Comment>) {
        self.tree = CommentTree::build(comments);
    }

    pub fn load_more_comments(&mut self) {
        self.main.grow();
    }

    pub fn load_more_replies(&mut self, comment_id: &str) {
        self.replies
            .entry(comment_id.to_string())
            .or_insert_with(RevealWindow::replies)
            .grow();
    }

    /// Replays the clicks carried by a thread query.
    pub fn apply(&mut self, query: &ThreadQuery) {
        for _ in 0..query.pages.unwrap_or(0).min(MAX_REPLAYED_CLICKS) {
            self.load_more_comments();
        }
        for id in query.expanded().take(MAX_REPLAYED_CLICKS) {
            self.load_more_replies(id);
        }
    }

    pub fn visible_roots(&self) -> WindowSlice<'_, Comment> {
        self.main.slice(self.tree.roots())
    }

    pub fn visible_replies(&self, comment_id: &str) -> WindowSlice<'_, Comment> {
        self.replies
            .get(comment_id)
            .copied()
            .unwrap_or_else(RevealWindow::replies)
            .slice(self.tree.direct_replies(comment_id))
    }

    /// Rendering order: each shown root, its shown direct replies, and below
    /// each of those every nested reply.
    pub fn render(&self) -> ThreadView {
        let roots = self.visible_roots();
        let comments = roots
            .shown
            .iter()
            .map(|root| {
                let replies = self.visible_replies(&root.id);
                RootEntry {
                    comment: root.clone(),
                    replies: replies
                        .shown
                        .iter()
                        .map(|reply| ReplyEntry {
                            comment: reply.clone(),
                            nested: self
                                .tree
                                .nested_replies(&reply.id)
                                .into_iter()
                                .map(|n| NestedEntry {
                                    comment: n.comment.clone(),
                                    depth: n.depth + 1,
                                })
                                .collect(),
                        })
                        .collect(),
                    total_replies: replies.total,
                    remaining_replies: replies.remaining(),
                    has_more_replies: replies.has_more(),
                }
            })
            .collect();

        ThreadView {
            comments,
            shown: roots.shown.len(),
            total: roots.total,
            remaining: roots.remaining(),
            has_more: roots.has_more(),
        }
    }
}

/// Reveal state encoded in a request.
#[derive(Debug, Default, Deserialize)]
pub struct ThreadQuery {
    /// Number of "load more comments" clicks.
    pub pages: Option<usize>,
    /// Comma separated comment ids, one entry per "load more replies" click.
    pub expand: Option<String>,
}

impl ThreadQuery {
    fn expanded(&self) -> impl Iterator<Item = &str> {
        self.expand
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadView {
    pub comments: Vec<RootEntry>,
    pub shown: usize,
    pub total: usize,
    pub remaining: usize,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootEntry {
    pub comment: Comment,
    pub replies: Vec<ReplyEntry>,
    pub total_replies: usize,
    pub remaining_replies: usize,
    pub has_more_replies: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyEntry {
    pub comment: Comment,
    /// All deeper replies, unwindowed.
    pub nested: Vec<NestedEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedEntry {
    pub comment: Comment,
    /// Level below the root comment (a reply to a direct reply is 2).
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn comment(id: &str, parent: Option<&str>, minute: i64) -> Comment {
        Comment {
            id: id.to_string(),
            post_id: "p".to_string(),
            parent_id: parent.map(str::to_string),
            author: "a".to_string(),
            content: "c".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
            likes: 0,
            dislikes: 0,
        }
    }

    fn thread_with(roots: usize, replies_per: &[(&str, usize)]) -> CommentThread {
        let mut comments = Vec::new();
        for i in 0..roots {
            comments.push(comment(&format!("r{i}"), None, i as i64));
        }
        for (parent, n) in replies_per {
            for j in 0..*n {
                comments.push(comment(&format!("{parent}-{j}"), Some(parent), 1000 + j as i64));
            }
        }
        CommentThread::new(comments)
    }

    fn shown_ids(slice: WindowSlice<'_, Comment>) -> Vec<String> {
        slice.shown.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn main_window_grows_by_ten() {
        let mut thread = thread_with(25, &[]);
        let view = thread.render();
        assert_eq!(view.shown, 10);
        assert_eq!(view.remaining, 15);
        assert!(view.has_more);
        assert_eq!(view.comments[0].comment.id, "r24");

        thread.load_more_comments();
        assert_eq!(thread.render().shown, 20);

        thread.load_more_comments();
        let view = thread.render();
        assert_eq!(view.shown, 25);
        assert!(!view.has_more);
    }

    #[test]
    fn reply_windows_are_independent() {
        let mut thread = thread_with(2, &[("r0", 7), ("r1", 5)]);

        assert_eq!(thread.visible_replies("r0").shown.len(), 3);
        let before = shown_ids(thread.visible_replies("r0"));

        thread.load_more_replies("r0");
        let after = shown_ids(thread.visible_replies("r0"));
        assert_eq!(after.len(), 6);
        assert_eq!(&after[..3], &before[..]);
        assert_eq!(thread.visible_replies("r1").shown.len(), 3);

        thread.load_more_replies("r0");
        let slice = thread.visible_replies("r0");
        assert_eq!(slice.shown.len(), 7);
        assert!(!slice.has_more());

        let view = thread.render();
        let r1 = view.comments.iter().find(|e| e.comment.id == "r1").unwrap();
        assert_eq!(r1.remaining_replies, 2);
        assert!(r1.has_more_replies);
    }

    #[test]
    fn nested_replies_render_under_their_direct_reply() {
        let thread = CommentThread::new(vec![
            comment("root", None, 0),
            comment("reply", Some("root"), 1),
            comment("deep", Some("reply"), 2),
            comment("deeper", Some("deep"), 3),
        ]);

        let view = thread.render();
        assert_eq!(view.total, 1);
        let reply = &view.comments[0].replies[0];
        assert_eq!(reply.comment.id, "reply");
        let nested: Vec<(&str, usize)> = reply
            .nested
            .iter()
            .map(|n| (n.comment.id.as_str(), n.depth))
            .collect();
        assert_eq!(nested, vec![("deep", 2), ("deeper", 3)]);
    }

    #[test]
    fn query_replays_clicks() {
        let mut thread = thread_with(30, &[("r29", 10)]);
        thread.apply(&ThreadQuery {
            pages: Some(1),
            expand: Some("r29, r29,,unknown".to_string()),
        });

        let view = thread.render();
        assert_eq!(view.shown, 20);
        assert_eq!(view.comments[0].comment.id, "r29");
        assert_eq!(view.comments[0].replies.len(), 9);
        assert_eq!(view.comments[0].remaining_replies, 1);
    }

    #[test]
    fn refetch_keeps_windows() {
        let mut thread = thread_with(15, &[]);
        thread.load_more_comments();
        let mut comments: Vec<Comment> = thread.tree().roots().to_vec();
        comments.push(comment("new", None, 99));
        thread.replace_comments(comments);

        let view = thread.render();
        assert_eq!(view.total, 16);
        assert_eq!(view.shown, 16);
        assert_eq!(view.comments[0].comment.id, "new");
    }
}
