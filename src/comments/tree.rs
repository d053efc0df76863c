// src/comments/tree.rs

use std::collections::{HashMap, HashSet};

use crate::models::comment::Comment;

/// Deepest reply level walked below a comment.
pub const MAX_REPLY_DEPTH: usize = 64;

/// Key of a child list: the virtual root, or a comment id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentKey<'a> {
    Root,
    Comment(&'a str),
}

/// A reply reached while walking below some comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestedReply<'a> {
    pub comment: &'a Comment,
    /// 1 for a direct reply, 2 for a reply to it, and so on.
    pub depth: usize,
}

/// Comments grouped by parent, every group sorted newest first.
#[derive(Debug, Clone, Default)]
pub struct CommentTree {
    roots: Vec<Comment>,
    replies: HashMap<String, Vec<Comment>>,
    len: usize,
}

impl CommentTree {
    /// Groups comments by `parent_id`. Only comments without a parent id are
    /// roots; a parent id naming the post itself is just an unknown parent.
    pub fn build(comments: impl IntoIterator<Item = Comment>) -> Self {
        let mut tree = CommentTree::default();
        for comment in comments {
            tree.len += 1;
            if comment.is_root() {
                tree.roots.push(comment);
                continue;
            }
            let parent = comment.parent_key().unwrap_or_default().to_string();
            tree.replies.entry(parent).or_default().push(comment);
        }

        // Stable, so equal dates keep their input order.
        sort_newest_first(&mut tree.roots);
        for group in tree.replies.values_mut() {
            sort_newest_first(group);
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn roots(&self) -> &[Comment] {
        &self.roots
    }

    pub fn children_of(&self, key: ParentKey<'_>) -> &[Comment] {
        match key {
            ParentKey::Root => &self.roots,
            ParentKey::Comment(id) => self.direct_replies(id),
        }
    }

    /// Comments whose `parent_id` is exactly `comment_id`.
    pub fn direct_replies(&self, comment_id: &str) -> &[Comment] {
        self.replies
            .get(comment_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every descendant of `comment_id`, parent first, depth first.
    ///
    /// Walks with an explicit stack. A comment is emitted at most once and
    /// nothing deeper than `MAX_REPLY_DEPTH` is visited, so a cyclic parent
    /// chain still terminates.
    pub fn nested_replies(&self, comment_id: &str) -> Vec<NestedReply<'_>> {
        let mut out = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([comment_id]);
        let mut stack: Vec<NestedReply<'_>> = self
            .direct_replies(comment_id)
            .iter()
            .rev()
            .map(|comment| NestedReply { comment, depth: 1 })
            .collect();

        while let Some(reply) = stack.pop() {
            if !visited.insert(reply.comment.id.as_str()) {
                continue;
            }
            out.push(reply);
            if reply.depth >= MAX_REPLY_DEPTH {
                tracing::warn!(
                    comment_id = %reply.comment.id,
                    "Reply depth limit reached, deeper replies are not shown"
                );
                continue;
            }
            stack.extend(
                self.direct_replies(&reply.comment.id)
                    .iter()
                    .rev()
                    .map(|comment| NestedReply {
                        comment,
                        depth: reply.depth + 1,
                    }),
            );
        }
        out
    }

    /// The whole forest fully expanded: each root followed by its replies.
    pub fn flatten(&self) -> Vec<NestedReply<'_>> {
        let mut out = Vec::with_capacity(self.len);
        for root in &self.roots {
            out.push(NestedReply {
                comment: root,
                depth: 0,
            });
            out.extend(self.nested_replies(&root.id));
        }
        out
    }
}

fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| b.date.cmp(&a.date));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, Utc};

    fn day(d: &str) -> DateTime<Utc> {
        NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn comment(id: &str, parent: Option<&str>, date: &str) -> Comment {
        Comment {
            id: id.to_string(),
            post_id: "post".to_string(),
            parent_id: parent.map(str::to_string),
            author: "someone".to_string(),
            content: format!("comment {id}"),
            date: day(date),
            likes: 0,
            dislikes: 0,
        }
    }

    fn ids(comments: &[Comment]) -> Vec<&str> {
        comments.iter().map(|c| c.id.as_str()).collect()
    }

    fn walked_ids<'a>(walked: &[NestedReply<'a>]) -> Vec<&'a str> {
        walked.iter().map(|r| r.comment.id.as_str()).collect()
    }

    #[test]
    fn roots_are_newest_first_and_replies_are_grouped() {
        let tree = CommentTree::build(vec![
            comment("1", None, "2024-01-01"),
            comment("2", Some("1"), "2024-01-02"),
            comment("3", None, "2024-01-03"),
        ]);

        assert_eq!(ids(tree.roots()), vec!["3", "1"]);
        assert_eq!(ids(tree.direct_replies("1")), vec!["2"]);
        assert!(tree.direct_replies("3").is_empty());
        assert_eq!(ids(tree.children_of(ParentKey::Root)), vec!["3", "1"]);
    }

    #[test]
    fn only_parentless_comments_are_roots() {
        let tree = CommentTree::build(vec![
            comment("a", None, "2024-01-01"),
            comment("b", Some(""), "2024-01-02"),
            comment("c", Some("post"), "2024-01-03"),
            comment("d", Some("missing"), "2024-01-04"),
        ]);

        assert_eq!(ids(tree.roots()), vec!["b", "a"]);
        assert_eq!(ids(tree.children_of(ParentKey::Comment("post"))), vec!["c"]);
        assert_eq!(ids(tree.direct_replies("missing")), vec!["d"]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn direct_replies_match_parent_subset_sorted() {
        let tree = CommentTree::build(vec![
            comment("r", None, "2024-01-01"),
            comment("x", Some("r"), "2024-01-02"),
            comment("y", Some("r"), "2024-01-05"),
            comment("z", Some("x"), "2024-01-09"),
            comment("w", Some("r"), "2024-01-03"),
        ]);

        assert_eq!(ids(tree.direct_replies("r")), vec!["y", "w", "x"]);
        assert_eq!(ids(tree.direct_replies("x")), vec!["z"]);
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let tree = CommentTree::build(vec![
            comment("first", None, "2024-01-01"),
            comment("second", None, "2024-01-01"),
        ]);
        assert_eq!(ids(tree.roots()), vec!["first", "second"]);
    }

    #[test]
    fn nested_replies_are_depth_first_parent_first() {
        let tree = CommentTree::build(vec![
            comment("root", None, "2024-01-01"),
            comment("a", Some("root"), "2024-01-02"),
            comment("b", Some("root"), "2024-01-03"),
            comment("a1", Some("a"), "2024-01-04"),
            comment("a1x", Some("a1"), "2024-01-05"),
            comment("b1", Some("b"), "2024-01-06"),
        ]);

        let walked: Vec<(&str, usize)> = tree
            .nested_replies("root")
            .iter()
            .map(|r| (r.comment.id.as_str(), r.depth))
            .collect();
        assert_eq!(
            walked,
            vec![("b", 1), ("b1", 2), ("a", 1), ("a1", 2), ("a1x", 3)]
        );

        let flat = walked_ids(&tree.flatten());
        assert_eq!(flat, vec!["root", "b", "b1", "a", "a1", "a1x"]);
    }

    #[test]
    fn cyclic_parent_chain_terminates() {
        let tree = CommentTree::build(vec![
            comment("a", Some("b"), "2024-01-01"),
            comment("b", Some("a"), "2024-01-02"),
            comment("c", Some("c"), "2024-01-03"),
        ]);

        assert!(tree.roots().is_empty());

        assert_eq!(walked_ids(&tree.nested_replies("a")), vec!["b"]);

        let from_c = tree.nested_replies("c");
        assert!(from_c.is_empty());
    }

    #[test]
    fn depth_is_bounded() {
        let mut comments = vec![comment("n0", None, "2024-01-01")];
        for i in 1..=(MAX_REPLY_DEPTH + 10) {
            let parent = format!("n{}", i - 1);
            comments.push(comment(&format!("n{i}"), Some(&parent), "2024-01-02"));
        }
        let tree = CommentTree::build(comments);

        let walked = tree.nested_replies("n0");
        assert_eq!(walked.len(), MAX_REPLY_DEPTH);
        assert_eq!(walked.last().map(|r| r.depth), Some(MAX_REPLY_DEPTH));
    }
}
