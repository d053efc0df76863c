pub mod thread;
pub mod tree;

pub use thread::{CommentThread, ThreadQuery, ThreadView};
pub use tree::{CommentTree, ParentKey};
