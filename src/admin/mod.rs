pub mod category_sync;
pub mod dashboard;
pub mod post_list;

pub use category_sync::{CategoryCounter, CategoryDelta, SyncReport, apply_delta};
pub use dashboard::DashboardStats;
pub use post_list::{AdminPostList, PostSource};
