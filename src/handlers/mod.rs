pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod posts;
