// src/lib.rs

pub mod admin;
pub mod client;
pub mod comments;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

pub use routes::create_router;
