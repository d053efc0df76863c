// src/models/mod.rs

pub mod category;
pub mod comment;
pub mod post;
pub mod user;
