pub mod hash;
pub mod html;
pub mod jwt;
pub mod sign_in;
pub mod slug;
