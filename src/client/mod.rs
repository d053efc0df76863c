// src/client/mod.rs

pub mod api;
pub mod session;
pub mod votes;

pub use api::{ApiClient, ClientError, SignInOutcome};
pub use session::{AuthState, SessionHub};
pub use votes::{CommentVotes, VoteSink};
