// src/client/session.rs

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::user::{SessionUser, SignedIn};

/// What every observer of the session sees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    /// True while a sign-in or the startup redirect check is in flight.
    pub loading: bool,
    pub is_admin: bool,
    token: Option<String>,
}

impl AuthState {
    fn starting() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// Single writer, many readers.
///
/// Starts out loading, with no user, until the first sign-in outcome or
/// redirect check settles it. Clones share the same channel.
#[derive(Clone)]
pub struct SessionHub {
    tx: Arc<watch::Sender<AuthState>>,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHub {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthState::starting());
        Self { tx: Arc::new(tx) }
    }

    /// A receiver that is notified on every change.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    pub(crate) fn begin_loading(&self) {
        self.tx.send_modify(|state| state.loading = true);
    }

    /// Ends a loading phase without touching the user.
    pub(crate) fn settle(&self) {
        self.tx.send_if_modified(|state| {
            let was_loading = state.loading;
            state.loading = false;
            was_loading
        });
    }

    pub(crate) fn signed_in(&self, signed_in: SignedIn, is_admin: bool) {
        self.tx.send_replace(AuthState {
            user: Some(signed_in.user),
            loading: false,
            is_admin,
            token: Some(signed_in.token),
        });
    }

    pub(crate) fn signed_out(&self) {
        self.tx.send_replace(AuthState::default());
    }
}
