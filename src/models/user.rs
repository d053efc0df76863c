// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'accounts' table kept by the identity provider.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Account {
    pub id: String,

    /// Unique sign-in email.
    pub email: String,

    pub display_name: Option<String>,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,
}

impl Account {
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// The signed-in identity as seen by the rest of the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
}

impl SessionUser {
    /// Name shown on comments written by this user.
    pub fn author_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Anonymous")
    }
}

/// DTO for creating a new account (Registration).
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
    #[validate(length(max = 50))]
    pub display_name: Option<String>,
}

/// DTO for sign-in.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Returned by a completed sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedIn {
    pub token: String,
    pub user: SessionUser,
}

/// Outcome of a login call; mobile agents complete through a redirect code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LoginResponse {
    Popup { token: String, user: SessionUser },
    Redirect { redirect_code: String },
}

/// Result of the startup redirect check. Both fields are `None` when there is
/// nothing to complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedirectResult {
    pub token: Option<String>,
    pub user: Option<SessionUser>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_name_falls_back_to_anonymous() {
        let mut user = SessionUser {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            display_name: None,
        };
        assert_eq!(user.author_name(), "Anonymous");

        user.display_name = Some("Ada".to_string());
        assert_eq!(user.author_name(), "Ada");
    }
}
