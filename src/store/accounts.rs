use super::{Store, new_id, now_ms};
use crate::{
    error::{AppError, is_unique_violation},
    models::user::Account,
};

impl Store {
    pub async fn insert_account(
        &self,
        email: &str,
        display_name: Option<&str>,
        password_hash: &str,
    ) -> Result<Account, AppError> {
        let account = Account {
            id: new_id(),
            email: email.trim().to_lowercase(),
            display_name: display_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            password: password_hash.to_string(),
        };

        sqlx::query(
            r#"
            INSERT INTO accounts (id, email, display_name, password, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.email)
        .bind(&account.display_name)
        .bind(&account.password)
        .bind(now_ms())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Email '{}' is already registered", account.email))
            } else {
                tracing::error!("Failed to register account: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(account)
    }

    pub async fn account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, display_name, password FROM accounts WHERE email = ?",
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// True when `email` is listed in `adminusers`.
    pub async fn is_admin(&self, email: &str) -> Result<bool, AppError> {
        let found: Option<(String,)> = sqlx::query_as("SELECT id FROM adminusers WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Adds an administrator; a no-op when already present.
    pub async fn add_admin(&self, email: &str) -> Result<(), AppError> {
        sqlx::query("INSERT OR IGNORE INTO adminusers (id, email) VALUES (?, ?)")
            .bind(new_id())
            .bind(email.trim().to_lowercase())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
