use async_trait::async_trait;

use super::{Store, new_id};
use crate::{
    admin::{category_sync::CategoryCounter, dashboard::category_distribution},
    error::{AppError, is_unique_violation},
    models::category::{Category, CreateCategoryRequest},
};

impl Store {
    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, icon, post_count FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn category_by_name(&self, name: &str) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, icon, post_count FROM categories WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn insert_category(&self, req: &CreateCategoryRequest) -> Result<Category, AppError> {
        let category = Category {
            id: new_id(),
            name: req.name.trim().to_string(),
            description: req.description.clone(),
            icon: req.icon.clone(),
            post_count: 0,
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, icon, post_count)
            VALUES (?, ?, ?, ?, 0)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.icon)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Category '{}' already exists", category.name))
            } else {
                tracing::error!("Failed to create category: {:?}", e);
                AppError::from(e)
            }
        })?;

        Ok(category)
    }

    /// Recomputes every `post_count` from actual post membership.
    pub async fn reconcile_post_counts(&self) -> Result<Vec<Category>, AppError> {
        let distribution = category_distribution(&self.all_posts().await?);

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE categories SET post_count = 0")
            .execute(&mut *tx)
            .await?;
        for entry in &distribution {
            sqlx::query("UPDATE categories SET post_count = ? WHERE name = ?")
                .bind(entry.count)
                .bind(&entry.name)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        self.list_categories().await
    }
}

#[async_trait]
impl CategoryCounter for Store {
    async fn category_id_by_name(&self, name: &str) -> Result<Option<String>, AppError> {
        let id: Option<(String,)> = sqlx::query_as("SELECT id FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id.map(|(id,)| id))
    }

    async fn adjust_post_count(&self, category_id: &str, delta: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE categories SET post_count = MAX(0, post_count + ?)
            WHERE id = ?
            "#,
        )
        .bind(delta)
        .bind(category_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        Ok(())
    }
}
