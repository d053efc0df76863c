use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, types::Json};

use super::{Store, new_id, now_ms, timestamp};
use crate::{
    admin::post_list::PostSource,
    error::AppError,
    models::post::{Post, PostInput, PostPage},
    pagination::PageCursor,
};

const POST_COLUMNS: &str = "id, title, content, excerpt, image_url, categories, tags, \
     views, likes, published, created_at, updated_at, user_id";

#[derive(Debug, FromRow)]
struct PostRow {
    id: String,
    title: String,
    content: String,
    excerpt: Option<String>,
    image_url: Option<String>,
    categories: Json<Vec<String>>,
    tags: Json<Vec<String>>,
    views: i64,
    likes: i64,
    published: bool,
    created_at: i64,
    updated_at: i64,
    user_id: String,
}

impl TryFrom<PostRow> for Post {
    type Error = AppError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        if row.user_id.is_empty() {
            return Err(AppError::InternalServerError(format!("Post {} has no author", row.id)));
        }
        Ok(Post {
            created_at: timestamp(row.created_at, "posts", &row.id)?,
            updated_at: timestamp(row.updated_at, "posts", &row.id)?,
            id: row.id,
            title: row.title,
            content: row.content,
            excerpt: row.excerpt,
            image_url: row.image_url,
            categories: row.categories.0,
            tags: row.tags.0,
            views: row.views,
            likes: row.likes,
            published: row.published,
            user_id: row.user_id,
        })
    }
}

/// Which posts a listing scans.
#[derive(Debug, Clone, Copy)]
pub enum PostFilter<'a> {
    All,
    Published,
    /// Published posts whose category list contains this name.
    Category(&'a str),
}

impl Store {
    pub async fn insert_post(&self, input: &PostInput, user_id: &str) -> Result<Post, AppError> {
        if user_id.trim().is_empty() {
            return Err(AppError::BadRequest("User ID is required to create a post".to_string()));
        }

        let id = new_id();
        let now = now_ms();
        sqlx::query(
            r#"
            INSERT INTO posts
            (id, title, content, excerpt, image_url, categories, tags,
             views, likes, published, created_at, updated_at, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.excerpt())
        .bind(&input.image_url)
        .bind(Json(input.category_names()))
        .bind(Json(input.tag_names()))
        .bind(input.published)
        .bind(now)
        .bind(now)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.get_post(&id).await
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, AppError> {
        let row = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

        row.try_into()
    }

    /// Overwrites the editable fields; counters and `created_at` are kept.
    pub async fn update_post(
        &self,
        id: &str,
        input: &PostInput,
        user_id: &str,
    ) -> Result<Post, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, content = ?, excerpt = ?, image_url = ?,
                categories = ?, tags = ?, published = ?, user_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(input.excerpt())
        .bind(&input.image_url)
        .bind(Json(input.category_names()))
        .bind(Json(input.tag_names()))
        .bind(input.published)
        .bind(user_id)
        .bind(now_ms())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Post not found".to_string()));
        }
        self.get_post(id).await
    }

    /// Removes a post and hands back the deleted document.
    pub async fn delete_post(&self, id: &str) -> Result<Post, AppError> {
        let post = self.get_post(id).await?;
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(post)
    }

    /// One page in `created_at DESC, id DESC` order, continuing after `cursor`.
    pub async fn posts_page(
        &self,
        filter: PostFilter<'_>,
        cursor: Option<&PageCursor>,
        page_size: u32,
    ) -> Result<PostPage, AppError> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE 1 = 1"));

        match filter {
            PostFilter::All => {}
            PostFilter::Published => {
                qb.push(" AND published = 1");
            }
            PostFilter::Category(name) => {
                qb.push(" AND published = 1 AND EXISTS (SELECT 1 FROM json_each(posts.categories)");
                qb.push(" WHERE json_each.value = ");
                qb.push_bind(name.to_string());
                qb.push(")");
            }
        }

        if let Some(cursor) = cursor {
            qb.push(" AND (created_at < ");
            qb.push_bind(cursor.created_at_ms);
            qb.push(" OR (created_at = ");
            qb.push_bind(cursor.created_at_ms);
            qb.push(" AND id < ");
            qb.push_bind(cursor.id.clone());
            qb.push("))");
        }

        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(i64::from(page_size));

        let rows: Vec<PostRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let posts = rows
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let next_cursor = posts
            .last()
            .map(|p| PageCursor::after(p.created_at, &p.id).encode());
        let has_more = posts.len() == page_size as usize;

        Ok(PostPage {
            posts,
            next_cursor,
            has_more,
        })
    }

    /// Full collection scan, newest first.
    pub async fn all_posts(&self) -> Result<Vec<Post>, AppError> {
        let rows = sqlx::query_as::<_, PostRow>(&format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Post::try_from).collect()
    }
}

#[async_trait]
impl PostSource for Store {
    type Error = AppError;

    async fn fetch_page(&self, cursor: Option<&str>, page_size: u32) -> Result<PostPage, AppError> {
        let cursor = cursor.map(PageCursor::decode).transpose()?;
        self.posts_page(PostFilter::All, cursor.as_ref(), page_size)
            .await
    }
}
