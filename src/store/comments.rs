use sqlx::FromRow;

use super::{Store, new_id, now_ms, timestamp};
use crate::{
    error::AppError,
    models::comment::{Comment, VoteCounts, VoteKind},
};

#[derive(Debug, FromRow)]
struct CommentRow {
    id: String,
    post_id: String,
    parent_id: Option<String>,
    author: String,
    content: String,
    date: i64,
    likes: i64,
    dislikes: i64,
}

impl TryFrom<CommentRow> for Comment {
    type Error = AppError;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        if row.likes < 0 || row.dislikes < 0 {
            return Err(AppError::InternalServerError(format!(
                "Comment {} has negative vote counters",
                row.id
            )));
        }
        Ok(Comment {
            date: timestamp(row.date, "comments", &row.id)?,
            id: row.id,
            post_id: row.post_id,
            parent_id: row.parent_id,
            author: row.author,
            content: row.content,
            likes: row.likes,
            dislikes: row.dislikes,
        })
    }
}

impl Store {
    /// Every comment of one post, newest first.
    pub async fn comments_for_post(&self, post_id: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, post_id, parent_id, author, content, date, likes, dislikes
            FROM comments
            WHERE post_id = ?
            ORDER BY date DESC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Comment::try_from).collect()
    }

    /// Stores a new comment with server-assigned id and date.
    ///
    /// The post must exist and a given parent must be a comment of that post.
    /// Without a parent the field is left out entirely.
    pub async fn insert_comment(
        &self,
        post_id: &str,
        parent_id: Option<&str>,
        author: &str,
        content: &str,
    ) -> Result<Comment, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound("Post not found".to_string()))?;

        if let Some(parent) = parent_id {
            sqlx::query("SELECT id FROM comments WHERE id = ? AND post_id = ?")
                .bind(parent)
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(AppError::NotFound("Parent comment not found".to_string()))?;
        }

        let comment = Comment {
            id: new_id(),
            post_id: post_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            author: author.to_string(),
            content: content.to_string(),
            date: timestamp(now_ms(), "comments", "new")?,
            likes: 0,
            dislikes: 0,
        };

        sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, parent_id, author, content, date, likes, dislikes)
            VALUES (?, ?, ?, ?, ?, ?, 0, 0)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.post_id)
        .bind(&comment.parent_id)
        .bind(&comment.author)
        .bind(&comment.content)
        .bind(comment.date.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comment)
    }

    /// Atomically bumps one vote counter.
    pub async fn vote_comment(
        &self,
        comment_id: &str,
        kind: VoteKind,
    ) -> Result<VoteCounts, AppError> {
        let sql = match kind {
            VoteKind::Like => {
                "UPDATE comments SET likes = likes + 1 WHERE id = ? RETURNING likes, dislikes"
            }
            VoteKind::Dislike => {
                "UPDATE comments SET dislikes = dislikes + 1 WHERE id = ? RETURNING likes, dislikes"
            }
        };

        let (likes, dislikes): (i64, i64) = sqlx::query_as(sql)
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Comment not found".to_string()))?;

        Ok(VoteCounts { likes, dislikes })
    }
}
