use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    comments::{CommentThread, ThreadQuery},
    error::AppError,
    models::post::{PageParams, Post},
    store::{PostFilter, Store},
    utils::slug::post_id_from_slug,
};

/// Published posts, newest first, one cursor page at a time.
pub async fn list_posts(
    State(store): State<Store>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let cursor = params.decode_cursor()?;
    let page = store
        .posts_page(PostFilter::Published, cursor.as_ref(), params.page_size())
        .await?;
    Ok(Json(page))
}

pub async fn get_post(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(published_post(&store, &id).await?))
}

/// Resolves `<title-slug>-<id>` to the post. Only the id part is looked up,
/// so a stale title in the URL still resolves.
pub async fn get_post_by_slug(
    State(store): State<Store>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let Some(id) = post_id_from_slug(&slug) else {
        return Err(AppError::NotFound("Post not found".to_string()));
    };
    Ok(Json(published_post(&store, id).await?))
}

/// Flat comment list of a post, newest first.
pub async fn list_comments(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = published_post(&store, &id).await?;
    Ok(Json(store.comments_for_post(&post.id).await?))
}

/// The comment thread as a reader sees it after the "load more" clicks
/// carried by the query string.
pub async fn comment_thread(
    State(store): State<Store>,
    Path(id): Path<String>,
    Query(query): Query<ThreadQuery>,
) -> Result<impl IntoResponse, AppError> {
    let post = published_post(&store, &id).await?;
    let mut thread = CommentThread::new(store.comments_for_post(&post.id).await?);
    thread.apply(&query);
    Ok(Json(thread.render()))
}

/// Drafts are invisible to readers.
async fn published_post(store: &Store, id: &str) -> Result<Post, AppError> {
    let post = store.get_post(id).await?;
    if !post.published {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    Ok(post)
}
