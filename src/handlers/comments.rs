use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError,
    models::comment::{CreateCommentRequest, VoteRequest},
    store::Store,
    utils::{html::clean_html, jwt::Claims},
};

/// Adds a comment (or a reply when `parentId` is set) to a post.
/// Requires: Login. The author name comes from the session.
pub async fn create_comment(
    State(store): State<Store>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<String>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let content = clean_html(payload.content.trim());
    if content.trim().is_empty() {
        return Err(AppError::BadRequest("Comment cannot be empty".to_string()));
    }

    let user = claims.session_user();
    let comment = store
        .insert_comment(&post_id, payload.parent(), user.author_name(), &content)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// Increments the like or dislike counter and returns both counters.
pub async fn vote_comment(
    State(store): State<Store>,
    Path(id): Path<String>,
    Json(payload): Json<VoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let counts = store.vote_comment(&id, payload.kind).await?;
    Ok(Json(counts))
}
