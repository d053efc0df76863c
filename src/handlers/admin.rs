// src/handlers/admin.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    admin::{
        category_sync::{CategoryDelta, apply_delta},
        dashboard::DashboardStats,
    },
    error::AppError,
    models::{
        category::CreateCategoryRequest,
        post::{PageParams, PostInput, PostWriteResponse},
    },
    store::{PostFilter, Store},
    utils::jwt::Claims,
};

// ==========================================
// Post Management
// ==========================================

/// All posts, drafts included, one cursor page at a time.
pub async fn list_posts(
    State(store): State<Store>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let cursor = params.decode_cursor()?;
    let page = store
        .posts_page(PostFilter::All, cursor.as_ref(), params.page_size())
        .await?;
    Ok(Json(page))
}

pub async fn get_post(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.get_post(&id).await?))
}

/// Creates a post and bumps the counter of each of its categories.
///
/// The post is stored first; counter failures are reported, not rolled back.
pub async fn create_post(
    State(store): State<Store>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let post = store.insert_post(&payload, &claims.sub).await?;
    let category_sync = apply_delta(&store, &CategoryDelta::for_create(&post.categories)).await;
    tracing::info!("Post {} created by {}", post.id, claims.email);

    Ok((
        StatusCode::CREATED,
        Json(PostWriteResponse {
            post,
            category_sync,
        }),
    ))
}

/// Overwrites a post and moves counters for categories added or removed.
pub async fn update_post(
    State(store): State<Store>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<PostInput>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let previous = store.get_post(&id).await?;
    let post = store.update_post(&id, &payload, &claims.sub).await?;
    let delta = CategoryDelta::between(&previous.categories, &post.categories);
    let category_sync = apply_delta(&store, &delta).await;

    Ok(Json(PostWriteResponse {
        post,
        category_sync,
    }))
}

/// Deletes a post and decrements the counter of each of its categories.
/// Comments of the post are left in place.
pub async fn delete_post(
    State(store): State<Store>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = store.delete_post(&id).await?;
    let category_sync = apply_delta(&store, &CategoryDelta::for_delete(&post.categories)).await;
    tracing::info!("Post {} deleted", post.id);

    Ok(Json(PostWriteResponse {
        post,
        category_sync,
    }))
}

pub async fn dashboard(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    let posts = store.all_posts().await?;
    Ok(Json(DashboardStats::compute(&posts, Utc::now())))
}

// ==========================================
// Category Management
// ==========================================

pub async fn create_category(
    State(store): State<Store>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let category = store.insert_category(&payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Rebuilds every `postCount` from actual post membership.
pub async fn reconcile_categories(
    State(store): State<Store>,
) -> Result<impl IntoResponse, AppError> {
    let categories = store.reconcile_post_counts().await?;
    tracing::info!("Reconciled {} category counters", categories.len());
    Ok(Json(categories))
}
