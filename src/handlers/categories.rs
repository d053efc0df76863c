use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{category::CategoryPosts, post::PageParams},
    store::{PostFilter, Store},
};

pub async fn list_categories(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.list_categories().await?))
}

pub async fn category_posts(
    State(store): State<Store>,
    Path(name): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let cursor = params.decode_cursor()?;
    let category = store.category_by_name(&name).await?;
    let filter = PostFilter::Category(&name);
    let page = store
        .posts_page(filter, cursor.as_ref(), params.page_size())
        .await?;

    Ok(Json(CategoryPosts { category, page }))
}
