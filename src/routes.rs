// src/routes.rs

use std::path::Path;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    handlers::{admin, auth, categories, comments, posts},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Nests the JSON API under `/api` (auth, posts, comments, categories, admin).
/// * Serves the built front-end from `static_dir`, falling back to
///   `index.html` so client-side routes resolve.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
            HeaderValue::from_static("http://localhost:5173"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/redirect-result", get(auth::redirect_result))
        .merge(
            Router::new()
                .route("/me", get(auth::me))
                .route("/admin-status", get(auth::admin_status))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let post_routes = Router::new()
        .route("/", get(posts::list_posts))
        .route("/by-slug/{slug}", get(posts::get_post_by_slug))
        .route("/{id}", get(posts::get_post))
        .route("/{id}/thread", get(posts::comment_thread))
        .route("/{id}/comments", get(posts::list_comments))
        // Protected comment route
        .merge(
            Router::new()
                .route("/{id}/comments", post(comments::create_comment))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let comment_routes = Router::new().route("/{id}/vote", post(comments::vote_comment));

    let category_routes = Router::new()
        .route("/", get(categories::list_categories))
        .route("/{name}/posts", get(categories::category_posts));

    let admin_routes = Router::new()
        .route("/posts", get(admin::list_posts).post(admin::create_post))
        .route(
            "/posts/{id}",
            get(admin::get_post)
                .put(admin::update_post)
                .delete(admin::delete_post),
        )
        .route("/dashboard", get(admin::dashboard))
        .route("/categories", post(admin::create_category))
        .route("/categories/reconcile", post(admin::reconcile_categories))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn_with_state(state.clone(), admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/posts", post_routes)
        .nest("/comments", comment_routes)
        .nest("/categories", category_routes)
        .nest("/admin", admin_routes)
        .fallback(api_not_found);

    let static_dir = Path::new(&state.config.static_dir);
    let spa = ServeDir::new(static_dir)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/api", api)
        .fallback_service(spa)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

async fn api_not_found() -> AppError {
    AppError::NotFound("No such endpoint".to_string())
}
