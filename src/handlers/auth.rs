// src/handlers/auth.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{LoginRequest, LoginResponse, RedirectResult, RegisterRequest, SignedIn},
    store::Store,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
        sign_in::{PendingSignIns, SignInMode},
    },
};

/// Registers a new account.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the session user (no password).
pub async fn register(
    State(store): State<Store>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let hashed_password = hash_password(&payload.password)?;
    let display_name = payload.display_name.as_deref();
    let account = store
        .insert_account(&payload.email, display_name, &hashed_password)
        .await?;

    tracing::info!("Account registered: {}", account.email);
    Ok((StatusCode::CREATED, Json(account.session_user())))
}

/// Signs an account in.
///
/// Desktop agents get the token straight back (popup flow). Mobile agents
/// get 202 Accepted with a one-time code to collect through
/// `/api/auth/redirect-result` once the app restarts.
pub async fn login(
    State(store): State<Store>,
    State(config): State<Config>,
    State(sign_ins): State<PendingSignIns>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let account = store
        .account_by_email(&payload.email)
        .await?
        .ok_or(AppError::AuthError("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &account.password)? {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let user = account.session_user();
    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok());

    match SignInMode::for_user_agent(user_agent) {
        SignInMode::Popup => Ok((StatusCode::OK, Json(LoginResponse::Popup { token, user }))),
        SignInMode::Redirect => {
            let redirect_code = sign_ins.issue(SignedIn { token, user });
            tracing::debug!("Sign-in parked for redirect completion");
            Ok((
                StatusCode::ACCEPTED,
                Json(LoginResponse::Redirect { redirect_code }),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RedirectParams {
    pub code: Option<String>,
}

/// Completes a pending redirect sign-in.
///
/// Unknown, expired and already used codes yield an empty result rather than
/// an error; there is simply nothing to complete.
pub async fn redirect_result(
    State(sign_ins): State<PendingSignIns>,
    Query(params): Query<RedirectParams>,
) -> Json<RedirectResult> {
    let pending = params.code.and_then(|code| sign_ins.redeem(&code));

    Json(match pending {
        Some(SignedIn { token, user }) => RedirectResult {
            token: Some(token),
            user: Some(user),
        },
        None => RedirectResult::default(),
    })
}

/// The identity behind the bearer token.
pub async fn me(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(claims.session_user())
}

/// Whether the signed-in email is an administrator.
pub async fn admin_status(
    State(store): State<Store>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let is_admin = store.is_admin(&claims.email).await?;
    Ok(Json(json!({ "isAdmin": is_admin })))
}
