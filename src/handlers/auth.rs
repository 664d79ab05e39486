// handlers/auth.rs - public token endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::payload::{json_body, validate_into, AUTH_TOKEN, USER_REGISTER};
use crate::auth::generate_jwt;
use crate::database::models::NewUser;
use crate::database::UserRepository;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

/// POST /auth/token
///
/// Body: `{ username, password }`. Returns `{ token }` on valid credentials.
pub async fn token(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let credentials: Credentials = validate_into(json_body(body)?, &AUTH_TOKEN)?;

    let user = UserRepository::new(&state.pool, state.bcrypt_cost)
        .authenticate(&credentials.username, &credentials.password)
        .await?;
    let token = generate_jwt(&user.username, user.is_admin)?;

    Ok(ApiResponse::success(json!({ "token": token })))
}

/// POST /auth/register
///
/// Self-service signup. New accounts are never admins.
pub async fn register(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let data: NewUser = validate_into(json_body(body)?, &USER_REGISTER)?;

    let user = UserRepository::new(&state.pool, state.bcrypt_cost).register(&data).await?;
    let token = generate_jwt(&user.username, false)?;

    Ok(ApiResponse::created(json!({ "token": token })))
}

/// GET /auth/whoami
///
/// Echoes the identity carried by the caller's token. Mounted behind `ensure_logged_in`.
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "username": user.username,
        "isAdmin": user.is_admin,
    })))
}
