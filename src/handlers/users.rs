// handlers/users.rs - /users routes
//
// Listing and creating users is admin-only; everything under
// /users/:username is open to that user or an admin.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use super::payload::{json_body, parse_id, validate_fields, validate_into, USER_NEW, USER_UPDATE};
use crate::auth::generate_jwt;
use crate::database::models::NewUser;
use crate::database::UserRepository;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /users - admin only
///
/// Unlike /auth/register this may create admins. Returns the user and a token for them.
pub async fn create_user(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> ApiResult<Value> {
    let data: NewUser = validate_into(json_body(body)?, &USER_NEW)?;

    let user = UserRepository::new(&state.pool, state.bcrypt_cost).register(&data).await?;
    let token = generate_jwt(&user.username, user.is_admin)?;

    Ok(ApiResponse::created(json!({ "user": user, "token": token })))
}

/// GET /users - admin only
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Value> {
    let users = UserRepository::new(&state.pool, state.bcrypt_cost).find_all().await?;

    Ok(ApiResponse::success(json!({ "users": users })))
}

/// GET /users/:username - includes applied job ids
pub async fn get_user(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    let user = UserRepository::new(&state.pool, state.bcrypt_cost).get(&username).await?;

    Ok(ApiResponse::success(json!({ "user": user })))
}

/// PATCH /users/:username
///
/// Body: any of `{ password, firstName, lastName, email, isAdmin }`. Only an
/// admin may change `isAdmin`.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(username): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let fields = validate_fields(&json_body(body)?, &USER_UPDATE)?;

    if fields.contains_key("isAdmin") && !caller.is_admin {
        return Err(ApiError::unauthorized("Only admins may change isAdmin"));
    }

    let user = UserRepository::new(&state.pool, state.bcrypt_cost)
        .update(&username, &fields)
        .await?;

    Ok(ApiResponse::success(json!({ "user": user })))
}

/// DELETE /users/:username
pub async fn delete_user(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<Value> {
    UserRepository::new(&state.pool, state.bcrypt_cost).remove(&username).await?;

    Ok(ApiResponse::success(json!({ "deleted": username })))
}

/// POST /users/:username/jobs/:id
pub async fn apply_to_job(
    State(state): State<AppState>,
    Path((username, id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let job_id = parse_id(&id)?;

    UserRepository::new(&state.pool, state.bcrypt_cost)
        .apply_to_job(&username, job_id)
        .await?;

    Ok(ApiResponse::success(json!({ "applied": job_id })))
}
