use axum::{
    extract::{Path, Request},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;

use super::auth::AuthUser;
use crate::error::ApiError;

/// What a route requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    LoggedIn,
    Admin,
    /// The user named by the route, or any admin.
    CorrectUserOrAdmin,
}

impl Access {
    /// Decide whether `user` may reach a route; `target` is the username the route names.
    pub fn check(self, user: Option<&AuthUser>, target: Option<&str>) -> Result<(), ApiError> {
        let user = user.ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        let allowed = match self {
            Access::LoggedIn => true,
            Access::Admin => user.is_admin,
            Access::CorrectUserOrAdmin => target == Some(user.username.as_str()) || user.is_admin,
        };

        if allowed {
            Ok(())
        } else {
            Err(ApiError::unauthorized("Unauthorized"))
        }
    }
}

pub async fn ensure_logged_in(request: Request, next: Next) -> Result<Response, ApiError> {
    Access::LoggedIn.check(request.extensions().get::<AuthUser>(), None)?;
    Ok(next.run(request).await)
}

pub async fn ensure_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    Access::Admin.check(request.extensions().get::<AuthUser>(), None)?;
    Ok(next.run(request).await)
}

/// Guard for `/users/:username/...` routes.
pub async fn ensure_correct_user_or_admin(
    Path(params): Path<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let target = params.get("username").map(String::as_str);
    Access::CorrectUserOrAdmin.check(request.extensions().get::<AuthUser>(), target)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_jwt;
    use crate::middleware::authenticate_jwt;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    fn user(username: &str, is_admin: bool) -> AuthUser {
        AuthUser {
            username: username.to_string(),
            is_admin,
        }
    }

    #[test]
    fn anonymous_is_always_refused() {
        for access in [Access::LoggedIn, Access::Admin, Access::CorrectUserOrAdmin] {
            assert!(access.check(None, Some("u1")).is_err());
        }
    }

    #[test]
    fn logged_in_accepts_anyone_with_a_token() {
        assert!(Access::LoggedIn.check(Some(&user("u1", false)), None).is_ok());
    }

    #[test]
    fn admin_requires_the_flag() {
        assert!(Access::Admin.check(Some(&user("u1", false)), None).is_err());
        assert!(Access::Admin.check(Some(&user("u1", true)), None).is_ok());
    }

    #[test]
    fn correct_user_or_admin() {
        assert!(Access::CorrectUserOrAdmin.check(Some(&user("u1", false)), Some("u1")).is_ok());
        assert!(Access::CorrectUserOrAdmin.check(Some(&user("admin", true)), Some("u1")).is_ok());
        // being logged in is not enough
        assert!(Access::CorrectUserOrAdmin.check(Some(&user("u2", false)), Some("u1")).is_err());
        assert!(Access::CorrectUserOrAdmin.check(Some(&user("u2", false)), None).is_err());
    }

    fn guarded_app() -> Router {
        Router::new()
            .route("/private", get(|| async { "ok" }).route_layer(middleware::from_fn(ensure_logged_in)))
            .route("/admin", get(|| async { "ok" }).route_layer(middleware::from_fn(ensure_admin)))
            .route(
                "/users/:username",
                get(|| async { "ok" }).route_layer(middleware::from_fn(ensure_correct_user_or_admin)),
            )
            .layer(middleware::from_fn(authenticate_jwt))
    }

    async fn status_for(uri: &str, token: Option<String>) -> StatusCode {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        guarded_app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn guards_reject_with_401() {
        let plain = generate_jwt("u1", false).unwrap();
        let admin = generate_jwt("admin", true).unwrap();

        assert_eq!(status_for("/private", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for("/private", Some(plain.clone())).await, StatusCode::OK);

        assert_eq!(status_for("/admin", Some(plain.clone())).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for("/admin", Some(admin.clone())).await, StatusCode::OK);

        assert_eq!(status_for("/users/u1", Some(plain.clone())).await, StatusCode::OK);
        assert_eq!(status_for("/users/u2", Some(plain)).await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for("/users/u2", Some(admin)).await, StatusCode::OK);
        assert_eq!(status_for("/users/u2", None).await, StatusCode::UNAUTHORIZED);
    }
}
