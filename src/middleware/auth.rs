use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::{decode_token, Claims};
use crate::config;

/// Identity carried by a verified bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Verify the bearer token if there is one and attach an `AuthUser`.
///
/// Never rejects a request. A missing, malformed, or expired token just leaves
/// the request anonymous; the route guards decide what that means.
pub async fn authenticate_jwt(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    if let Some(token) = extract_jwt_from_headers(&headers) {
        match decode_token(token, &config::config().security.jwt_secret) {
            Ok(claims) => {
                request.extensions_mut().insert(AuthUser::from(claims));
            }
            Err(e) => debug!("Ignoring bearer token: {}", e),
        }
    }

    next.run(request).await
}

/// Token from `Authorization`, with a leading `Bearer `/`bearer ` removed.
fn extract_jwt_from_headers(headers: &HeaderMap) -> Option<&str> {
    let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .or_else(|| auth_str.strip_prefix("bearer "))
        .unwrap_or(auth_str)
        .trim();

    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{create_token, generate_jwt};
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    async fn whoami(user: Option<Extension<AuthUser>>) -> String {
        match user {
            Some(Extension(user)) => format!("{}:{}", user.username, user.is_admin),
            None => "anonymous".to_string(),
        }
    }

    fn test_app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .layer(middleware::from_fn(authenticate_jwt))
    }

    async fn call(authorization: Option<String>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        let response = test_app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn strips_either_bearer_spelling() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(extract_jwt_from_headers(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, "bearer abc ".parse().unwrap());
        assert_eq!(extract_jwt_from_headers(&headers), Some("abc"));

        headers.insert(AUTHORIZATION, "Bearer ".parse().unwrap());
        assert_eq!(extract_jwt_from_headers(&headers), None);
    }

    #[tokio::test]
    async fn valid_token_attaches_identity() {
        let token = generate_jwt("u1", true).unwrap();

        let (status, body) = call(Some(format!("Bearer {}", token))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "u1:true");
    }

    #[tokio::test]
    async fn missing_token_stays_anonymous() {
        let (status, body) = call(None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn bad_token_stays_anonymous() {
        let forged = create_token("u1", true, "some-other-secret", 1).unwrap();

        for header in ["Bearer garbage".to_string(), format!("Bearer {}", forged)] {
            let (status, body) = call(Some(header)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "anonymous");
        }
    }
}
