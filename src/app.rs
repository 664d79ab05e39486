use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::config::{self, AppConfig};
use crate::database::DatabaseManager;
use crate::handlers::{auth, companies, jobs, users};
use crate::middleware::{authenticate_jwt, ensure_admin, ensure_correct_user_or_admin, ensure_logged_in};
use crate::state::AppState;

/// The full HTTP surface with global middleware applied.
pub fn app(state: AppState) -> Router {
    let config = config::config();

    let router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(company_routes())
        .merge(job_routes())
        .merge(user_routes())
        // Advisory: only attaches an identity, the guards above enforce it
        .layer(middleware::from_fn(authenticate_jwt))
        .layer(cors_layer(config))
        // Always on; RUST_LOG decides whether tower_http spans are printed
        .layer(TraceLayer::new_for_http());

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(auth::token))
        .route("/auth/register", post(auth::register))
        .route(
            "/auth/whoami",
            get(auth::whoami).route_layer(middleware::from_fn(ensure_logged_in)),
        )
}

fn company_routes() -> Router<AppState> {
    let admin = || middleware::from_fn(ensure_admin);

    Router::new()
        .route(
            "/companies",
            get(companies::list_companies).merge(post(companies::create_company).route_layer(admin())),
        )
        .route(
            "/companies/:handle",
            get(companies::get_company).merge(
                patch(companies::update_company)
                    .delete(companies::delete_company)
                    .route_layer(admin()),
            ),
        )
}

fn job_routes() -> Router<AppState> {
    let admin = || middleware::from_fn(ensure_admin);

    Router::new()
        .route("/jobs", get(jobs::list_jobs).merge(post(jobs::create_job).route_layer(admin())))
        .route(
            "/jobs/:id",
            get(jobs::get_job).merge(patch(jobs::update_job).delete(jobs::delete_job).route_layer(admin())),
        )
}

fn user_routes() -> Router<AppState> {
    let admin = || middleware::from_fn(ensure_admin);
    let correct_user = || middleware::from_fn(ensure_correct_user_or_admin);

    Router::new()
        .route(
            "/users",
            get(users::list_users).post(users::create_user).route_layer(admin()),
        )
        .route(
            "/users/:username",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user)
                .route_layer(correct_user()),
        )
        .route(
            "/users/:username/jobs/:id",
            post(users::apply_to_job).route_layer(correct_user()),
        )
}

/// Permissive unless origins are configured.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Jobly API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/auth/token, /auth/register (public), /auth/whoami (logged in)",
                "companies": "/companies[/:handle] (read public, write admin)",
                "jobs": "/jobs[/:id] (read public, write admin)",
                "users": "/users[/:username[/jobs/:id]] (admin or same user)",
                "health": "/health (public)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database temporarily unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
