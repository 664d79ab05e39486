pub mod app;
pub mod auth;
pub mod clause;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

pub use app::app;
pub use state::AppState;

/// Install the `tracing` subscriber shared by both binaries.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jobly_api=debug,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
