use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::auth::password::PasswordError;
use crate::clause::ClauseError;
use crate::config::AppConfig;

/// Errors raised by the pool manager and the repositories
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error(transparent)]
    Clause(#[from] ClauseError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    /// Constraint violations are the backstop for the check-then-insert race,
    /// so they surface as the same errors the explicit checks produce.
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("constraint").to_string();
            if db_err.is_unique_violation() {
                return DatabaseError::Conflict(format!("Duplicate value violates {}", constraint));
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::InvalidReference(format!("Referenced row missing for {}", constraint));
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Pool construction, migrations, and liveness checks
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect a pool according to `config`, optionally running migrations.
    pub async fn connect(config: &AppConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect(&connection_string)
            .await?;

        info!(
            "Created database pool (max {} connections)",
            config.database.max_connections
        );

        if config.database.run_migrations {
            Self::migrate(&pool).await?;
        }

        Ok(pool)
    }

    /// Build a pool that connects on first use.
    pub fn connect_lazy(config: &AppConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::build_connection_string(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(Duration::from_secs(config.database.connection_timeout))
            .connect_lazy(&connection_string)?;
        Ok(pool)
    }

    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// The configured URL, with the database swapped for the environment's own when it has one.
    fn build_connection_string(config: &AppConfig) -> Result<String, DatabaseError> {
        let base = &config.database.url;
        let Some(database_name) = config.database_name() else {
            return Ok(base.clone());
        };

        let mut url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_path(&format!("/{}", database_name));
        Ok(url.into())
    }
}
