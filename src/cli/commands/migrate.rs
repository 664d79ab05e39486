use serde_json::json;

use super::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();

    // connect() only migrates when configured to; here it is the whole point
    let pool = DatabaseManager::connect_lazy(config)?;
    DatabaseManager::migrate(&pool).await?;

    output_success(
        output_format,
        "Migrations applied",
        json!({ "environment": format!("{:?}", config.environment) }),
    )
}
