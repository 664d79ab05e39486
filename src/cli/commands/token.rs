use serde_json::json;

use super::output_success;
use crate::auth::generate_jwt;
use crate::cli::OutputFormat;

pub fn handle(username: &str, admin: bool, output_format: OutputFormat) -> anyhow::Result<()> {
    let token = generate_jwt(username, admin)?;

    match output_format {
        OutputFormat::Json => output_success(
            output_format,
            &format!("Token issued for {}", username),
            json!({ "token": token, "username": username, "isAdmin": admin }),
        ),
        // bare token so it can be captured by a shell
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
