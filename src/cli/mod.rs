pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "jobly")]
#[command(about = "Jobly CLI - database and token administration for the Jobly API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Issue a signed token using the configured secret")]
    Token {
        #[arg(help = "Username to put in the token")]
        username: String,

        #[arg(long, help = "Mark the token as an admin token")]
        admin: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Token { username, admin } => commands::token::handle(&username, admin, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_command() {
        let cli = Cli::parse_from(["jobly", "--json", "token", "u1", "--admin"]);

        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        match cli.command {
            Commands::Token { username, admin } => {
                assert_eq!(username, "u1");
                assert!(admin);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parses_migrate_command() {
        let cli = Cli::parse_from(["jobly", "migrate"]);
        assert!(matches!(cli.command, Commands::Migrate));
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }
}
