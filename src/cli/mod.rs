pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "vidly")]
#[command(about = "Vidly CLI - operator tooling for the video rental API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign an auth token with the configured secret")]
    Token(commands::token::TokenArgs),

    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,

    #[command(about = "Check a running server's /health endpoint")]
    Health(commands::health::HealthArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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
        Commands::Token(args) => commands::token::handle(args, output_format).await,
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Health(args) => commands::health::handle(args, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_command() {
        let cli = Cli::parse_from([
            "vidly",
            "--json",
            "token",
            "--user-id",
            "7b0e6a52-2a44-4f7e-9a55-0c6f3c1f4a10",
            "--admin",
        ]);
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Token(args) => assert!(args.admin),
            _ => panic!("expected token command"),
        }
    }

    #[test]
    fn health_url_has_default() {
        let cli = Cli::parse_from(["vidly", "health"]);
        match cli.command {
            Commands::Health(args) => assert_eq!(args.url, "http://localhost:3000"),
            _ => panic!("expected health command"),
        }
    }
}
