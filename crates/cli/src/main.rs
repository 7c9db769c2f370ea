//! SeedMart CLI - Database migrations, demo data, and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sm-cli migrate
//!
//! # Load the demo admin, buyers, and seed catalogue
//! sm-cli seed
//!
//! # Promote an existing account to admin
//! sm-cli admin promote -e owner@example.com
//! ```
//!
//! # Environment Variables
//!
//! - `SEEDMART_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sm-cli")]
#[command(author, version, about = "SeedMart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Insert or refresh the demo accounts and catalogue
    Seed,
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Give an existing account the admin role
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => commands::admin::promote(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_promote() {
        let cli = Cli::parse_from(["sm-cli", "admin", "promote", "-e", "owner@example.com"]);
        assert!(matches!(
            cli.command,
            Commands::Admin {
                action: AdminAction::Promote { ref email }
            } if email == "owner@example.com"
        ));
    }
}
