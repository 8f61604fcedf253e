//! Slipdesk CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (schema and session table)
//! slipdesk migrate
//!
//! # Create the first admin account
//! SLIPDESK_USER_PASSWORD=... slipdesk user create -u owner -e owner@example.com -r admin
//!
//! # Delete slips delivered more than 5 days ago, with their images
//! slipdesk sweep --days 5
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create a user with any role
//! - `sweep` - Run the retention sweep once

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use secrecy::SecretString;

mod commands;

#[derive(Parser)]
#[command(name = "slipdesk")]
#[command(author, version, about = "Slipdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Delete expired slips and their images now
    Sweep {
        /// Days a slip is kept after its delivery date
        #[arg(short, long, env = "RETENTION_DAYS")]
        days: Option<u32>,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Role (`admin`, `staff`, `chef`, `delivery`)
        #[arg(short, long, default_value = "staff")]
        role: String,

        /// Password (prefer the environment variable)
        #[arg(short, long, env = "SLIPDESK_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = parse_args();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Parse arguments after loading `.env`, so `env = ...` fallbacks see it.
fn parse_args() -> Cli {
    dotenvy::dotenv().ok();
    Cli::parse()
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                role,
                password,
            } => {
                let password = SecretString::from(password);
                commands::user::create_user(&username, &email, &role, &password).await?;
            }
        },
        Commands::Sweep { days } => {
            commands::sweep::run(days).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_env_file_supplies_retention_days() {
        let path = std::env::temp_dir().join(format!("slipdesk-cli-{}.env", std::process::id()));
        std::fs::write(&path, "RETENTION_DAYS=7\n").unwrap();
        dotenvy::from_path_override(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let cli = Cli::try_parse_from(["slipdesk", "sweep"]).unwrap();

        assert!(matches!(cli.command, Commands::Sweep { days: Some(7) }));
    }

    #[test]
    fn test_flag_overrides_environment() {
        let cli = Cli::try_parse_from(["slipdesk", "sweep", "--days", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Sweep { days: Some(3) }));
    }
}
