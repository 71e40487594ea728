//! GMExpress CLI - Data maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # List identity records with no profile document and delete them
//! gm-cli users cleanup-orphans
//!
//! # Same, without the confirmation prompt
//! gm-cli users cleanup-orphans --yes
//!
//! # Create the default product categories
//! gm-cli seed categories
//! ```
//!
//! # Commands
//!
//! - `users cleanup-orphans` - Delete orphaned identity records
//! - `seed categories` - Insert default categories (idempotent)

#![cfg_attr(not(test), forbid(unsafe_code))]
// Command results are reported on stdout
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "GMExpress CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage platform users
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
    /// Seed reference data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Delete identity records that have no `users/{uid}` document
    CleanupOrphans {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert the default product categories
    Categories,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Users { action } => match action {
            UsersAction::CleanupOrphans { yes } => commands::users::cleanup_orphans(yes).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Categories => commands::seed::categories().await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cleanup_with_yes() {
        let cli = Cli::try_parse_from(["gm-cli", "users", "cleanup-orphans", "--yes"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Users {
                action: UsersAction::CleanupOrphans { yes: true }
            })
        ));
    }
}
