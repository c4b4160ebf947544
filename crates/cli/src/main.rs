//! Bloomway CLI - operator tools for the Bloomway REST API.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog with the storefront's filters
//! bw-cli catalog --city Seattle --max-price 40 --sort price_asc
//!
//! # Print the category tree
//! bw-cli categories
//!
//! # List stores, or only those open right now
//! bw-cli stores --open-now
//!
//! # Manage accounts (needs an admin token)
//! bw-cli users list
//! bw-cli users set-status <user-id> blocked
//! ```
//!
//! # Environment Variables
//!
//! - `BLOOMWAY_API_URL` - REST API base URL
//! - `BLOOMWAY_API_TOKEN` - Bearer token, required by `users`

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

use commands::CommandError;
use commands::catalog::CatalogArgs;

#[derive(Parser)]
#[command(name = "bw-cli")]
#[command(author, version, about = "Bloomway CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products with catalog filters
    Catalog(CatalogArgs),
    /// Print the category tree
    Categories,
    /// List stores and their opening status
    Stores {
        /// Only stores open at this moment
        #[arg(long)]
        open_now: bool,

        /// Only stores in this city
        #[arg(long)]
        city: Option<String>,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// List every account
    List,
    /// Block or unblock an account
    SetStatus {
        /// User id
        id: String,

        /// New status (`active` or `blocked`)
        status: String,
    },
}

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Catalog(args) => commands::catalog::list(&args).await?,
        Commands::Categories => commands::categories::tree().await?,
        Commands::Stores { open_now, city } => {
            commands::stores::list(open_now, city.as_deref()).await?;
        }
        Commands::Users { action } => match action {
            UsersAction::List => commands::users::list().await?,
            UsersAction::SetStatus { id, status } => {
                commands::users::set_status(&id, &status).await?;
            }
        },
    }
    Ok(())
}
