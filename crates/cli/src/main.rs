//! ArionComply CLI - database migrations and offline inspection.
//!
//! # Usage
//!
//! ```bash
//! # Run console database migrations
//! ac-cli migrate
//!
//! # Show the sidebar an auditor sees
//! ac-cli nav --role auditor
//!
//! # Resolve the layout for a path
//! ac-cli layout /controls --query embed=1
//! ac-cli layout /dashboard --anonymous
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `nav` - Print the navigation tree for a role
//! - `layout` - Print the resolved layout for a path

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ac-cli")]
#[command(author, version, about = "ArionComply CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run console database migrations
    Migrate,
    /// Print the navigation tree visible to a role
    Nav {
        /// Role (`admin`, `manager`, `auditor`, `user`)
        #[arg(short, long, default_value = "admin")]
        role: String,

        /// Print JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Resolve the layout for a path
    Layout {
        /// Request path, e.g. `/controls`
        path: String,

        /// Query parameter as `key=value` (repeatable)
        #[arg(short, long = "query")]
        query: Vec<String>,

        /// Resolve for a logged-out visitor
        #[arg(long, conflicts_with = "role")]
        anonymous: bool,

        /// Resolve as if loaded inside a frame
        #[arg(long)]
        embedded: bool,

        /// Sign in with this role instead of the demo identity
        #[arg(short, long)]
        role: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ac_cli=info,arioncomply_core=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

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
        Commands::Nav { role, json } => commands::inspect::nav(&role, json)?,
        Commands::Layout {
            path,
            query,
            anonymous,
            embedded,
            role,
        } => commands::inspect::layout(&commands::inspect::LayoutArgs {
            path,
            query,
            anonymous,
            embedded,
            role,
        })?,
    }
    Ok(())
}
