//! Terra Verde CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! tv-cli migrate
//!
//! # Seed the database with demo catalog data
//! tv-cli seed
//!
//! # Register a delivery driver (provisions the login account)
//! tv-cli driver create -e joao@terraverde.agr.br -n "Joao Santos" -v motorcycle
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed database with demo data
//! - `driver create` - Register delivery drivers

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "tv-cli")]
#[command(author, version, about = "Terra Verde CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with demo catalog data
    Seed,
    /// Manage delivery drivers
    Driver {
        #[command(subcommand)]
        action: DriverAction,
    },
}

#[derive(Subcommand)]
enum DriverAction {
    /// Register a new delivery driver
    Create {
        /// Driver email address (also the login email)
        #[arg(short, long)]
        email: String,

        /// Driver full name
        #[arg(short, long)]
        name: String,

        /// Vehicle type (`motorcycle`, `car`, `van`, `truck`)
        #[arg(short, long, default_value = "motorcycle")]
        vehicle: String,

        /// Initial login password (prompted for if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::Driver { action } => match action {
            DriverAction::Create {
                email,
                name,
                vehicle,
                password,
            } => {
                commands::driver::create(&email, &name, &vehicle, password.as_deref()).await?;
            }
        },
    }
    Ok(())
}
