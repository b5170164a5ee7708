use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod commands;

use commands::{create_superuser, init_database, migrate_and_serve, serve};

#[derive(Parser)]
#[command(name = "taxi")]
#[command(about = "Taxi service: fleet management web application and admin tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Database URL
        ///
        /// Overrides TAXI_DATABASE_URL. For SQLite databases, use:
        ///   - sqlite:///absolute/path/to/database.sqlite?mode=rwc
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// Initialize the database using migrations
    InitDb {
        /// Database URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
    /// Apply pending migrations, then start the web server
    MigrateAndServe {
        /// Database URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Bind address for the web server
        #[arg(short, long, env = "BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// Create a driver account with staff and superuser rights
    CreateSuperuser {
        /// Login name of the new account
        #[arg(short, long)]
        username: String,

        /// Password of the new account
        #[arg(short, long, env = "TAXI_SUPERUSER_PASSWORD")]
        password: String,

        /// Email address of the new account
        #[arg(short, long, default_value = "")]
        email: String,

        /// Database URL
        #[arg(short, long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let settings = Settings::load()?;
        match self.command {
            Commands::Serve { database_url, bind_address } => {
                serve(&settings.with_overrides(database_url, bind_address)).await?;
            }
            Commands::InitDb { database_url } => {
                let settings = settings.with_overrides(database_url, None);
                init_database(&settings.database_url).await?;
            }
            Commands::MigrateAndServe { database_url, bind_address } => {
                migrate_and_serve(&settings.with_overrides(database_url, bind_address)).await?;
            }
            Commands::CreateSuperuser {
                username,
                password,
                email,
                database_url,
            } => {
                let settings = settings.with_overrides(database_url, None);
                create_superuser(&settings.database_url, &username, &password, &email).await?;
            }
        }
        Ok(())
    }
}
