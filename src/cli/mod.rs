use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod auth;
pub mod init;
pub mod job;
pub mod migrate;
pub mod serve;
pub mod suggest;

use crate::core::AppConfig;
use job::JobId;

#[derive(Subcommand)]
enum Command {
    /// Create the database and schema
    Init {
        #[arg(long, action, default_value = "false")]
        db: bool,
    },
    /// Migrate the db schema
    Migrate {
        #[arg(long, action, default_value = "false")]
        db: bool,
    },
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Authorize Google Calendar access for an organizer
    Auth {
        #[arg(long)]
        email: Option<String>,
    },
    /// Run a periodic job once
    Job {
        #[arg(long, value_enum)]
        id: JobId,
    },
    /// Print ranked slot suggestions for a meeting
    Suggest {
        #[arg(long)]
        meeting_id: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Init { db }) => {
            init::run(db, &config.db_path).await?;
        }
        Some(Command::Migrate { db }) => {
            migrate::run(db, &config.db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Auth { email }) => {
            auth::run(email, &config).await?;
        }
        Some(Command::Job { id }) => {
            job::run(id).await?;
        }
        Some(Command::Suggest { meeting_id }) => {
            suggest::run(&meeting_id, &config).await?;
        }
        None => {}
    }

    Ok(())
}
