//! Tensive CLI, the main entry point.
//!
//! Commands:
//! - `chat`      Interactive or single-message conversation
//! - `serve`     Start the HTTP gateway
//! - `topics`    Show how a query ranks against the knowledge base
//! - `estimate`  Compute a spot-repair material manifest
//! - `onboard`   Write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "tensive",
    about = "Tensive Repair Assistant: roofing repair guidance and material estimates",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the repair assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Attach a roof photo (URL or data URI) to the single message
        #[arg(long)]
        image: Option<String>,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Rank knowledge base topics for a query
    Topics {
        /// The question to rank against
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Estimate materials for identical spot repairs
    Estimate {
        /// Patch length in feet
        length: f64,
        /// Patch width in feet
        width: f64,
        /// Number of patches
        #[arg(default_value_t = 1)]
        count: u32,
        /// Print the manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    Onboard,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat { message, image } => commands::chat::run(message, image).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Topics { query } => commands::topics::run(&query.join(" "))?,
        Commands::Estimate {
            length,
            width,
            count,
            json,
        } => commands::estimate::run(length, width, count, json)?,
        Commands::Onboard => commands::onboard::run()?,
    }

    Ok(())
}
