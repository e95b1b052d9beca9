//! memkeep - Identity-isolated memory stores with a suggestion-approved shared pool

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use memkeep::{
    collab::{Decision, Urgency},
    config::MemKeepConfig,
    provision, MemorySystem,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "memkeep")]
#[command(version)]
#[command(about = "Identity-isolated memory stores with a suggestion-approved shared pool")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MEMKEEP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the storage directories
    Init,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },

    #[command(flatten)]
    Memory(MemoryCommand),
}

#[derive(Subcommand)]
enum MemoryCommand {
    /// Save a memory into an identity's private store
    Save {
        /// Identity saving the memory
        #[arg(long = "as", value_name = "IDENTITY")]
        identity: String,

        /// Memory type
        #[arg(long = "type", default_value = "general")]
        memory_type: String,

        /// Mark the memory important
        #[arg(long)]
        important: bool,

        /// Memory content
        content: String,
    },

    /// Recall an identity's memories
    Recall {
        #[arg(long = "as", value_name = "IDENTITY")]
        identity: String,

        /// Case-insensitive substring filter
        query: Option<String>,
    },

    /// Report keep/discard verdicts for an identity's memories
    Review {
        #[arg(long = "as", value_name = "IDENTITY")]
        identity: String,
    },

    /// Suggest content for the shared pool
    Suggest {
        content: String,

        #[arg(long)]
        reason: Option<String>,

        /// low, medium, high or any other label
        #[arg(long, default_value = "low")]
        urgency: String,
    },

    /// Accept or reject a pending suggestion
    Decide {
        #[arg(long = "as", value_name = "IDENTITY")]
        identity: String,

        suggestion_id: String,

        /// accept or reject
        decision: Decision,

        #[arg(long)]
        reason: Option<String>,
    },

    /// List suggestions awaiting a decision
    Pending,

    /// List every suggestion and its outcome
    History,

    /// List shared memories
    Shared {
        query: Option<String>,
    },

    /// List registered identities
    Identities,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("memkeep={}", log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    let config = match &cli.config {
        Some(path) => MemKeepConfig::from_file(path)?,
        None => MemKeepConfig::default(),
    };

    match cli.command {
        Commands::Init => {
            provision(&config).await?;
            print_json(&config.all_paths())?;
        }
        Commands::Config { default } => {
            let shown = if default {
                MemKeepConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&shown)?);
        }
        Commands::Memory(command) => run(command, &config).await?,
    }

    Ok(())
}

async fn run(command: MemoryCommand, config: &MemKeepConfig) -> Result<()> {
    let system = MemorySystem::open(config).await?;
    let registry = system.registry();
    let hub = system.hub();

    match command {
        MemoryCommand::Save {
            identity,
            memory_type,
            important,
            content,
        } => {
            let id = registry
                .save_as(&identity, &content, &memory_type, important)
                .await?;
            print_json(&serde_json::json!({ "identity": identity, "memory_id": id }))?;
        }
        MemoryCommand::Recall { identity, query } => {
            print_json(&registry.recall_as(&identity, query.as_deref()).await?)?;
        }
        MemoryCommand::Review { identity } => {
            print_json(&registry.review_as(&identity).await?)?;
        }
        MemoryCommand::Suggest {
            content,
            reason,
            urgency,
        } => {
            let id = hub
                .propose(&content, reason.as_deref(), Urgency::from(urgency))
                .await?;
            print_json(&serde_json::json!({ "status": "suggested", "suggestion_id": id }))?;
        }
        MemoryCommand::Decide {
            identity,
            suggestion_id,
            decision,
            reason,
        } => {
            let resolution = hub
                .resolve(&identity, &suggestion_id, decision, reason.as_deref())
                .await?;
            print_json(&resolution)?;
        }
        MemoryCommand::Pending => print_json(&hub.list_pending().await)?,
        MemoryCommand::History => print_json(&hub.list_all().await)?,
        MemoryCommand::Shared { query } => print_json(&hub.list_shared(query.as_deref()).await)?,
        MemoryCommand::Identities => print_json(&registry.identities())?,
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
