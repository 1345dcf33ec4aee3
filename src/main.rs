//! kubegraph - Kubernetes resource relationship and health analysis
//!
//! Reads exported manifests, builds the relationship graph, assesses health
//! and stores runs in SQLite for later queries.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cli::{ConfigSubcommand, QueryArgs, RelationshipArgs};
use kubegraph::config::{Config, ConfigLoader};

/// kubegraph - Kubernetes resource relationship and health analysis
#[derive(Parser, Debug)]
#[command(name = "kubegraph")]
#[command(about = "Analyze relationships and health of exported Kubernetes resources", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug logging (written to a temp file)
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze manifest files and print or save the JSON result
    Analyze {
        /// Files or directories of .json / .yaml manifests
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Write the JSON result to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Abort on the first malformed record
        #[arg(long)]
        strict: bool,
    },
    /// Analyze manifest files and store the run in the database
    Export {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[arg(long)]
        db: Option<PathBuf>,
        /// Resources per persistence commit (0 = one commit)
        #[arg(long)]
        batch_size: Option<usize>,
        /// Keep resources and relationships from earlier runs
        #[arg(long)]
        append: bool,
    },
    /// Query stored resources
    Query(QueryArgs),
    /// Query stored relationships
    Relationships(RelationshipArgs),
    /// Health summary of the stored resources
    Summary {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Health history of one resource
    History {
        /// Resource UID (or Kind/namespace/name for resources without one)
        uid: String,
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// List stored analysis runs
    Runs {
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        // Config commands must work even when the config file is broken
        Command::Config { subcommand } => cli::handle_config_command(subcommand).await,
        command => {
            let config = ConfigLoader::load()?;
            let log_file = cli::init_logging(args.debug, &config.logger.level);
            if let Some(ref log_path) = log_file {
                eprintln!(
                    "Debug logging enabled. Logs written to: {}",
                    log_path.display()
                );
            }
            tracing::debug!(?config, "Configuration loaded");

            run(command, &config).await
        }
    }
}

async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Analyze {
            paths,
            output,
            strict,
        } => cli::handle_analyze(config, paths, output, strict).await,
        Command::Export {
            paths,
            db,
            batch_size,
            append,
        } => cli::handle_export(config, paths, db, batch_size, append).await,
        Command::Query(query) => cli::handle_query(config, query).await,
        Command::Relationships(relationships) => cli::handle_relationships(config, relationships).await,
        Command::Summary { db } => cli::handle_summary(config, db).await,
        Command::History { uid, db } => cli::handle_history(config, uid, db).await,
        Command::Runs { db } => cli::handle_runs(config, db).await,
        Command::Config { subcommand } => cli::handle_config_command(subcommand).await,
    }
}
