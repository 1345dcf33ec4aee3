//! CLI command handling module
//!
//! Handles all CLI subcommands and argument parsing.

mod commands;
mod config;
mod logging;

pub use commands::{
    handle_analyze, handle_export, handle_history, handle_query, handle_relationships,
    handle_runs, handle_summary, QueryArgs, RelationshipArgs,
};
pub use config::{handle_config_command, ConfigSubcommand};
pub use logging::*;
