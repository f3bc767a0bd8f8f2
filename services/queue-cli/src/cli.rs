//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use neuvue_queue::{Datatype, Sieve};

use crate::error::{Error, Result};

/// Command-line client for a NeuVue queue
#[derive(Parser, Debug)]
#[command(name = "neuvue-queue", version, arg_required_else_help = true)]
#[command(about = "Query and edit a NeuVue task queue", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(
        long,
        global = true,
        env = "CONFIG_PATH",
        default_value = "neuvue-queue.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Log in through the browser and save credentials
    Login,

    /// List records of one datatype as JSON
    List {
        /// points, tasks, differstacks, agents, graphs or volumes
        #[arg(value_parser = parse_datatype)]
        datatype: Datatype,

        /// Filter document, e.g. '{"author": "ada"}'
        #[arg(long, value_parser = parse_sieve)]
        sieve: Option<Sieve>,

        /// Maximum number of records (0 means all)
        #[arg(long)]
        limit: Option<usize>,

        /// Field to sort by; a leading `-` sorts descending
        #[arg(long, allow_hyphen_values = true)]
        sort: Option<String>,

        /// Match inactive records when the sieve does not mention `active`
        #[arg(long)]
        inactive: bool,
    },

    /// Fetch one record
    Get {
        #[arg(value_parser = parse_datatype)]
        datatype: Datatype,
        id: String,
    },

    /// Delete one record
    Delete {
        #[arg(value_parser = parse_datatype)]
        datatype: Datatype,
        id: String,
    },

    /// Show the task an assignee should work on next
    NextTask { assignee: String, namespace: String },
}

/// Plural or singular resource name.
pub fn parse_datatype(name: &str) -> Result<Datatype> {
    match name {
        "points" | "point" => Ok(Datatype::Point),
        "tasks" | "task" => Ok(Datatype::Task),
        "differstacks" | "differstack" => Ok(Datatype::DifferStack),
        "agents" | "agent" => Ok(Datatype::Agent),
        "graphs" | "graph" => Ok(Datatype::Graph),
        "volumes" | "volume" => Ok(Datatype::Volume),
        other => Err(Error::UnknownDatatype(other.to_string())),
    }
}

/// A JSON object (or `null`) to send as the sieve.
pub fn parse_sieve(raw: &str) -> Result<Sieve> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| Error::InvalidSieve(e.to_string()))?;
    Sieve::from_value(value).map_err(|e| Error::InvalidSieve(e.to_string()))
}
