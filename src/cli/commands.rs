//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - full: five-aspect validation with a consolidated report
//! - quick: fast-path gate
//! - batch: validate every activity matched by a glob pattern
//! - rules: print the effective rule tables

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lesson-coherence - coherence validation for generated group activities
#[derive(Parser, Debug)]
#[command(name = "lesson-coherence")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full five-aspect validation
    Full {
        /// Activity JSON file
        #[arg(short, long)]
        activity: PathBuf,

        /// Participant profiles JSON file
        #[arg(short, long)]
        profiles: PathBuf,

        /// Role and task assignments JSON file
        #[arg(short = 's', long)]
        assignments: Option<PathBuf>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Evaluate aspects in parallel
        #[arg(long)]
        concurrent: bool,
    },

    /// Run the quick gate only
    Quick {
        /// Activity JSON file
        #[arg(short, long)]
        activity: PathBuf,

        /// Participant profiles JSON file
        #[arg(short, long)]
        profiles: PathBuf,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Validate every activity file matching a glob pattern
    Batch {
        /// Glob pattern for activity files (e.g. "out/*.json")
        #[arg(short = 'g', long)]
        pattern: String,

        /// Participant profiles JSON file
        #[arg(short, long)]
        profiles: PathBuf,

        /// Role and task assignments JSON file
        #[arg(short = 's', long)]
        assignments: Option<PathBuf>,

        /// Use the quick gate instead of full validation
        #[arg(short, long)]
        quick: bool,
    },

    /// Print the effective rule tables as YAML
    Rules,
}
