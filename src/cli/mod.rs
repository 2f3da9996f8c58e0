//! CLI module for lesson-coherence - command-line interface and rendering.
//!
//! Provides the subcommands for full, quick and batch validation, and the
//! coloured text rendering of reports.

pub mod commands;
pub mod output;

pub use commands::Cli;
