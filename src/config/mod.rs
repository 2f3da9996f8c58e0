//! Configuration for the lesson-coherence binary.
//!
//! A single YAML file carries engine settings, output preferences and the
//! full rule tables. Every section is optional; missing keys take defaults.

pub use self::global::{GlobalConfig, OutputFormat};

mod global;

/// Alias used by the binary entry point.
pub type Config = GlobalConfig;
