//! Global configuration.
//!
//! Loaded from --config, ./.lesson-coherence.yml or
//! ~/.config/lesson-coherence/lesson-coherence.yml

use eyre::{Context, Result};
use lesson_coherence::RuleTables;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project config file looked up in the current directory.
pub const PROJECT_CONFIG: &str = ".lesson-coherence.yml";

/// Global configuration for lesson-coherence.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Log level used when RUST_LOG is not set.
    pub log_level: Option<String>,

    /// Engine execution settings.
    pub engine: EngineConfig,

    /// Report rendering.
    pub output: OutputConfig,

    /// Weights, penalties, thresholds and lexicons.
    pub rules: RuleTables,
}

impl GlobalConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .lesson-coherence.yml in current directory
    /// 3. ~/.config/lesson-coherence/lesson-coherence.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project config
        let project_config = PathBuf::from(PROJECT_CONFIG);
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from {}", PROJECT_CONFIG);
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load {}: {}", PROJECT_CONFIG, e);
                }
            }
        }

        // Try user config
        if let Some(user_config) = Self::user_config_path() {
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// ~/.config/<project>/<project>.yml
    pub fn user_config_path() -> Option<PathBuf> {
        let project_name = env!("CARGO_PKG_NAME");
        dirs::config_dir().map(|dir| dir.join(project_name).join(format!("{}.yml", project_name)))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.engine.aspect_timeout_ms == 0 {
            eyre::bail!("engine.aspect_timeout_ms must be > 0");
        }
        self.rules.validate().context("Invalid rules section")?;
        Ok(())
    }
}

/// Engine execution settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Evaluate the five aspects in parallel.
    pub concurrent: bool,

    /// Per-aspect time limit in concurrent mode.
    pub aspect_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrent: false,
            aspect_timeout_ms: 2000,
        }
    }
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Report rendering.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Print per-aspect details in text mode.
    pub show_details: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            show_details: true,
        }
    }
}
