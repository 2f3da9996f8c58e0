use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use lesson_coherence::{Activity, AssignmentSet, ProfileSet, ValidationEngine, ValidationRequest};
use log::{LevelFilter, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use cli::output::{batch_line, render_full, render_quick};
use config::{Config, OutputFormat};

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lesson-coherence")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("lesson-coherence.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let mut builder = env_logger::Builder::from_default_env();
    // RUST_LOG wins over the config file
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log_filter(log_level));
    }
    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    if let Some(level) = log_level
        && level.parse::<LevelFilter>().is_err()
    {
        warn!("Ignoring unknown log_level '{}'", level);
    }
    Ok(())
}

/// Level from the config's `log_level`, Info when absent or unknown.
fn log_filter(log_level: Option<&str>) -> LevelFilter {
    log_level
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Info)
}

fn build_engine(config: &Config) -> Result<ValidationEngine> {
    let engine = ValidationEngine::new(config.rules.clone())
        .context("Invalid rule tables")?
        .with_aspect_timeout(Duration::from_millis(config.engine.aspect_timeout_ms));
    Ok(engine)
}

fn load_assignments(path: Option<&PathBuf>) -> Result<AssignmentSet> {
    match path {
        Some(path) => AssignmentSet::load(path).context(format!("Failed to load assignments from {}", path.display())),
        None => Ok(AssignmentSet::new()),
    }
}

fn load_inputs(activity: &Path, profiles: &Path) -> Result<(Activity, ProfileSet)> {
    let activity = Activity::load(activity).context(format!("Failed to load activity from {}", activity.display()))?;
    let profiles =
        ProfileSet::load(profiles).context(format!("Failed to load profiles from {}", profiles.display()))?;
    Ok((activity, profiles))
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let engine = build_engine(config)?;

    match &cli.command {
        Commands::Full {
            activity,
            profiles,
            assignments,
            format,
            concurrent,
        } => handle_full_command(
            &engine,
            config,
            activity,
            profiles,
            assignments.as_ref(),
            format.unwrap_or(config.output.format),
            *concurrent || config.engine.concurrent,
        ),
        Commands::Quick {
            activity,
            profiles,
            format,
        } => handle_quick_command(&engine, activity, profiles, format.unwrap_or(config.output.format)),
        Commands::Batch {
            pattern,
            profiles,
            assignments,
            quick,
        } => handle_batch_command(&engine, pattern, profiles, assignments.as_ref(), *quick),
        Commands::Rules => handle_rules_command(&engine),
    }
}

fn handle_full_command(
    engine: &ValidationEngine,
    config: &Config,
    activity: &Path,
    profiles: &Path,
    assignments: Option<&PathBuf>,
    format: OutputFormat,
    concurrent: bool,
) -> Result<()> {
    let (activity, profiles) = load_inputs(activity, profiles)?;
    let assignments = load_assignments(assignments)?;

    let report = if concurrent {
        info!("Running aspects concurrently");
        let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
        let request = Arc::new(ValidationRequest::new(activity, profiles, assignments));
        runtime.block_on(engine.evaluate_full_concurrent(request))
    } else {
        engine.evaluate_full(&activity, &profiles, &assignments)
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => println!("{}", render_full(&report, config.output.show_details)),
    }
    Ok(())
}

fn handle_quick_command(engine: &ValidationEngine, activity: &Path, profiles: &Path, format: OutputFormat) -> Result<()> {
    let (activity, profiles) = load_inputs(activity, profiles)?;
    let report = engine.evaluate_quick(&activity, &profiles);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => println!("{}", render_quick(&report)),
    }
    Ok(())
}

fn handle_batch_command(
    engine: &ValidationEngine,
    pattern: &str,
    profiles: &Path,
    assignments: Option<&PathBuf>,
    quick: bool,
) -> Result<()> {
    let profiles =
        ProfileSet::load(profiles).context(format!("Failed to load profiles from {}", profiles.display()))?;
    let assignments = load_assignments(assignments)?;

    let paths = glob::glob(pattern).context(format!("Invalid glob pattern '{}'", pattern))?;
    let mut count = 0;

    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                continue;
            }
        };
        let name = path.display().to_string();
        count += 1;

        let activity = match Activity::load(&path) {
            Ok(activity) => activity,
            Err(e) => {
                warn!("Failed to load {}: {}", name, e);
                println!("{:<40} {} {}", name, "error:".red(), e);
                continue;
            }
        };

        if quick {
            let report = engine.evaluate_quick(&activity, &profiles);
            println!("{}", batch_line(&name, report.score, report.valid, "quick"));
        } else {
            let report = engine.evaluate_full(&activity, &profiles, &assignments);
            println!(
                "{}",
                batch_line(&name, report.global_score, report.overall_valid, &report.level.to_string())
            );
        }
    }

    if count == 0 {
        println!("{} no files match '{}'", "warning:".yellow(), pattern);
    }
    info!("Batch finished: {} file(s)", count);
    Ok(())
}

fn handle_rules_command(engine: &ValidationEngine) -> Result<()> {
    let yaml = serde_yaml::to_string(engine.rules()).context("Failed to serialize rule tables")?;
    print!("{}", yaml);
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration, then log at its level
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;
    config.validate().context("Invalid configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).context("Application failed")?;

    Ok(())
}
