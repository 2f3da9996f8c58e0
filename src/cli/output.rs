//! Report rendering for the terminal.

use colored::*;
use lesson_coherence::{CoherenceLevel, ConsolidatedReport, QuickReport};
use std::fmt::Write;

fn level_label(level: CoherenceLevel) -> ColoredString {
    let text = level.to_string().to_uppercase();
    match level {
        CoherenceLevel::Excellent => text.green().bold(),
        CoherenceLevel::Good => text.green(),
        CoherenceLevel::Acceptable => text.yellow(),
        CoherenceLevel::Insufficient => text.red().bold(),
    }
}

fn verdict(valid: bool) -> ColoredString {
    if valid { "VALID".green() } else { "INVALID".red() }
}

/// Render a consolidated report as text.
pub fn render_full(report: &ConsolidatedReport, show_details: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {:.2} {} ({})",
        "Global score:".bold(),
        report.global_score,
        level_label(report.level),
        verdict(report.overall_valid)
    );

    for summary in &report.per_aspect {
        let marker = if summary.valid { "✓".green() } else { "✗".red() };
        let _ = writeln!(out, "  {} {:<22} {:.2}", marker, summary.aspect.as_str(), summary.score);
    }

    if show_details {
        let _ = writeln!(out, "{}", "Details:".bold());
        for line in &report.all_details {
            let _ = writeln!(out, "  {}", line);
        }
        if let Some(group) = &report.group {
            let _ = writeln!(
                out,
                "  group: {} participant(s), capability {:.0}%, collaboration {}",
                group.participant_count,
                group.average_capability * 100.0,
                group.collaboration
            );
        }
        if let Some(references) = &report.references
            && !references.is_clean()
        {
            for id in &references.unprofiled_assignments {
                let _ = writeln!(out, "  {} assignment '{}' has no profile", "warning:".yellow(), id);
            }
            for task in &references.unassigned_tasks {
                let _ = writeln!(out, "  {} task '{}' is not assigned", "warning:".yellow(), task);
            }
        }
    }

    if !report.recommendations.is_empty() {
        let _ = writeln!(out, "{}", "Recommendations:".bold());
        for recommendation in &report.recommendations {
            let _ = writeln!(out, "  - {}", recommendation);
        }
    }

    let _ = write!(
        out,
        "{}",
        format!("engine {} at {}", report.engine_version, report.timestamp.to_rfc3339()).dimmed()
    );
    out
}

/// Render a quick report as text.
pub fn render_quick(report: &QuickReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {:.2} ({})", "Quick score:".bold(), report.score, verdict(report.valid));
    if !report.validated_aspects.is_empty() {
        let _ = writeln!(out, "  passed: {}", report.validated_aspects.join(", "));
    }
    if !report.detected_neurotypes.is_empty() {
        let neurotypes: Vec<&str> = report.detected_neurotypes.iter().map(|n| n.as_str()).collect();
        let _ = writeln!(out, "  neurotypes: {}", neurotypes.join(", "));
    }
    for alert in &report.alerts {
        let _ = writeln!(out, "  {} {}", "alert:".yellow(), alert);
    }
    out.trim_end().to_string()
}

/// One summary line for batch mode.
pub fn batch_line(name: &str, score: f64, valid: bool, label: &str) -> String {
    format!("{:<40} {:.2} {:<12} {}", name, score, label, verdict(valid))
}
