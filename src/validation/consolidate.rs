//! Consolidation of per-aspect results into one verdict.

use crate::rules::Thresholds;
use crate::validation::group::GroupCapability;
use crate::validation::references::ReferenceCheck;
use crate::validation::traits::{Aspect, ValidationResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Version tag stamped on every report
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source of report timestamps
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Wall-clock time
pub fn system_clock() -> Clock {
    Arc::new(Utc::now)
}

/// Score band of a consolidated report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoherenceLevel {
    Insufficient,
    Acceptable,
    Good,
    Excellent,
}

impl CoherenceLevel {
    /// Band for a score; each lower bound is inclusive.
    pub fn classify(score: f64, thresholds: &Thresholds) -> Self {
        if score >= thresholds.excellent {
            CoherenceLevel::Excellent
        } else if score >= thresholds.good {
            CoherenceLevel::Good
        } else if score >= thresholds.valid {
            CoherenceLevel::Acceptable
        } else {
            CoherenceLevel::Insufficient
        }
    }
}

impl fmt::Display for CoherenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CoherenceLevel::Insufficient => "insufficient",
            CoherenceLevel::Acceptable => "acceptable",
            CoherenceLevel::Good => "good",
            CoherenceLevel::Excellent => "excellent",
        };
        write!(f, "{}", s)
    }
}

/// Per-aspect line of the report breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectSummary {
    pub aspect: Aspect,
    pub score: f64,
    pub valid: bool,
    pub recommendations: Vec<String>,
}

impl From<&ValidationResult> for AspectSummary {
    fn from(result: &ValidationResult) -> Self {
        Self {
            aspect: result.aspect,
            score: result.score,
            valid: result.valid,
            recommendations: result.recommendations.clone(),
        }
    }
}

/// The single aggregated verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    /// Arithmetic mean of the aspect scores, unrounded
    pub global_score: f64,
    pub level: CoherenceLevel,
    /// `global_score >= thresholds.valid`
    pub overall_valid: bool,
    pub validated_aspects: Vec<Aspect>,
    pub failed_aspects: Vec<Aspect>,
    /// One "aspect: details" line per aspect
    pub all_details: Vec<String>,
    pub recommendations: BTreeSet<String>,
    pub per_aspect: Vec<AspectSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupCapability>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ReferenceCheck>,
    pub timestamp: DateTime<Utc>,
    pub engine_version: String,
}

impl ConsolidatedReport {
    pub fn aspect(&self, aspect: Aspect) -> Option<&AspectSummary> {
        self.per_aspect.iter().find(|summary| summary.aspect == aspect)
    }

    pub fn with_group(mut self, group: GroupCapability) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_references(mut self, references: ReferenceCheck) -> Self {
        self.references = Some(references);
        self
    }
}

/// Folds aspect results into a [`ConsolidatedReport`]
pub struct Consolidator {
    thresholds: Thresholds,
    clock: Clock,
}

impl Consolidator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            clock: system_clock(),
        }
    }

    /// Use a custom clock (builder pattern)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn consolidate(&self, results: &[ValidationResult]) -> ConsolidatedReport {
        let global_score = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64
        };

        let (validated, failed): (Vec<&ValidationResult>, Vec<&ValidationResult>) =
            results.iter().partition(|r| r.valid);

        ConsolidatedReport {
            global_score,
            level: CoherenceLevel::classify(global_score, &self.thresholds),
            overall_valid: global_score >= self.thresholds.valid,
            validated_aspects: validated.iter().map(|r| r.aspect).collect(),
            failed_aspects: failed.iter().map(|r| r.aspect).collect(),
            all_details: results.iter().map(|r| format!("{}: {}", r.aspect, r.details)).collect(),
            recommendations: results
                .iter()
                .flat_map(|r| r.recommendations.iter().cloned())
                .collect(),
            per_aspect: results.iter().map(AspectSummary::from).collect(),
            group: None,
            references: None,
            timestamp: (self.clock)(),
            engine_version: ENGINE_VERSION.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(aspect: Aspect, score: f64, recommendations: &[&str]) -> ValidationResult {
        ValidationResult {
            aspect,
            valid: score > 0.6,
            score,
            details: format!("scored {}", score),
            recommendations: recommendations.iter().map(|r| r.to_string()).collect(),
        }
    }

    fn fixed_clock() -> Clock {
        Arc::new(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
    }

    fn consolidator() -> Consolidator {
        Consolidator::new(Thresholds::default()).with_clock(fixed_clock())
    }

    #[test]
    fn test_classify_band_edges() {
        let t = Thresholds::default();
        assert_eq!(CoherenceLevel::classify(0.0, &t), CoherenceLevel::Insufficient);
        assert_eq!(CoherenceLevel::classify(0.599999, &t), CoherenceLevel::Insufficient);
        assert_eq!(CoherenceLevel::classify(0.60, &t), CoherenceLevel::Acceptable);
        assert_eq!(CoherenceLevel::classify(0.799999, &t), CoherenceLevel::Acceptable);
        assert_eq!(CoherenceLevel::classify(0.80, &t), CoherenceLevel::Good);
        assert_eq!(CoherenceLevel::classify(0.949999, &t), CoherenceLevel::Good);
        assert_eq!(CoherenceLevel::classify(0.95, &t), CoherenceLevel::Excellent);
        assert_eq!(CoherenceLevel::classify(1.0, &t), CoherenceLevel::Excellent);
    }

    #[test]
    fn test_global_score_is_mean() {
        let results = vec![
            result(Aspect::Structure, 1.0, &[]),
            result(Aspect::ProfileCoherence, 0.8, &["a"]),
            result(Aspect::AssignmentCapability, 0.9, &["b"]),
            result(Aspect::Inclusion, 0.3, &["c"]),
            result(Aspect::WorkloadBalance, 0.65, &[]),
        ];
        let report = consolidator().consolidate(&results);
        let expected = (1.0 + 0.8 + 0.9 + 0.3 + 0.65) / 5.0;
        assert_eq!(report.global_score, expected);
        assert_eq!(report.level, CoherenceLevel::Acceptable);
        assert!(report.overall_valid);
    }

    #[test]
    fn test_partition_follows_own_flags() {
        let results = vec![
            result(Aspect::Structure, 1.0, &[]),
            result(Aspect::Inclusion, 0.6, &[]),
            result(Aspect::WorkloadBalance, 0.2, &[]),
        ];
        let report = consolidator().consolidate(&results);
        assert_eq!(report.validated_aspects, vec![Aspect::Structure]);
        assert_eq!(report.failed_aspects, vec![Aspect::Inclusion, Aspect::WorkloadBalance]);
    }

    #[test]
    fn test_recommendations_deduplicated() {
        let results = vec![
            result(Aspect::ProfileCoherence, 0.0, &["Provide participant profiles"]),
            result(Aspect::WorkloadBalance, 0.0, &["Provide participant profiles"]),
        ];
        let report = consolidator().consolidate(&results);
        assert_eq!(report.recommendations.len(), 1);
        assert!(!report.overall_valid);
        assert_eq!(report.level, CoherenceLevel::Insufficient);
    }

    #[test]
    fn test_details_prefixed_with_aspect() {
        let report = consolidator().consolidate(&[result(Aspect::Structure, 1.0, &[])]);
        assert_eq!(report.all_details, vec!["structure: scored 1"]);
        assert_eq!(report.per_aspect.len(), 1);
        assert!(report.aspect(Aspect::Structure).is_some());
        assert!(report.aspect(Aspect::Inclusion).is_none());
    }

    #[test]
    fn test_empty_results_guarded() {
        let report = consolidator().consolidate(&[]);
        assert_eq!(report.global_score, 0.0);
        assert!(!report.overall_valid);
    }

    #[test]
    fn test_stamp_uses_clock_and_version() {
        let report = consolidator().consolidate(&[result(Aspect::Structure, 1.0, &[])]);
        assert_eq!(report.timestamp, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(report.engine_version, env!("CARGO_PKG_VERSION"));
        assert!(report.group.is_none());
        assert!(report.references.is_none());
    }
}
