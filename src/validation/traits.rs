//! Core validation interfaces and the per-aspect result type.

use crate::domain::{Activity, AssignmentSet, ProfileSet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores are rounded to this many decimal places so that boundary cases
/// (e.g. exactly 0.60) compare the same way regardless of deduction order.
const SCORE_DECIMALS: i32 = 6;

/// One of the five independent dimensions evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    Structure,
    ProfileCoherence,
    AssignmentCapability,
    Inclusion,
    WorkloadBalance,
}

impl Aspect {
    /// All aspects in evaluation order
    pub const ALL: [Aspect; 5] = [
        Aspect::Structure,
        Aspect::ProfileCoherence,
        Aspect::AssignmentCapability,
        Aspect::Inclusion,
        Aspect::WorkloadBalance,
    ];

    /// Stable identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Aspect::Structure => "structure",
            Aspect::ProfileCoherence => "profile_coherence",
            Aspect::AssignmentCapability => "assignment_capability",
            Aspect::Inclusion => "inclusion",
            Aspect::WorkloadBalance => "workload_balance",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of evaluating one aspect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub aspect: Aspect,
    /// `score > thresholds.valid`
    pub valid: bool,
    /// In [0, 1]
    pub score: f64,
    /// Trace of sub-checks, joined with "; "
    pub details: String,
    pub recommendations: Vec<String>,
}

impl ValidationResult {
    /// Create a zero-score result for degenerate input
    pub fn zero(aspect: Aspect, detail: impl Into<String>, recommendations: Vec<String>) -> Self {
        Self {
            aspect,
            valid: false,
            score: 0.0,
            details: detail.into(),
            recommendations,
        }
    }

    /// Create the result for an evaluation that was cut short
    pub fn aborted(aspect: Aspect, reason: impl Into<String>) -> Self {
        Self::zero(aspect, format!("evaluation aborted: {}", reason.into()), Vec::new())
    }

    pub fn has_recommendations(&self) -> bool {
        !self.recommendations.is_empty()
    }
}

/// The records one validation call works on
#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    pub activity: &'a Activity,
    pub profiles: &'a ProfileSet,
    pub assignments: &'a AssignmentSet,
}

impl<'a> ValidationInput<'a> {
    pub fn new(activity: &'a Activity, profiles: &'a ProfileSet, assignments: &'a AssignmentSet) -> Self {
        Self {
            activity,
            profiles,
            assignments,
        }
    }
}

/// Trait for evaluators that score one aspect of an activity
///
/// Implementations are pure functions of their input and the shared
/// read-only rule tables, so they may run on any thread.
pub trait AspectEvaluator: Send + Sync {
    /// The aspect this evaluator scores
    fn aspect(&self) -> Aspect;

    /// Evaluate the input. Never fails: degenerate data yields a low score.
    fn evaluate(&self, input: &ValidationInput<'_>) -> ValidationResult;

    /// Get a description of what this evaluator checks
    fn description(&self) -> &str {
        "aspect evaluator"
    }
}

/// Accumulates deductions, details and recommendations for one aspect
#[derive(Debug, Clone)]
pub struct ScoreCard {
    aspect: Aspect,
    score: f64,
    details: Vec<String>,
    recommendations: Vec<String>,
}

impl ScoreCard {
    /// Start from a perfect score
    pub fn new(aspect: Aspect) -> Self {
        Self {
            aspect,
            score: 1.0,
            details: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    /// Record a passed sub-check
    pub fn pass(&mut self, detail: impl Into<String>) {
        self.details.push(detail.into());
    }

    /// Subtract a penalty, recording what failed and what to do about it
    pub fn deduct(&mut self, amount: f64, detail: impl Into<String>, recommendation: impl Into<String>) {
        self.score -= amount;
        self.details.push(detail.into());
        self.recommendations.push(recommendation.into());
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Clamp, round and judge against the validity threshold
    pub fn finish(self, valid_threshold: f64) -> ValidationResult {
        let score = round_score(self.score.clamp(0.0, 1.0));
        ValidationResult {
            aspect: self.aspect,
            valid: score > valid_threshold,
            score,
            details: self.details.join("; "),
            recommendations: self.recommendations,
        }
    }
}

/// Round a score to a fixed number of decimals.
pub fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_DECIMALS);
    (score * factor).round() / factor
}
