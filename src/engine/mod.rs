//! Validation engine
//!
//! Owns the read-only rule tables and compiled lexicons, runs the aspect
//! suite and consolidates the results. Every call is independent: the engine
//! keeps no state between validations, so the same inputs always give the
//! same report (given a fixed clock).

mod concurrent;

pub use concurrent::ValidationRequest;

use crate::domain::{Activity, AssignmentSet, ProfileSet};
use crate::error::Result;
use crate::rules::{Lexicons, RuleTables};
use crate::validation::{
    AspectSuite, Clock, ConsolidatedReport, Consolidator, GroupCapability, QuickEvaluator, QuickReport,
    ReferenceCheck, ValidationInput, ValidationResult, system_clock,
};
use log::{debug, info};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Per-aspect time limit used by the concurrent runner
pub const DEFAULT_ASPECT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Entry point for full and quick validation
#[derive(Clone)]
pub struct ValidationEngine {
    rules: Arc<RuleTables>,
    lexicons: Lexicons,
    /// Replaces the standard suite when set
    suite: Option<AspectSuite>,
    clock: Clock,
    aspect_timeout: Duration,
}

impl ValidationEngine {
    /// Create an engine, rejecting inconsistent rule tables.
    pub fn new(rules: RuleTables) -> Result<Self> {
        rules.validate()?;
        let lexicons = Lexicons::from_tables(&rules);
        Ok(Self {
            rules: Arc::new(rules),
            lexicons,
            suite: None,
            clock: system_clock(),
            aspect_timeout: DEFAULT_ASPECT_TIMEOUT,
        })
    }

    /// Substitute the rule providers (builder pattern)
    pub fn with_lexicons(mut self, lexicons: Lexicons) -> Self {
        self.lexicons = lexicons;
        self
    }

    /// Stamp reports with a custom clock (builder pattern)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Run a custom evaluator suite instead of the standard five
    pub fn with_suite(mut self, suite: AspectSuite) -> Self {
        self.suite = Some(suite);
        self
    }

    pub fn with_aspect_timeout(mut self, timeout: Duration) -> Self {
        self.aspect_timeout = timeout;
        self
    }

    pub fn rules(&self) -> &RuleTables {
        &self.rules
    }

    pub fn lexicons(&self) -> &Lexicons {
        &self.lexicons
    }

    pub fn aspect_timeout(&self) -> Duration {
        self.aspect_timeout
    }

    /// The suite a validation runs
    pub fn suite(&self) -> AspectSuite {
        match &self.suite {
            Some(suite) => suite.clone(),
            None => AspectSuite::standard(self.rules.clone(), self.lexicons.clone()),
        }
    }

    /// Run every aspect evaluator sequentially.
    pub fn evaluate_aspects(&self, input: &ValidationInput<'_>) -> Vec<ValidationResult> {
        self.suite().run(input)
    }

    /// Full validation: five aspects, consolidated into one verdict.
    pub fn evaluate_full(
        &self,
        activity: &Activity,
        profiles: &ProfileSet,
        assignments: &AssignmentSet,
    ) -> ConsolidatedReport {
        info!(
            "Starting full validation of '{}' ({} participant(s), {} assignment(s))",
            activity.title.as_deref().unwrap_or("untitled"),
            profiles.len(),
            assignments.len()
        );

        let input = ValidationInput::new(activity, profiles, assignments);
        let results = self.evaluate_aspects(&input);
        self.consolidate(&input, &results)
    }

    /// Fast-path gate over the activity and profiles only.
    pub fn evaluate_quick(&self, activity: &Activity, profiles: &ProfileSet) -> QuickReport {
        info!(
            "Starting quick validation of '{}'",
            activity.title.as_deref().unwrap_or("untitled")
        );
        QuickEvaluator::new(self.rules.clone(), self.lexicons.clone()).evaluate(activity, profiles)
    }

    /// Fold aspect results into a report with the group and reference summaries attached.
    fn consolidate(&self, input: &ValidationInput<'_>, results: &[ValidationResult]) -> ConsolidatedReport {
        let group = GroupCapability::analyze(
            input.profiles,
            self.rules.coherence.principal_strengths,
            self.lexicons.neurotypes.as_ref(),
        );
        let references = ReferenceCheck::inspect(input.activity, input.profiles, input.assignments);
        if !references.is_clean() {
            debug!(
                "Unresolved references: {} assignment(s), {} task(s)",
                references.unprofiled_assignments.len(),
                references.unassigned_tasks.len()
            );
        }

        let report = Consolidator::new(self.rules.thresholds.clone())
            .with_clock(self.clock.clone())
            .consolidate(results)
            .with_group(group)
            .with_references(references);

        info!(
            "Validation finished: global score {:.3} ({}), valid: {}",
            report.global_score, report.level, report.overall_valid
        );
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        let rules = RuleTables::default();
        let lexicons = Lexicons::from_tables(&rules);
        Self {
            rules: Arc::new(rules),
            lexicons,
            suite: None,
            clock: system_clock(),
            aspect_timeout: DEFAULT_ASPECT_TIMEOUT,
        }
    }
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("lexicons", &self.lexicons)
            .field("custom_suite", &self.suite.is_some())
            .field("aspect_timeout", &self.aspect_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Assignment, Participant, Stage, Task};
    use crate::error::CoherenceError;
    use crate::rules::{KeywordCategory, KeywordClassifier, MatchMode};
    use crate::validation::{Aspect, CoherenceLevel};
    use chrono::{TimeZone, Utc};

    fn fixed_clock() -> Clock {
        Arc::new(|| Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap())
    }

    fn activity() -> Activity {
        Activity {
            title: Some("Solar system mural".to_string()),
            objective: Some("design a mural of the planets".to_string()),
            level: Some("5th grade".to_string()),
            duration: Some("1 hour".to_string()),
            observations: Some("visual guide".to_string()),
            stages: vec![
                Stage::new("plan", vec![Task::new("sketch", Default::default())]),
                Stage::new("paint", vec![Task::new("paint", Default::default())]),
            ],
            resources: None,
        }
    }

    fn profiles() -> ProfileSet {
        ProfileSet::new()
            .with("a", Participant::new("Ana").with_strengths(["creativity"]))
            .with("b", Participant::new("Luis").with_strengths(["creativity"]))
    }

    fn assignments() -> AssignmentSet {
        AssignmentSet::new()
            .with("a", Assignment::new("designer").with_tasks(["sketch"]))
            .with("b", Assignment::new("painter").with_tasks(["paint"]))
    }

    #[test]
    fn test_new_rejects_invalid_rules() {
        let mut rules = RuleTables::default();
        rules.thresholds.valid = 2.0;
        let err = ValidationEngine::new(rules).unwrap_err();
        assert!(matches!(err, CoherenceError::Rules(_)));
    }

    #[test]
    fn test_evaluate_full_has_five_aspects_in_order() {
        let engine = ValidationEngine::new(RuleTables::default()).unwrap().with_clock(fixed_clock());
        let report = engine.evaluate_full(&activity(), &profiles(), &assignments());
        let aspects: Vec<Aspect> = report.per_aspect.iter().map(|s| s.aspect).collect();
        assert_eq!(aspects, Aspect::ALL.to_vec());
        assert!(report.group.is_some());
        assert!(report.references.as_ref().is_some_and(|r| r.is_clean()));
    }

    #[test]
    fn test_evaluate_full_is_idempotent() {
        let engine = ValidationEngine::default().with_clock(fixed_clock());
        let first = engine.evaluate_full(&activity(), &profiles(), &assignments());
        let second = engine.evaluate_full(&activity(), &profiles(), &assignments());
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_inputs_score_low_without_error() {
        let engine = ValidationEngine::default();
        let report = engine.evaluate_full(&Activity::default(), &ProfileSet::new(), &AssignmentSet::new());
        assert!(!report.overall_valid);
        assert_eq!(report.level, CoherenceLevel::Insufficient);
        assert!((0.0..=1.0).contains(&report.global_score));
    }

    #[test]
    fn test_custom_lexicons_change_required_strengths() {
        let engine = ValidationEngine::default().with_lexicons(Lexicons {
            strengths: Arc::new(KeywordClassifier::new(
                "astronomy",
                MatchMode::Substring,
                &[KeywordCategory::new("astronomy", &["planet"])],
            )),
            ..Lexicons::from_tables(&RuleTables::default())
        });
        let report = engine.evaluate_full(&activity(), &profiles(), &assignments());
        let coherence = report.aspect(Aspect::ProfileCoherence).unwrap();
        assert!(coherence.recommendations.iter().any(|r| r.contains("Few group strengths")));
    }

    #[test]
    fn test_custom_suite_replaces_standard() {
        let rules = Arc::new(RuleTables::default());
        let engine = ValidationEngine::default()
            .with_suite(AspectSuite::new().with_evaluator(crate::validation::StructureEvaluator::new(rules)));
        let report = engine.evaluate_full(&activity(), &profiles(), &assignments());
        assert_eq!(report.per_aspect.len(), 1);
    }

    #[test]
    fn test_evaluate_quick() {
        let report = ValidationEngine::default().evaluate_quick(&activity(), &profiles());
        assert!(report.valid);
        assert!(report.validated_aspects.contains(&"profiles_2_participants".to_string()));
    }
}
