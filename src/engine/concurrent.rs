//! Concurrent evaluation of the aspect suite
//!
//! Each aspect runs on the blocking pool under its own timeout. A slow or
//! panicking evaluator is reported as an aborted aspect with score 0.0; the
//! remaining aspects and the consolidation are unaffected.

use super::ValidationEngine;
use crate::domain::{Activity, AssignmentSet, ProfileSet};
use crate::validation::{ConsolidatedReport, ValidationInput, ValidationResult};
use futures::future::join_all;
use log::info;
use std::sync::Arc;

/// Owned inputs for one validation, shareable across worker threads
#[derive(Debug, Clone, Default)]
pub struct ValidationRequest {
    pub activity: Activity,
    pub profiles: ProfileSet,
    pub assignments: AssignmentSet,
}

impl ValidationRequest {
    pub fn new(activity: Activity, profiles: ProfileSet, assignments: AssignmentSet) -> Self {
        Self {
            activity,
            profiles,
            assignments,
        }
    }

    pub fn input(&self) -> ValidationInput<'_> {
        ValidationInput::new(&self.activity, &self.profiles, &self.assignments)
    }
}

impl ValidationEngine {
    /// Full validation with the aspects evaluated in parallel.
    ///
    /// Produces the same report as [`ValidationEngine::evaluate_full`] unless
    /// an aspect times out or panics.
    pub async fn evaluate_full_concurrent(&self, request: Arc<ValidationRequest>) -> ConsolidatedReport {
        info!(
            "Starting concurrent validation of '{}'",
            request.activity.title.as_deref().unwrap_or("untitled")
        );

        let timeout = self.aspect_timeout();
        let timeout_ms = timeout.as_millis() as u64;

        let suite = self.suite();
        let pending = suite.evaluators().iter().cloned().map(|evaluator| {
            let request = request.clone();
            async move {
                let aspect = evaluator.aspect();
                let handle = tokio::task::spawn_blocking(move || evaluator.evaluate(&request.input()));

                match tokio::time::timeout(timeout, handle).await {
                    Ok(Ok(result)) => {
                        tracing::debug!(aspect = %aspect, score = result.score, "Aspect evaluated");
                        result
                    }
                    Ok(Err(e)) => {
                        tracing::error!(aspect = %aspect, error = ?e, "Aspect evaluation panicked");
                        ValidationResult::aborted(aspect, "evaluator panicked")
                    }
                    Err(_) => {
                        tracing::warn!(aspect = %aspect, timeout_ms = timeout_ms, "Aspect evaluation timed out");
                        ValidationResult::aborted(aspect, format!("timed out after {}ms", timeout_ms))
                    }
                }
            }
        });

        let results = join_all(pending).await;
        self.consolidate(&request.input(), &results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Assignment, Participant, Stage, Task};
    use crate::validation::{Aspect, AspectEvaluator, AspectSuite, Clock};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    struct PanickingEvaluator;

    impl AspectEvaluator for PanickingEvaluator {
        fn aspect(&self) -> Aspect {
            Aspect::Inclusion
        }

        fn evaluate(&self, _input: &ValidationInput<'_>) -> ValidationResult {
            panic!("lexicon exploded");
        }
    }

    struct SlowEvaluator;

    impl AspectEvaluator for SlowEvaluator {
        fn aspect(&self) -> Aspect {
            Aspect::WorkloadBalance
        }

        fn evaluate(&self, _input: &ValidationInput<'_>) -> ValidationResult {
            std::thread::sleep(Duration::from_millis(300));
            ValidationResult::zero(Aspect::WorkloadBalance, "too late", Vec::new())
        }
    }

    struct PerfectEvaluator;

    impl AspectEvaluator for PerfectEvaluator {
        fn aspect(&self) -> Aspect {
            Aspect::Structure
        }

        fn evaluate(&self, _input: &ValidationInput<'_>) -> ValidationResult {
            ValidationResult {
                aspect: Aspect::Structure,
                valid: true,
                score: 1.0,
                details: "ok".to_string(),
                recommendations: Vec::new(),
            }
        }
    }

    fn fixed_clock() -> Clock {
        Arc::new(|| Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap())
    }

    fn request() -> Arc<ValidationRequest> {
        Arc::new(ValidationRequest::new(
            Activity {
                title: Some("Fractions Fair".to_string()),
                objective: Some("learn equivalent fractions".to_string()),
                duration: Some("2 sessions".to_string()),
                stages: vec![
                    Stage::new("intro", vec![Task::new("warm up", Default::default())]),
                    Stage::new("fair", vec![Task::new("stations", Default::default())]),
                ],
                ..Default::default()
            },
            ProfileSet::new().with("a", Participant::new("Ana").with_strengths(["mathematics"])),
            AssignmentSet::new().with("a", Assignment::new("calculator").with_tasks(["warm up"])),
        ))
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let engine = ValidationEngine::default().with_clock(fixed_clock());
        let request = request();
        let concurrent = engine.evaluate_full_concurrent(request.clone()).await;
        let sequential = engine.evaluate_full(&request.activity, &request.profiles, &request.assignments);
        assert_eq!(concurrent, sequential);
    }

    #[tokio::test]
    async fn test_panicking_aspect_is_aborted() {
        let engine = ValidationEngine::default().with_suite(
            AspectSuite::new()
                .with_evaluator(PerfectEvaluator)
                .with_evaluator(PanickingEvaluator),
        );
        let report = engine.evaluate_full_concurrent(request()).await;
        assert_eq!(report.per_aspect.len(), 2);
        assert_eq!(report.global_score, 0.5);
        assert_eq!(report.failed_aspects, vec![Aspect::Inclusion]);
        assert!(report.all_details.contains(&"inclusion: evaluation aborted: evaluator panicked".to_string()));
    }

    #[tokio::test]
    async fn test_slow_aspect_times_out() {
        let engine = ValidationEngine::default()
            .with_aspect_timeout(Duration::from_millis(20))
            .with_suite(
                AspectSuite::new()
                    .with_evaluator(PerfectEvaluator)
                    .with_evaluator(SlowEvaluator),
            );
        let report = engine.evaluate_full_concurrent(request()).await;
        assert_eq!(report.validated_aspects, vec![Aspect::Structure]);
        assert!(
            report
                .all_details
                .contains(&"workload_balance: evaluation aborted: timed out after 20ms".to_string())
        );
    }
}
