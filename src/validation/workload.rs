//! Workload balance evaluator.

use crate::domain::{Activity, ProfileSet};
use crate::rules::{RuleTables, contains_any};
use crate::validation::traits::{Aspect, AspectEvaluator, ScoreCard, ValidationInput, ValidationResult};
use std::sync::Arc;

/// Scores tasks per participant and whether the duration is usable
pub struct WorkloadEvaluator {
    rules: Arc<RuleTables>,
}

impl WorkloadEvaluator {
    pub fn new(rules: Arc<RuleTables>) -> Self {
        Self { rules }
    }

    pub fn check(&self, activity: &Activity, profiles: &ProfileSet) -> ValidationResult {
        if profiles.is_empty() {
            return ValidationResult::zero(
                Aspect::WorkloadBalance,
                "no participants to distribute work across",
                vec!["Provide participant profiles".to_string()],
            );
        }

        let rules = &self.rules.workload;
        let mut card = ScoreCard::new(Aspect::WorkloadBalance);

        let total_tasks = activity.task_count();
        if total_tasks == 0 {
            card.pass("no tasks defined");
        } else {
            let ratio = total_tasks as f64 / profiles.len() as f64;
            if ratio > rules.max_tasks_per_participant {
                card.deduct(
                    rules.overload_penalty,
                    format!("{:.2} tasks per participant", ratio),
                    "Too many tasks per participant; simplify the activity",
                );
            } else if ratio < rules.min_tasks_per_participant {
                card.deduct(
                    rules.underuse_penalty,
                    format!("{:.2} tasks per participant", ratio),
                    "Participants are under-utilized; add tasks or roles",
                );
            } else {
                card.pass(format!("balanced task distribution: {:.2} per participant", ratio));
            }
        }

        let duration = activity.duration.as_deref().unwrap_or_default();
        if contains_any(duration, &rules.duration_units) {
            card.pass(format!("duration specified: {}", duration));
        } else {
            card.deduct(
                rules.vague_duration_penalty,
                "duration unclear",
                "Specify the duration more clearly (sessions, hours or minutes)",
            );
        }

        card.finish(self.rules.thresholds.valid)
    }
}

impl AspectEvaluator for WorkloadEvaluator {
    fn aspect(&self) -> Aspect {
        Aspect::WorkloadBalance
    }

    fn evaluate(&self, input: &ValidationInput<'_>) -> ValidationResult {
        self.check(input.activity, input.profiles)
    }

    fn description(&self) -> &str {
        "tasks per participant and duration"
    }
}
