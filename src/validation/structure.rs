//! Structure evaluator: required activity fields and stage count.

use crate::domain::{Activity, ActivityField};
use crate::rules::RuleTables;
use crate::validation::traits::{Aspect, AspectEvaluator, ScoreCard, ValidationInput, ValidationResult};
use std::sync::Arc;

/// Checks that an activity carries every required field and a sensible
/// number of stages
pub struct StructureEvaluator {
    rules: Arc<RuleTables>,
}

impl StructureEvaluator {
    pub fn new(rules: Arc<RuleTables>) -> Self {
        Self { rules }
    }

    /// Score the structure of an activity.
    pub fn check(&self, activity: &Activity) -> ValidationResult {
        let rules = &self.rules.structure;
        let mut card = ScoreCard::new(Aspect::Structure);

        for required in &rules.required_fields {
            if activity.has_field(required.field) {
                card.pass(format!("{} present", required.field));
            } else {
                card.deduct(
                    required.weight,
                    format!("missing {}", required.field),
                    format!("Add {} to the activity", required.field),
                );
            }
        }

        // Stage count is only judged when there are stages at all; an empty
        // list is already charged as a missing field above.
        if activity.has_field(ActivityField::Stages) {
            let count = activity.stages.len();
            if count < rules.min_stages {
                card.deduct(
                    rules.few_stages_penalty,
                    format!("only {} stage(s)", count),
                    "Add more stages for a clearer structure",
                );
            } else if count > rules.max_stages {
                card.deduct(
                    rules.many_stages_penalty,
                    format!("{} stages", count),
                    "Consider simplifying the number of stages",
                );
            } else {
                card.pass(format!("appropriate number of stages: {}", count));
            }
        }

        card.finish(self.rules.thresholds.valid)
    }
}

impl AspectEvaluator for StructureEvaluator {
    fn aspect(&self) -> Aspect {
        Aspect::Structure
    }

    fn evaluate(&self, input: &ValidationInput<'_>) -> ValidationResult {
        self.check(input.activity)
    }

    fn description(&self) -> &str {
        "required fields and stage count"
    }
}
