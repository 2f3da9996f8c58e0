//! Inclusion evaluator: detected support needs against the activity's adaptations.

use crate::domain::{Activity, ProfileSet};
use crate::rules::{Lexicons, Neurotype, RuleTables, detect_neurotypes};
use crate::validation::traits::{Aspect, AspectEvaluator, ScoreCard, ValidationInput, ValidationResult};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Scores whether the observations describe adaptations for every detected neurotype
pub struct InclusionEvaluator {
    rules: Arc<RuleTables>,
    lexicons: Lexicons,
}

impl InclusionEvaluator {
    pub fn new(rules: Arc<RuleTables>, lexicons: Lexicons) -> Self {
        Self { rules, lexicons }
    }

    /// Neurotypes revealed by the adaptations of participants with needs.
    pub fn detect(&self, profiles: &ProfileSet) -> BTreeSet<Neurotype> {
        detect_neurotypes(
            self.lexicons.neurotypes.as_ref(),
            profiles
                .values()
                .filter(|p| p.has_needs())
                .flat_map(|p| p.adaptations.iter()),
        )
    }

    pub fn check(&self, activity: &Activity, profiles: &ProfileSet) -> ValidationResult {
        let mut card = ScoreCard::new(Aspect::Inclusion);

        let with_needs = profiles.values().filter(|p| p.has_needs()).count();
        if with_needs == 0 {
            card.pass("no special needs detected");
            return card.finish(self.rules.thresholds.valid);
        }

        let observations = activity.observations_text();
        let detected = self.detect(profiles);
        if detected.is_empty() {
            card.pass(format!("{} participant(s) with needs, no known neurotype markers", with_needs));
        }

        for neurotype in detected {
            let Some(rule) = self.rules.inclusion.rule_for(neurotype) else {
                continue;
            };
            if rule.is_covered_by(observations) {
                card.pass(format!("{} adaptations present", neurotype));
            } else {
                card.deduct(
                    rule.penalty,
                    format!("{} adaptations missing", neurotype),
                    rule.recommendation.clone(),
                );
            }
        }

        card.finish(self.rules.thresholds.valid)
    }
}

impl AspectEvaluator for InclusionEvaluator {
    fn aspect(&self) -> Aspect {
        Aspect::Inclusion
    }

    fn evaluate(&self, input: &ValidationInput<'_>) -> ValidationResult {
        self.check(input.activity, input.profiles)
    }

    fn description(&self) -> &str {
        "adaptation coverage for detected neurotypes"
    }
}
