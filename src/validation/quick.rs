//! Fast-path gate run before a full validation.
//!
//! One pass over the activity and profiles, independent of the five
//! aspect evaluators. It produces alerts, never recommendations.

use crate::domain::{Activity, ActivityField, ProfileSet};
use crate::rules::{Lexicons, Neurotype, RuleTables, detect_neurotypes};
use crate::validation::traits::round_score;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Outcome of the fast-path gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickReport {
    pub score: f64,
    pub valid: bool,
    pub alerts: Vec<String>,
    /// Tags for checks that passed, e.g. `structure_3_stages`
    pub validated_aspects: Vec<String>,
    pub detected_neurotypes: BTreeSet<Neurotype>,
}

impl QuickReport {
    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }
}

/// Cheap presence checks plus a diversity bonus
pub struct QuickEvaluator {
    rules: Arc<RuleTables>,
    lexicons: Lexicons,
}

impl QuickEvaluator {
    pub fn new(rules: Arc<RuleTables>, lexicons: Lexicons) -> Self {
        Self { rules, lexicons }
    }

    pub fn evaluate(&self, activity: &Activity, profiles: &ProfileSet) -> QuickReport {
        let rules = &self.rules.quick;
        let mut score = 1.0;
        let mut alerts = Vec::new();
        let mut validated_aspects = Vec::new();

        if activity.has_field(ActivityField::Title) {
            validated_aspects.push("title_present".to_string());
        } else {
            score -= rules.missing_title_penalty;
            alerts.push("Activity has no title".to_string());
        }

        if activity.has_field(ActivityField::Objective) {
            validated_aspects.push("objective_present".to_string());
        } else {
            score -= rules.missing_objective_penalty;
            alerts.push("Activity has no clear objective".to_string());
        }

        if activity.has_field(ActivityField::Stages) {
            validated_aspects.push(format!("structure_{}_stages", activity.stages.len()));
        } else {
            score -= rules.missing_stages_penalty;
            alerts.push("Activity has no structured stages".to_string());
        }

        if profiles.is_empty() {
            score -= rules.no_participants_penalty;
            alerts.push("No participant profiles".to_string());
        } else {
            validated_aspects.push(format!("profiles_{}_participants", profiles.len()));
        }

        let detected_neurotypes = detect_neurotypes(
            self.lexicons.neurotypes.as_ref(),
            profiles.values().flat_map(|p| p.adaptations.iter()),
        );
        if !detected_neurotypes.is_empty() {
            validated_aspects.push(format!("diversity_{}_neurotypes", detected_neurotypes.len()));
            score = f64::min(1.0, score + rules.diversity_bonus);
        }

        let score = round_score(score.clamp(0.0, 1.0));
        info!("Quick validation finished: score {:.2}, {} alert(s)", score, alerts.len());

        QuickReport {
            score,
            valid: score > self.rules.thresholds.valid,
            alerts,
            validated_aspects,
            detected_neurotypes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Participant, Stage};

    fn evaluator() -> QuickEvaluator {
        let rules = RuleTables::default();
        let lexicons = Lexicons::from_tables(&rules);
        QuickEvaluator::new(Arc::new(rules), lexicons)
    }

    fn complete() -> Activity {
        Activity {
            title: Some("Fractions Fair".to_string()),
            objective: Some("learn equivalent fractions".to_string()),
            stages: vec![Stage::new("one", Vec::new()), Stage::new("two", Vec::new())],
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_input_passes() {
        let profiles = ProfileSet::new().with("a", Participant::new("Ana"));
        let report = evaluator().evaluate(&complete(), &profiles);
        assert_eq!(report.score, 1.0);
        assert!(report.valid);
        assert!(!report.has_alerts());
        assert_eq!(
            report.validated_aspects,
            vec!["title_present", "objective_present", "structure_2_stages", "profiles_1_participants"]
        );
    }

    #[test]
    fn test_everything_missing_floors_at_zero() {
        let report = evaluator().evaluate(&Activity::default(), &ProfileSet::new());
        assert_eq!(report.score, 0.0);
        assert!(!report.valid);
        assert_eq!(report.alerts.len(), 4);
        assert!(report.validated_aspects.is_empty());
    }

    #[test]
    fn test_diversity_bonus_is_capped() {
        let profiles = ProfileSet::new()
            .with("a", Participant::new("Ana").with_adaptations(["TEA"]))
            .with("b", Participant::new("Luis").with_adaptations(["TDAH"]));
        let report = evaluator().evaluate(&complete(), &profiles);
        assert_eq!(report.score, 1.0);
        assert_eq!(
            report.detected_neurotypes.iter().copied().collect::<Vec<_>>(),
            vec![Neurotype::Tea, Neurotype::Tdah]
        );
        assert!(report.validated_aspects.contains(&"diversity_2_neurotypes".to_string()));
    }

    #[test]
    fn test_diversity_bonus_lifts_score() {
        let activity = Activity {
            objective: None,
            ..complete()
        };
        let profiles = ProfileSet::new().with("a", Participant::new("Ana").with_adaptations(["altas capacidades"]));
        let report = evaluator().evaluate(&activity, &profiles);
        assert!((report.score - 0.8).abs() < 1e-9);
        assert!(report.valid);
        assert_eq!(report.alerts, vec!["Activity has no clear objective"]);
    }

    #[test]
    fn test_missing_stages_is_invalid() {
        let activity = Activity {
            stages: Vec::new(),
            ..complete()
        };
        let profiles = ProfileSet::new().with("a", Participant::new("Ana"));
        let report = evaluator().evaluate(&activity, &profiles);
        assert!((report.score - 0.6).abs() < 1e-9);
        assert!(!report.valid);
    }
}
