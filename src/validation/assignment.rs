//! Assignment capability evaluator: roles against strengths, load against availability.

use crate::domain::{Assignment, AssignmentSet, Participant, ProfileSet};
use crate::rules::{AssignmentRules, Lexicons, RuleTables};
use crate::validation::traits::{Aspect, AspectEvaluator, ScoreCard, ValidationInput, ValidationResult};
use log::debug;
use std::sync::Arc;

/// Scores whether roles suit participants and tasks fit their availability
pub struct AssignmentEvaluator {
    rules: Arc<RuleTables>,
    lexicons: Lexicons,
}

impl AssignmentEvaluator {
    pub fn new(rules: Arc<RuleTables>, lexicons: Lexicons) -> Self {
        Self { rules, lexicons }
    }

    /// Whether a participant's strengths suit the role they were given.
    ///
    /// Roles that match no known kind are accepted. An empty role or a
    /// participant without strengths never aligns with a known kind.
    pub fn is_aligned(&self, assignment: &Assignment, participant: &Participant) -> bool {
        let role = assignment.role_text();
        if role.trim().is_empty() || participant.strengths.is_empty() {
            return false;
        }

        let kinds = self.lexicons.roles.classify(role);
        let Some(rule) = self.rules.first_role_rule(&kinds) else {
            return true;
        };

        let strengths: Vec<String> = participant.strengths.iter().map(|s| s.to_lowercase()).collect();
        rule.expected_strengths
            .iter()
            .any(|expected| strengths.contains(&expected.to_lowercase()))
    }

    pub fn check(&self, profiles: &ProfileSet, assignments: &AssignmentSet) -> ValidationResult {
        if assignments.is_empty() {
            return ValidationResult::zero(
                Aspect::AssignmentCapability,
                "no assignments to validate",
                vec!["Generate participant assignments".to_string()],
            );
        }

        let rules = &self.rules.assignment;
        let mut card = ScoreCard::new(Aspect::AssignmentCapability);
        let mut loads = Vec::new();

        for (id, assignment) in assignments.iter() {
            let Some(participant) = profiles.get(id) else {
                debug!("Skipping assignment for unknown participant {}", id);
                continue;
            };
            let display = if participant.name.trim().is_empty() {
                id.as_str()
            } else {
                participant.name.as_str()
            };

            if self.is_aligned(assignment, participant) {
                card.pass(format!("{}: role aligned with strengths", display));
            } else {
                card.deduct(
                    rules.misaligned_penalty,
                    format!("{}: role '{}' does not match strengths", display, assignment.role_text()),
                    format!("Review the role of {}", display),
                );
            }

            loads.push(estimated_load(assignment.tasks.len(), participant.capacity(), rules));
        }

        let average = if loads.is_empty() {
            rules.neutral_load
        } else {
            loads.iter().sum::<f64>() / loads.len() as f64
        };

        if average > rules.high_load_above {
            card.deduct(
                rules.high_load_penalty,
                format!("average workload {:.0}%", average * 100.0),
                "Workload too high; redistribute tasks",
            );
        } else if average < rules.low_load_below {
            card.deduct(
                rules.low_load_penalty,
                format!("average workload {:.0}%", average * 100.0),
                "Workload low; participants could take on more",
            );
        } else {
            card.pass(format!("balanced workload: {:.0}%", average * 100.0));
        }

        card.finish(self.rules.thresholds.valid)
    }
}

/// Load of a task list on one participant, capped at 1.0.
pub fn estimated_load(task_count: usize, capacity: f64, rules: &AssignmentRules) -> f64 {
    if task_count == 0 {
        return 0.0;
    }
    if capacity <= 0.0 {
        return 1.0;
    }
    (rules.load_per_task * task_count as f64 / capacity).min(1.0)
}

impl AspectEvaluator for AssignmentEvaluator {
    fn aspect(&self) -> Aspect {
        Aspect::AssignmentCapability
    }

    fn evaluate(&self, input: &ValidationInput<'_>) -> ValidationResult {
        self.check(input.profiles, input.assignments)
    }

    fn description(&self) -> &str {
        "role alignment and workload per participant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluator() -> AssignmentEvaluator {
        let rules = RuleTables::default();
        let lexicons = Lexicons::from_tables(&rules);
        AssignmentEvaluator::new(Arc::new(rules), lexicons)
    }

    #[test]
    fn test_estimated_load() {
        let rules = AssignmentRules::default();
        assert_eq!(estimated_load(0, 0.85, &rules), 0.0);
        assert_eq!(estimated_load(2, 0.0, &rules), 1.0);
        assert!((estimated_load(1, 0.85, &rules) - 0.3 / 0.85).abs() < 1e-9);
        assert_eq!(estimated_load(5, 0.5, &rules), 1.0);
    }

    #[test]
    fn test_empty_assignments_score_zero() {
        let result = evaluator().check(&ProfileSet::new(), &AssignmentSet::new());
        assert_eq!(result.score, 0.0);
        assert!(!result.valid);
        assert_eq!(result.recommendations, vec!["Generate participant assignments"]);
    }

    #[test]
    fn test_alignment_rules() {
        let evaluator = evaluator();
        let leader = Participant::new("Ana").with_strengths(["Leadership"]);
        let artist = Participant::new("Luis").with_strengths(["art"]);
        let blank = Participant::new("Eva");

        assert!(evaluator.is_aligned(&Assignment::new("Group coordinator"), &leader));
        assert!(!evaluator.is_aligned(&Assignment::new("Coordinador del equipo"), &artist));
        assert!(evaluator.is_aligned(&Assignment::new("Designer"), &artist));
        assert!(evaluator.is_aligned(&Assignment::new("Timekeeper"), &artist));
        assert!(!evaluator.is_aligned(&Assignment::new("Timekeeper"), &blank));
        assert!(!evaluator.is_aligned(&Assignment::default(), &leader));
    }

    #[test]
    fn test_balanced_aligned_group() {
        let profiles = ProfileSet::new()
            .with("a", Participant::new("Ana").with_strengths(["leadership"]).with_availability(60.0))
            .with("b", Participant::new("Luis").with_strengths(["art"]).with_availability(60.0));
        let assignments = AssignmentSet::new()
            .with("a", Assignment::new("coordinator").with_tasks(["t1"]))
            .with("b", Assignment::new("designer").with_tasks(["t2"]));
        let result = evaluator().check(&profiles, &assignments);
        assert_eq!(result.score, 1.0);
        assert!(result.details.contains("balanced workload: 50%"));
    }

    #[test]
    fn test_misaligned_and_low_load() {
        let profiles = ProfileSet::new()
            .with("a", Participant::new("Ana").with_strengths(["art"]))
            .with("b", Participant::new("").with_strengths(["art"]));
        let assignments = AssignmentSet::new()
            .with("a", Assignment::new("researcher").with_tasks(["t1"]))
            .with("b", Assignment::new("calculator").with_tasks(["t2"]));
        let result = evaluator().check(&profiles, &assignments);
        assert!((result.score - 0.7).abs() < 1e-9);
        assert!(result.recommendations.contains(&"Review the role of Ana".to_string()));
        assert!(result.recommendations.contains(&"Review the role of b".to_string()));
        assert!(result.recommendations.iter().any(|r| r.contains("Workload low")));
    }

    #[test]
    fn test_overloaded_participant() {
        let profiles = ProfileSet::new().with("a", Participant::new("Ana").with_strengths(["art"]).with_availability(40.0));
        let assignments = AssignmentSet::new().with("a", Assignment::new("designer").with_tasks(["t1", "t2", "t3"]));
        let result = evaluator().check(&profiles, &assignments);
        assert!((result.score - 0.85).abs() < 1e-9);
        assert!(result.recommendations[0].contains("redistribute"));
    }

    #[test]
    fn test_unknown_ids_fall_back_to_neutral_load() {
        let profiles = ProfileSet::new().with("a", Participant::new("Ana"));
        let assignments = AssignmentSet::new().with("ghost", Assignment::new("designer").with_tasks(["t1"]));
        let result = evaluator().check(&profiles, &assignments);
        assert_eq!(result.score, 1.0);
        assert!(result.details.contains("balanced workload: 50%"));
    }
}
