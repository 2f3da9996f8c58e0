//! Profile coherence evaluator: does the activity fit the group?

use crate::domain::{Activity, AssignmentFormat, ProfileSet};
use crate::rules::{CoherenceRules, Lexicons, RuleTables};
use crate::validation::group::GroupCapability;
use crate::validation::traits::{Aspect, AspectEvaluator, ScoreCard, ValidationInput, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Rough difficulty of an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    /// Estimate complexity from stage and task counts.
    ///
    /// Every stage and task adds points, group tasks add extra; the total is
    /// compared against the two cut-offs in the rules.
    pub fn estimate(activity: &Activity, rules: &CoherenceRules) -> Self {
        let points = complexity_points(activity, rules);
        if points > rules.high_complexity_above {
            Complexity::High
        } else if points > rules.medium_complexity_above {
            Complexity::Medium
        } else {
            Complexity::Low
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        };
        write!(f, "{}", s)
    }
}

fn complexity_points(activity: &Activity, rules: &CoherenceRules) -> f64 {
    let stages = activity.stages.len() as f64 * rules.stage_points;
    let tasks: f64 = activity
        .tasks()
        .map(|task| match task.assignment_format {
            AssignmentFormat::Groups => rules.task_points + rules.group_task_points,
            _ => rules.task_points,
        })
        .sum();
    stages + tasks
}

/// Scores how well the group's capability and strengths match the activity
pub struct CoherenceEvaluator {
    rules: Arc<RuleTables>,
    lexicons: Lexicons,
}

impl CoherenceEvaluator {
    pub fn new(rules: Arc<RuleTables>, lexicons: Lexicons) -> Self {
        Self { rules, lexicons }
    }

    /// Strength categories the activity text calls for.
    pub fn required_strengths(&self, activity: &Activity) -> BTreeSet<String> {
        self.lexicons.strengths.classify(&activity.headline())
    }

    /// Whether the group holds a required category, under its tag or an alias.
    pub fn is_covered(&self, tag: &str, group: &GroupCapability) -> bool {
        match self.rules.coherence.strength_keywords.iter().find(|c| c.tag == tag) {
            Some(category) => category.names().any(|name| group.has_principal(name)),
            None => group.has_principal(tag),
        }
    }

    pub fn check(&self, activity: &Activity, profiles: &ProfileSet) -> ValidationResult {
        if profiles.is_empty() {
            return ValidationResult::zero(
                Aspect::ProfileCoherence,
                "no participants to validate against",
                vec!["Provide participant profiles".to_string()],
            );
        }

        let rules = &self.rules.coherence;
        let mut card = ScoreCard::new(Aspect::ProfileCoherence);

        let complexity = Complexity::estimate(activity, rules);
        let group = GroupCapability::analyze(profiles, rules.principal_strengths, self.lexicons.neurotypes.as_ref());
        let capability = group.average_capability;

        if complexity == Complexity::High && capability < rules.overload_capability_below {
            card.deduct(
                rules.overload_penalty,
                format!("high complexity for group capability {:.0}%", capability * 100.0),
                "Activity too complex for the group level; simplify stages or tasks",
            );
        } else if complexity == Complexity::Low && capability > rules.underload_capability_above {
            card.deduct(
                rules.underload_penalty,
                format!("low complexity for group capability {:.0}%", capability * 100.0),
                "Activity not challenging enough; add depth or extension tasks",
            );
        } else {
            card.pass(format!(
                "{} complexity suits group capability {:.0}%",
                complexity,
                capability * 100.0
            ));
        }

        let required = self.required_strengths(activity);
        let matched = required.iter().filter(|tag| self.is_covered(tag, &group)).count();
        let coverage = matched as f64 / required.len().max(1) as f64;

        if coverage < rules.min_coverage {
            card.deduct(
                rules.coverage_penalty,
                format!("strength coverage {:.0}%", coverage * 100.0),
                "Few group strengths align with the activity",
            );
        } else {
            card.pass(format!("strength coverage {:.0}%", coverage * 100.0));
        }

        card.finish(self.rules.thresholds.valid)
    }
}

impl AspectEvaluator for CoherenceEvaluator {
    fn aspect(&self) -> Aspect {
        Aspect::ProfileCoherence
    }

    fn evaluate(&self, input: &ValidationInput<'_>) -> ValidationResult {
        self.check(input.activity, input.profiles)
    }

    fn description(&self) -> &str {
        "activity complexity and required strengths against the group"
    }
}
