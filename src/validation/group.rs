//! Group capability analysis shared by the coherence evaluator and reports.

use crate::domain::ProfileSet;
use crate::rules::{Neurotype, RuleProvider, detect_neurotypes};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How well the group is expected to collaborate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationPotential {
    Medium,
    MediumHigh,
    High,
}

impl fmt::Display for CollaborationPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CollaborationPotential::Medium => "medium",
            CollaborationPotential::MediumHigh => "medium-high",
            CollaborationPotential::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Aggregate view of what the participant group can do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCapability {
    pub participant_count: usize,
    /// Mean availability as a fraction, the proxy for capacity
    pub average_capability: f64,
    /// Most frequent strength tags, most frequent first (ties alphabetical)
    pub principal_strengths: Vec<String>,
    /// Number of distinct strength tags
    pub strength_diversity: usize,
    pub neurotypes: BTreeSet<Neurotype>,
    pub collaboration: CollaborationPotential,
}

impl GroupCapability {
    /// Summarize a profile set.
    pub fn analyze(profiles: &ProfileSet, principal_count: usize, neurotype_markers: &dyn RuleProvider) -> Self {
        let participant_count = profiles.len();
        let total_capability: f64 = profiles.values().map(|p| p.capacity()).sum();
        let average_capability = total_capability / participant_count.max(1) as f64;

        let mut frequency: BTreeMap<&str, usize> = BTreeMap::new();
        for participant in profiles.values() {
            for strength in &participant.strengths {
                *frequency.entry(strength.as_str()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = frequency.iter().map(|(s, c)| (*s, *c)).collect();
        // BTreeMap iteration is alphabetical and sort_by is stable
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let principal_strengths: Vec<String> = ranked
            .into_iter()
            .take(principal_count)
            .map(|(s, _)| s.to_string())
            .collect();

        let neurotypes = detect_neurotypes(
            neurotype_markers,
            profiles.values().flat_map(|p| p.adaptations.iter()),
        );

        let collaboration = if principal_strengths.len() > 3 {
            CollaborationPotential::High
        } else if neurotypes.len() > 2 {
            CollaborationPotential::MediumHigh
        } else {
            CollaborationPotential::Medium
        };

        Self {
            participant_count,
            average_capability,
            principal_strengths,
            strength_diversity: frequency.len(),
            neurotypes,
            collaboration,
        }
    }

    pub fn has_principal(&self, strength: &str) -> bool {
        let strength = strength.to_lowercase();
        self.principal_strengths.iter().any(|s| s.to_lowercase() == strength)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Participant;
    use crate::rules::{Lexicons, RuleTables};

    fn markers() -> Lexicons {
        Lexicons::from_tables(&RuleTables::default())
    }

    #[test]
    fn test_analyze_empty_group() {
        let group = GroupCapability::analyze(&ProfileSet::new(), 5, markers().neurotypes.as_ref());
        assert_eq!(group.participant_count, 0);
        assert_eq!(group.average_capability, 0.0);
        assert!(group.principal_strengths.is_empty());
        assert_eq!(group.collaboration, CollaborationPotential::Medium);
    }

    #[test]
    fn test_average_capability() {
        let profiles = ProfileSet::new()
            .with("a", Participant::new("A").with_availability(80.0))
            .with("b", Participant::new("B").with_availability(60.0));
        let group = GroupCapability::analyze(&profiles, 5, markers().neurotypes.as_ref());
        assert!((group.average_capability - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_principal_strengths_ranked_by_frequency_then_name() {
        let profiles = ProfileSet::new()
            .with("a", Participant::new("A").with_strengths(["creativity", "art", "leadership"]))
            .with("b", Participant::new("B").with_strengths(["creativity", "leadership"]))
            .with("c", Participant::new("C").with_strengths(["creativity", "music"]));
        let group = GroupCapability::analyze(&profiles, 3, markers().neurotypes.as_ref());
        assert_eq!(group.principal_strengths, vec!["creativity", "leadership", "art"]);
        assert_eq!(group.strength_diversity, 4);
        assert!(group.has_principal("art"));
        assert!(!group.has_principal("music"));
    }

    #[test]
    fn test_collaboration_high_with_diverse_strengths() {
        let profiles = ProfileSet::new().with(
            "a",
            Participant::new("A").with_strengths(["a", "b", "c", "d"]),
        );
        let group = GroupCapability::analyze(&profiles, 5, markers().neurotypes.as_ref());
        assert_eq!(group.collaboration, CollaborationPotential::High);
    }

    #[test]
    fn test_collaboration_medium_high_with_three_neurotypes() {
        let profiles = ProfileSet::new()
            .with("a", Participant::new("A").with_adaptations(["TEA"]))
            .with("b", Participant::new("B").with_adaptations(["TDAH"]))
            .with("c", Participant::new("C").with_adaptations(["altas capacidades"]));
        let group = GroupCapability::analyze(&profiles, 5, markers().neurotypes.as_ref());
        assert_eq!(group.neurotypes.len(), 3);
        assert_eq!(group.collaboration, CollaborationPotential::MediumHigh);
        assert_eq!(group.collaboration.to_string(), "medium-high");
    }
}
