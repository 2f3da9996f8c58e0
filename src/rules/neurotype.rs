//! Neurotype markers and the inclusion evidence they call for.

use super::lexicon::{RuleProvider, contains_any};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Support profile detected from a participant's adaptation tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Neurotype {
    /// Autism spectrum (TEA)
    #[serde(rename = "TEA")]
    Tea,
    /// Attention deficit / hyperactivity (TDAH, ADHD)
    #[serde(rename = "TDAH")]
    Tdah,
    /// High abilities ("altas capacidades")
    Gifted,
}

impl Neurotype {
    pub const ALL: [Neurotype; 3] = [Neurotype::Tea, Neurotype::Tdah, Neurotype::Gifted];

    /// Stable tag used by classifiers and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Neurotype::Tea => "TEA",
            Neurotype::Tdah => "TDAH",
            Neurotype::Gifted => "Gifted",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.as_str().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for Neurotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Markers, expected evidence and penalty for one neurotype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeurotypeRule {
    pub neurotype: Neurotype,

    /// Adaptation tokens that reveal this neurotype (token match)
    pub markers: Vec<String>,

    /// Evidence groups expected in the observations; every group must be met
    /// by at least one of its keywords
    pub evidence: Vec<Vec<String>>,

    pub penalty: f64,

    pub recommendation: String,
}

impl NeurotypeRule {
    pub fn new(neurotype: Neurotype, markers: &[&str], penalty: f64, recommendation: &str) -> Self {
        Self {
            neurotype,
            markers: markers.iter().map(|m| m.to_string()).collect(),
            evidence: Vec::new(),
            penalty,
            recommendation: recommendation.to_string(),
        }
    }

    /// Require at least one of these keywords (builder pattern)
    pub fn requiring(mut self, any_of: &[&str]) -> Self {
        self.evidence.push(any_of.iter().map(|k| k.to_string()).collect());
        self
    }

    /// Whether the observations text carries the expected evidence.
    pub fn is_covered_by(&self, observations: &str) -> bool {
        self.evidence.iter().all(|group| contains_any(observations, group))
    }
}

/// Collect the neurotypes revealed by a set of adaptation strings.
pub fn detect<'a, I>(provider: &dyn RuleProvider, adaptations: I) -> BTreeSet<Neurotype>
where
    I: IntoIterator<Item = &'a String>,
{
    adaptations
        .into_iter()
        .flat_map(|adaptation| provider.classify(adaptation))
        .filter_map(|tag| Neurotype::from_tag(&tag))
        .collect()
}
