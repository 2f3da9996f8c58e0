//! Participant profiles

use super::{keyed_records, load_json, nullable_default, parse_json};
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Availability assumed when a profile does not state one.
pub const DEFAULT_AVAILABILITY: f64 = 85.0;

/// A single participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Participant {
    #[serde(alias = "nombre", deserialize_with = "nullable_default")]
    pub name: String,

    /// Free-form strength tags (e.g. "creativity", "written_communication")
    #[serde(alias = "fortalezas")]
    pub strengths: BTreeSet<String>,

    /// Support-need tags; some carry a neurotype marker such as "TEA"
    #[serde(alias = "adaptaciones")]
    pub adaptations: BTreeSet<String>,

    /// Percentage in [0, 100]
    #[serde(alias = "disponibilidad", deserialize_with = "nullable_availability")]
    pub availability: f64,
}

fn nullable_availability<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(DEFAULT_AVAILABILITY))
}

impl Default for Participant {
    fn default() -> Self {
        Self {
            name: String::new(),
            strengths: BTreeSet::new(),
            adaptations: BTreeSet::new(),
            availability: DEFAULT_AVAILABILITY,
        }
    }
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_strengths<I, S>(mut self, strengths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strengths = strengths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_adaptations<I, S>(mut self, adaptations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.adaptations = adaptations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_availability(mut self, availability: f64) -> Self {
        self.availability = availability;
        self
    }

    /// Availability as a fraction, the proxy used for capacity.
    pub fn capacity(&self) -> f64 {
        self.availability / 100.0
    }

    pub fn has_needs(&self) -> bool {
        !self.adaptations.is_empty()
    }
}

/// Participants keyed by unique id, iterated in id order
///
/// Profile sources emit either a bare id map or a wrapper object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct ProfileSet {
    pub participants: BTreeMap<String, Participant>,
}

const PROFILE_WRAPPERS: &[&str] = &["participants", "estudiantes", "students"];

impl TryFrom<Map<String, Value>> for ProfileSet {
    type Error = serde_json::Error;

    fn try_from(document: Map<String, Value>) -> serde_json::Result<Self> {
        Ok(Self {
            participants: keyed_records(document, PROFILE_WRAPPERS)?,
        })
    }
}

impl FromIterator<(String, Participant)> for ProfileSet {
    fn from_iter<T: IntoIterator<Item = (String, Participant)>>(iter: T) -> Self {
        Self {
            participants: iter.into_iter().collect(),
        }
    }
}

impl ProfileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a profile set from JSON, clamping out-of-range availability.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let mut profiles: Self = parse_json("profiles", content)?;
        profiles.normalize();
        Ok(profiles)
    }

    /// Load a profile set from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let mut profiles: Self = load_json("profiles", path)?;
        profiles.normalize();
        Ok(profiles)
    }

    /// Add a participant (builder pattern)
    pub fn with(mut self, id: impl Into<String>, participant: Participant) -> Self {
        self.participants.insert(id.into(), participant);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.participants.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Participant)> {
        self.participants.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &Participant> {
        self.participants.values()
    }

    fn normalize(&mut self) {
        for (id, participant) in self.participants.iter_mut() {
            let availability = participant.availability;
            if !availability.is_finite() || !(0.0..=100.0).contains(&availability) {
                let clamped = if availability.is_nan() {
                    DEFAULT_AVAILABILITY
                } else {
                    availability.clamp(0.0, 100.0)
                };
                log::warn!(
                    "Participant {} availability {} outside [0, 100], using {}",
                    id,
                    availability,
                    clamped
                );
                participant.availability = clamped;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoherenceError;

    #[test]
    fn test_parse_bare_map() {
        let json = r#"{
            "p1": {"name": "Ana", "strengths": ["creativity"], "availability": 90},
            "p2": {"name": "Luis", "adaptations": ["TDAH: frequent breaks"]}
        }"#;
        let profiles = ProfileSet::from_json_str(json).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles.get("p1").unwrap().availability, 90.0);
        assert_eq!(profiles.get("p2").unwrap().availability, DEFAULT_AVAILABILITY);
        assert!(profiles.get("p2").unwrap().has_needs());
    }

    #[test]
    fn test_parse_spanish_wrapper() {
        let json = r#"{"estudiantes": {
            "003": {"nombre": "Elena", "fortalezas": ["arte"], "adaptaciones": ["TEA nivel 1"], "disponibilidad": 70}
        }}"#;
        let profiles = ProfileSet::from_json_str(json).unwrap();
        let elena = profiles.get("003").unwrap();
        assert_eq!(elena.name, "Elena");
        assert!(elena.strengths.contains("arte"));
        assert_eq!(elena.capacity(), 0.7);
    }

    #[test]
    fn test_availability_clamped() {
        let json = r#"{"p1": {"name": "Ana", "availability": 140}, "p2": {"name": "Eva", "availability": -5}}"#;
        let profiles = ProfileSet::from_json_str(json).unwrap();
        assert_eq!(profiles.get("p1").unwrap().availability, 100.0);
        assert_eq!(profiles.get("p2").unwrap().availability, 0.0);
    }

    #[test]
    fn test_bad_member_inside_wrapper_is_schema_violation() {
        let json = r#"{"estudiantes": {
            "001": {"nombre": "Ana", "disponibilidad": "alta"},
            "002": {"nombre": "Luis"}
        }}"#;
        let err = ProfileSet::from_json_str(json).unwrap_err();
        assert!(matches!(err, CoherenceError::Schema(_)));
        assert!(err.to_string().contains("profiles"));
    }

    #[test]
    fn test_null_availability_uses_default() {
        let json = r#"{"estudiantes": {"001": {"nombre": "Ana", "disponibilidad": null}, "002": {"nombre": null}}}"#;
        let profiles = ProfileSet::from_json_str(json).unwrap();
        assert_eq!(profiles.len(), 2);
        assert!(!profiles.contains("estudiantes"));
        assert_eq!(profiles.get("001").unwrap().availability, DEFAULT_AVAILABILITY);
        assert_eq!(profiles.get("002").unwrap().name, "");
    }

    #[test]
    fn test_empty_profiles() {
        let profiles = ProfileSet::from_json_str("{}").unwrap();
        assert!(profiles.is_empty());
    }

    #[test]
    fn test_builder_and_iteration_order() {
        let profiles = ProfileSet::new()
            .with("b", Participant::new("Bea"))
            .with("a", Participant::new("Ari"));
        let ids: Vec<&String> = profiles.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_participant_builders() {
        let participant = Participant::new("Ana")
            .with_strengths(["leadership", "creativity"])
            .with_adaptations(["gifted"])
            .with_availability(60.0);
        assert_eq!(participant.strengths.len(), 2);
        assert!(participant.has_needs());
        assert_eq!(participant.capacity(), 0.6);
    }
}
