//! Domain types for lesson-coherence
//!
//! This module contains the records the engine validates:
//! - Activity: the generated lesson artifact (stages of tasks plus metadata)
//! - ProfileSet: participants keyed by id, with strengths and support needs
//! - AssignmentSet: role and task assignments keyed by participant id
//!
//! Every record deserializes leniently from the JSON the activity producer
//! emits (English or Spanish keys). Absent fields are valid states; only
//! shape mismatches are rejected at the boundary.

pub mod activity;
pub mod assignment;
pub mod profile;

pub use activity::{Activity, ActivityField, AssignmentFormat, Resources, Stage, Task};
pub use assignment::{Assignment, AssignmentSet};
pub use profile::{DEFAULT_AVAILABILITY, Participant, ProfileSet};

use crate::error::{CoherenceError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Parse a JSON document, reporting shape mismatches as schema violations.
pub(crate) fn parse_json<T: DeserializeOwned>(label: &str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| match e.classify() {
        serde_json::error::Category::Data => CoherenceError::Schema(format!("{}: {}", label, e)),
        _ => CoherenceError::Json(e),
    })
}

/// Read and parse a JSON file.
pub(crate) fn load_json<T: DeserializeOwned>(label: &str, path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    log::debug!("Loaded {} from {}", label, path.display());
    parse_json(label, &content)
}

/// Deserialize a sequence, treating an explicit `null` as empty.
pub(crate) fn nullable_seq<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a value, treating an explicit `null` as its default.
pub(crate) fn nullable_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode an id-keyed record map that may sit under a wrapper key.
///
/// The branch is picked by key presence, so a malformed record inside the
/// wrapper is an error rather than a reason to read the document as bare.
pub(crate) fn keyed_records<T: DeserializeOwned>(
    mut document: Map<String, Value>,
    wrappers: &[&str],
) -> serde_json::Result<BTreeMap<String, T>> {
    let records = match wrappers.iter().find_map(|key| document.remove(*key)) {
        Some(inner) => inner,
        None => Value::Object(document),
    };
    serde_json::from_value(records)
}

/// True when an optional text field carries something other than whitespace.
pub(crate) fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_schema_violation() {
        let err = parse_json::<Vec<u32>>("numbers", "\"not a list\"").unwrap_err();
        assert!(matches!(err, CoherenceError::Schema(_)));
        assert!(err.to_string().contains("numbers"));
    }

    #[test]
    fn test_parse_json_syntax_error() {
        let err = parse_json::<Vec<u32>>("numbers", "[1, 2").unwrap_err();
        assert!(matches!(err, CoherenceError::Json(_)));
    }

    #[test]
    fn test_keyed_records_wrapped_and_bare() {
        let wrapped: Map<String, Value> = serde_json::from_str(r#"{"items": {"a": 1, "b": 2}}"#).unwrap();
        let records: BTreeMap<String, u32> = keyed_records(wrapped, &["items"]).unwrap();
        assert_eq!(records.len(), 2);

        let bare: Map<String, Value> = serde_json::from_str(r#"{"a": 1}"#).unwrap();
        let records: BTreeMap<String, u32> = keyed_records(bare, &["items"]).unwrap();
        assert_eq!(records.get("a"), Some(&1));
    }

    #[test]
    fn test_keyed_records_bad_member_inside_wrapper() {
        let wrapped: Map<String, Value> = serde_json::from_str(r#"{"items": {"a": 1, "b": "two"}}"#).unwrap();
        assert!(keyed_records::<u32>(wrapped, &["items"]).is_err());
    }

    #[test]
    fn test_has_text() {
        assert!(has_text(&Some("x".to_string())));
        assert!(!has_text(&Some("   ".to_string())));
        assert!(!has_text(&None));
    }
}
