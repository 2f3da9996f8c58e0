//! Role and task assignments

use super::{keyed_records, load_json, nullable_seq, parse_json};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// What one participant was assigned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assignment {
    #[serde(alias = "rol")]
    pub role: Option<String>,

    /// Task identifiers or descriptions
    #[serde(alias = "tareas", deserialize_with = "nullable_seq")]
    pub tasks: Vec<String>,
}

impl Assignment {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            tasks: Vec::new(),
        }
    }

    pub fn with_tasks<I, S>(mut self, tasks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tasks = tasks.into_iter().map(Into::into).collect();
        self
    }

    pub fn role_text(&self) -> &str {
        self.role.as_deref().unwrap_or_default()
    }
}

/// Assignments keyed by participant id
///
/// Accepts a bare id map or an `assignments`/`asignaciones` wrapper. Keys
/// without a matching profile are tolerated; evaluators skip them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct AssignmentSet {
    pub assignments: BTreeMap<String, Assignment>,
}

const ASSIGNMENT_WRAPPERS: &[&str] = &["assignments", "asignaciones"];

impl TryFrom<Map<String, Value>> for AssignmentSet {
    type Error = serde_json::Error;

    fn try_from(document: Map<String, Value>) -> serde_json::Result<Self> {
        Ok(Self {
            assignments: keyed_records(document, ASSIGNMENT_WRAPPERS)?,
        })
    }
}

impl FromIterator<(String, Assignment)> for AssignmentSet {
    fn from_iter<T: IntoIterator<Item = (String, Assignment)>>(iter: T) -> Self {
        Self {
            assignments: iter.into_iter().collect(),
        }
    }
}

impl AssignmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        parse_json("assignments", content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_json("assignments", path)
    }

    /// Add an assignment (builder pattern)
    pub fn with(mut self, id: impl Into<String>, assignment: Assignment) -> Self {
        self.assignments.insert(id.into(), assignment);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Assignment> {
        self.assignments.get(id)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Assignment)> {
        self.assignments.iter()
    }
}
