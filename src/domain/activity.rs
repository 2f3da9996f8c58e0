//! Activity record and related types
//!
//! An Activity is the lesson-plan-like artifact produced upstream: a title and
//! objective, an ordered list of stages, each holding ordered tasks, plus
//! resources and free-text observations describing adaptations.

use super::{has_text, load_json, nullable_default, nullable_seq, parse_json};
use crate::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::Path;

/// The artifact under validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    #[serde(alias = "titulo")]
    pub title: Option<String>,

    #[serde(alias = "objetivo")]
    pub objective: Option<String>,

    /// Educational level (e.g. "4th grade")
    #[serde(alias = "nivel_educativo", alias = "nivel")]
    pub level: Option<String>,

    /// Free-text duration; numeric input is read as minutes
    #[serde(alias = "duracion_minutos", alias = "duracion", deserialize_with = "duration_text")]
    pub duration: Option<String>,

    /// Adaptation notes, scanned for inclusion evidence
    #[serde(alias = "observaciones")]
    pub observations: Option<String>,

    /// Stages in execution order
    #[serde(alias = "etapas", deserialize_with = "nullable_seq")]
    pub stages: Vec<Stage>,

    #[serde(alias = "recursos")]
    pub resources: Option<Resources>,
}

impl Activity {
    /// Parse an activity from JSON.
    pub fn from_json_str(content: &str) -> Result<Self> {
        parse_json("activity", content)
    }

    /// Load an activity from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        load_json("activity", path)
    }

    /// Whether a field counts as present (non-empty).
    pub fn has_field(&self, field: ActivityField) -> bool {
        match field {
            ActivityField::Title => has_text(&self.title),
            ActivityField::Objective => has_text(&self.objective),
            ActivityField::Level => has_text(&self.level),
            ActivityField::Duration => has_text(&self.duration),
            ActivityField::Observations => has_text(&self.observations),
            ActivityField::Stages => !self.stages.is_empty(),
            ActivityField::Resources => self.resources.as_ref().is_some_and(|r| !r.is_empty()),
        }
    }

    /// All tasks across all stages, in execution order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.stages.iter().flat_map(|stage| stage.tasks.iter())
    }

    /// Total number of tasks across all stages.
    pub fn task_count(&self) -> usize {
        self.stages.iter().map(|stage| stage.tasks.len()).sum()
    }

    /// Title and objective joined, the text strengths are inferred from.
    pub fn headline(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or_default(),
            self.objective.as_deref().unwrap_or_default()
        )
    }

    /// Observations, or an empty string when absent.
    pub fn observations_text(&self) -> &str {
        self.observations.as_deref().unwrap_or_default()
    }
}

/// Activity fields that structure rules can require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityField {
    Title,
    Objective,
    Level,
    Duration,
    Observations,
    Stages,
    Resources,
}

impl ActivityField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityField::Title => "title",
            ActivityField::Objective => "objective",
            ActivityField::Level => "level",
            ActivityField::Duration => "duration",
            ActivityField::Observations => "observations",
            ActivityField::Stages => "stages",
            ActivityField::Resources => "resources",
        }
    }
}

impl fmt::Display for ActivityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named stage holding ordered tasks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage {
    #[serde(alias = "nombre", deserialize_with = "nullable_default")]
    pub name: String,

    #[serde(alias = "tareas", deserialize_with = "nullable_seq")]
    pub tasks: Vec<Task>,
}

impl Stage {
    pub fn new(name: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            name: name.into(),
            tasks,
        }
    }
}

/// A single task inside a stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskRepr")]
pub struct Task {
    pub name: String,
    pub description: String,
    pub assignment_format: AssignmentFormat,
}

impl Task {
    pub fn new(name: impl Into<String>, assignment_format: AssignmentFormat) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            assignment_format,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Producers emit tasks either as objects or as bare names.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskRepr {
    Named(String),
    Detailed(TaskFields),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct TaskFields {
    #[serde(alias = "nombre", deserialize_with = "nullable_default")]
    name: String,
    #[serde(alias = "descripcion", deserialize_with = "nullable_default")]
    description: String,
    #[serde(alias = "formato_asignacion", alias = "format")]
    assignment_format: AssignmentFormat,
}

impl From<TaskRepr> for Task {
    fn from(repr: TaskRepr) -> Self {
        match repr {
            TaskRepr::Named(name) => Task::new(name, AssignmentFormat::Unspecified),
            TaskRepr::Detailed(fields) => Task {
                name: fields.name,
                description: fields.description,
                assignment_format: fields.assignment_format,
            },
        }
    }
}

/// How a task is meant to be carried out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum AssignmentFormat {
    Individual,
    Pairs,
    Groups,
    #[default]
    Unspecified,
}

impl From<String> for AssignmentFormat {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "individual" | "individuales" => AssignmentFormat::Individual,
            "pairs" | "pair" | "parejas" | "pareja" => AssignmentFormat::Pairs,
            "groups" | "group" | "grupos" | "grupo" | "grupal" => AssignmentFormat::Groups,
            _ => AssignmentFormat::Unspecified,
        }
    }
}

impl From<Option<String>> for AssignmentFormat {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => Self::from(text),
            None => Self::default(),
        }
    }
}

/// Resources are either a free-text line or a list of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resources {
    List(Vec<String>),
    Text(String),
}

impl Resources {
    pub fn is_empty(&self) -> bool {
        match self {
            Resources::List(items) => items.iter().all(|item| item.trim().is_empty()),
            Resources::Text(text) => text.trim().is_empty(),
        }
    }
}

fn duration_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Minutes(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Text(text)) => Some(text),
        Some(Raw::Minutes(minutes)) => Some(format!("{} minutes", minutes)),
    })
}
