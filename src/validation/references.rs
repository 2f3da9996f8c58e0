//! Cross-reference check between assignments, profiles and activity tasks.
//!
//! Purely informational: the result is attached to the report but never
//! changes a score.

use crate::domain::{Activity, AssignmentSet, ProfileSet};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Dangling references found between the three input records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCheck {
    /// Assignment ids with no matching profile
    pub unprofiled_assignments: Vec<String>,
    /// Named activity tasks that no assignment mentions
    pub unassigned_tasks: Vec<String>,
}

impl ReferenceCheck {
    pub fn inspect(activity: &Activity, profiles: &ProfileSet, assignments: &AssignmentSet) -> Self {
        let unprofiled_assignments: Vec<String> = assignments
            .iter()
            .filter(|(id, _)| !profiles.contains(id))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &unprofiled_assignments {
            warn!("Assignment for '{}' has no matching profile", id);
        }

        let assigned: BTreeSet<String> = assignments
            .iter()
            .flat_map(|(_, a)| a.tasks.iter())
            .map(|t| t.trim().to_lowercase())
            .collect();

        let unassigned_tasks = if assignments.is_empty() {
            Vec::new()
        } else {
            activity
                .tasks()
                .map(|task| task.name.trim())
                .filter(|name| !name.is_empty() && !assigned.contains(&name.to_lowercase()))
                .map(str::to_string)
                .collect()
        };

        Self {
            unprofiled_assignments,
            unassigned_tasks,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.unprofiled_assignments.is_empty() && self.unassigned_tasks.is_empty()
    }
}
