//! lesson-coherence - coherence validation for generated group activities
//!
//! Scores a lesson activity against the participants who will carry it out
//! and their role assignments along five independent aspects (structure,
//! profile coherence, assignment capability, inclusion, workload balance),
//! then consolidates the results into a single verdict with deduplicated
//! recommendations. A cheap quick mode gates activities before a full run.

pub mod domain;
pub mod engine;
pub mod error;
pub mod rules;
pub mod validation;

pub use domain::{Activity, Assignment, AssignmentSet, Participant, ProfileSet};
pub use engine::{ValidationEngine, ValidationRequest};
pub use error::{CoherenceError, Result};
pub use rules::{Lexicons, RuleProvider, RuleTables};
pub use validation::{Aspect, CoherenceLevel, ConsolidatedReport, QuickReport, ValidationResult};
