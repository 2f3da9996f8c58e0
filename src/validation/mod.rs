// Validation: the five aspect evaluators, the fast-path gate and consolidation

pub mod assignment;
pub mod coherence;
pub mod composite;
pub mod consolidate;
pub mod group;
pub mod inclusion;
pub mod quick;
pub mod references;
pub mod structure;
pub mod traits;
pub mod workload;

pub use assignment::AssignmentEvaluator;
pub use coherence::{CoherenceEvaluator, Complexity};
pub use composite::AspectSuite;
pub use consolidate::{
    AspectSummary, Clock, CoherenceLevel, ConsolidatedReport, Consolidator, ENGINE_VERSION, system_clock,
};
pub use group::{CollaborationPotential, GroupCapability};
pub use inclusion::InclusionEvaluator;
pub use quick::{QuickEvaluator, QuickReport};
pub use references::ReferenceCheck;
pub use structure::StructureEvaluator;
pub use traits::{Aspect, AspectEvaluator, ScoreCard, ValidationInput, ValidationResult, round_score};
pub use workload::WorkloadEvaluator;
