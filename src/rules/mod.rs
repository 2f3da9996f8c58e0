//! Rule tables: every weight, penalty, threshold and lexicon the evaluators use.
//!
//! The tables are plain data, loaded once when the engine is built and read-only
//! afterwards. Defaults carry the stock values; all of them are tunable through
//! the `rules:` section of the config file. They are heuristics, not validated
//! pedagogical thresholds.

mod lexicon;
mod neurotype;

pub use lexicon::{KeywordCategory, KeywordClassifier, MatchMode, RuleProvider, contains_any};
pub use neurotype::{Neurotype, NeurotypeRule, detect as detect_neurotypes};

use crate::domain::ActivityField;
use crate::error::{CoherenceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// All rule tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleTables {
    pub thresholds: Thresholds,
    pub structure: StructureRules,
    pub coherence: CoherenceRules,
    pub assignment: AssignmentRules,
    pub inclusion: InclusionRules,
    pub workload: WorkloadRules,
    pub quick: QuickRules,
}

/// Score bands shared by every aspect and the consolidated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Aspect results are valid strictly above this; the report is valid at or above it
    pub valid: f64,
    pub good: f64,
    pub excellent: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            valid: 0.6,
            good: 0.8,
            excellent: 0.95,
        }
    }
}

/// A required activity field and what its absence costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWeight {
    pub field: ActivityField,
    pub weight: f64,
}

impl FieldWeight {
    pub fn new(field: ActivityField, weight: f64) -> Self {
        Self { field, weight }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureRules {
    pub required_fields: Vec<FieldWeight>,
    pub min_stages: usize,
    pub max_stages: usize,
    pub few_stages_penalty: f64,
    pub many_stages_penalty: f64,
}

impl Default for StructureRules {
    fn default() -> Self {
        Self {
            required_fields: vec![
                FieldWeight::new(ActivityField::Title, 0.15),
                FieldWeight::new(ActivityField::Objective, 0.25),
                FieldWeight::new(ActivityField::Level, 0.10),
                FieldWeight::new(ActivityField::Stages, 0.30),
                FieldWeight::new(ActivityField::Resources, 0.10),
                FieldWeight::new(ActivityField::Observations, 0.10),
            ],
            min_stages: 2,
            max_stages: 5,
            few_stages_penalty: 0.10,
            many_stages_penalty: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoherenceRules {
    pub stage_points: f64,
    pub task_points: f64,
    /// Extra points for every task done in groups
    pub group_task_points: f64,
    pub high_complexity_above: f64,
    pub medium_complexity_above: f64,
    /// How many of the most frequent strengths count as principal
    pub principal_strengths: usize,
    pub overload_capability_below: f64,
    pub overload_penalty: f64,
    pub underload_capability_above: f64,
    pub underload_penalty: f64,
    pub min_coverage: f64,
    pub coverage_penalty: f64,
    /// Activity text keywords → required strength categories; a category is
    /// covered when the group holds its tag or any alias as a principal strength
    pub strength_keywords: Vec<KeywordCategory>,
}

impl Default for CoherenceRules {
    fn default() -> Self {
        Self {
            stage_points: 1.0,
            task_points: 0.5,
            group_task_points: 0.5,
            high_complexity_above: 8.0,
            medium_complexity_above: 4.0,
            principal_strengths: 5,
            overload_capability_below: 0.6,
            overload_penalty: 0.3,
            underload_capability_above: 0.8,
            underload_penalty: 0.2,
            min_coverage: 0.5,
            coverage_penalty: 0.2,
            strength_keywords: vec![
                KeywordCategory::new(
                    "mathematics",
                    &[
                        "number", "calculation", "operation", "fraction", "número", "numero", "cálculo",
                        "calculo", "operaciones", "fraccion", "fracción",
                    ],
                )
                .with_aliases(&["matemáticas", "matematicas"]),
                KeywordCategory::new(
                    "communication",
                    &[
                        "presentation", "group", "debate", "writing", "presentación", "presentacion",
                        "grupo", "escritura",
                    ],
                )
                .with_aliases(&["comunicación", "comunicacion"]),
                KeywordCategory::new(
                    "experimentation",
                    &[
                        "research", "experiment", "observation", "investigación", "investigacion",
                        "experimento", "observación", "observacion",
                    ],
                )
                .with_aliases(&["experimentación", "experimentacion"]),
                KeywordCategory::new(
                    "creativity",
                    &["design", "art", "mural", "creative", "diseño", "arte", "creativ"],
                )
                .with_aliases(&["creatividad"]),
            ],
        }
    }
}

/// A role kind, the words that name it and the strengths it expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    pub role: String,
    pub keywords: Vec<String>,
    pub expected_strengths: Vec<String>,
}

impl RoleRule {
    pub fn new(role: &str, keywords: &[&str], expected_strengths: &[&str]) -> Self {
        Self {
            role: role.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            expected_strengths: expected_strengths.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentRules {
    pub misaligned_penalty: f64,
    /// Load one task puts on a fully available participant
    pub load_per_task: f64,
    pub high_load_above: f64,
    pub high_load_penalty: f64,
    pub low_load_below: f64,
    pub low_load_penalty: f64,
    /// Average load assumed when no assignment matches a profile
    pub neutral_load: f64,
    /// Checked in order; the first matching role decides
    pub roles: Vec<RoleRule>,
}

impl Default for AssignmentRules {
    fn default() -> Self {
        Self {
            misaligned_penalty: 0.1,
            load_per_task: 0.3,
            high_load_above: 0.8,
            high_load_penalty: 0.15,
            low_load_below: 0.4,
            low_load_penalty: 0.10,
            neutral_load: 0.5,
            roles: vec![
                RoleRule::new(
                    "coordinator",
                    &["coordinator", "coordinador"],
                    &[
                        "leadership", "written_communication", "organization", "liderazgo",
                        "comunicación_escrita", "organización",
                    ],
                ),
                RoleRule::new(
                    "researcher",
                    &["researcher", "investigador"],
                    &[
                        "curiosity", "research", "experimentation", "curiosidad_científica",
                        "investigación", "experimentación",
                    ],
                ),
                RoleRule::new(
                    "communicator",
                    &["communicator", "comunicador"],
                    &[
                        "written_communication", "presentation", "collaboration", "comunicación_escrita",
                        "presentación", "colaboración",
                    ],
                ),
                RoleRule::new(
                    "designer",
                    &["designer", "diseñador"],
                    &["creativity", "art", "visual_design", "creatividad", "arte", "diseño_visual"],
                ),
                RoleRule::new(
                    "calculator",
                    &["calculator", "calculador"],
                    &[
                        "math_numbers", "math_operations", "matemáticas_números", "operaciones_matemáticas",
                    ],
                ),
            ],
        }
    }
}

/// Neurotype markers and the observation evidence each one needs
///
/// The stock TEA table needs a visual keyword plus a structure keyword. Activity
/// stations count as structure, so "visual stations" covers TEA; drop "station",
/// "estación" and "estacion" from the second group for the literal
/// visual-and-structure rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InclusionRules {
    pub neurotypes: Vec<NeurotypeRule>,
}

impl InclusionRules {
    pub fn rule_for(&self, neurotype: Neurotype) -> Option<&NeurotypeRule> {
        self.neurotypes.iter().find(|rule| rule.neurotype == neurotype)
    }
}

impl Default for InclusionRules {
    fn default() -> Self {
        Self {
            neurotypes: vec![
                NeurotypeRule::new(
                    Neurotype::Tea,
                    &["TEA", "autism", "autismo", "ASD"],
                    0.20,
                    "Add visual and structural supports for TEA",
                )
                .requiring(&["visual"])
                .requiring(&[
                    "structur", "estructur", "routine", "rutina", "predictab", "predecib", "station",
                    "estación", "estacion",
                ]),
                NeurotypeRule::new(
                    Neurotype::Tdah,
                    &["TDAH", "ADHD", "hiperactividad", "hyperactivity"],
                    0.20,
                    "Add movement breaks for TDAH",
                )
                .requiring(&["movement", "break", "movimiento", "descanso", "pausa"]),
                NeurotypeRule::new(
                    Neurotype::Gifted,
                    &["altas capacidades", "gifted", "high ability"],
                    0.15,
                    "Add extra challenge or enrichment for gifted participants",
                )
                .requiring(&["challenge", "enrichment", "desafío", "desafio", "reto", "enriquecimiento"]),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadRules {
    pub max_tasks_per_participant: f64,
    pub min_tasks_per_participant: f64,
    pub overload_penalty: f64,
    pub underuse_penalty: f64,
    /// Tokens that make a duration recognizable
    pub duration_units: Vec<String>,
    pub vague_duration_penalty: f64,
}

impl Default for WorkloadRules {
    fn default() -> Self {
        Self {
            max_tasks_per_participant: 3.0,
            min_tasks_per_participant: 1.0,
            overload_penalty: 0.2,
            underuse_penalty: 0.1,
            duration_units: ["session", "hour", "minute", "sesion", "sesión", "hora", "minuto"]
                .iter()
                .map(|u| u.to_string())
                .collect(),
            vague_duration_penalty: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickRules {
    pub missing_title_penalty: f64,
    pub missing_objective_penalty: f64,
    pub missing_stages_penalty: f64,
    pub no_participants_penalty: f64,
    /// Bonus when any neurotype is detected, capped at 1.0
    pub diversity_bonus: f64,
}

impl Default for QuickRules {
    fn default() -> Self {
        Self {
            missing_title_penalty: 0.2,
            missing_objective_penalty: 0.3,
            missing_stages_penalty: 0.4,
            no_participants_penalty: 0.3,
            diversity_bonus: 0.1,
        }
    }
}

impl RuleTables {
    /// Check the tables are initialized and internally consistent.
    pub fn validate(&self) -> Result<()> {
        let t = &self.thresholds;
        if !(0.0 <= t.valid && t.valid <= t.good && t.good <= t.excellent && t.excellent <= 1.0) {
            return Err(CoherenceError::Rules(format!(
                "thresholds must satisfy 0 <= valid <= good <= excellent <= 1 (got {}, {}, {})",
                t.valid, t.good, t.excellent
            )));
        }

        if self.structure.required_fields.is_empty() {
            return Err(CoherenceError::Rules("structure.required_fields is empty".to_string()));
        }
        if self.structure.min_stages > self.structure.max_stages {
            return Err(CoherenceError::Rules(
                "structure.min_stages must not exceed structure.max_stages".to_string(),
            ));
        }
        if self.coherence.strength_keywords.is_empty() {
            return Err(CoherenceError::Rules("coherence.strength_keywords is empty".to_string()));
        }
        if self.inclusion.neurotypes.is_empty() {
            return Err(CoherenceError::Rules("inclusion.neurotypes is empty".to_string()));
        }
        if self.workload.min_tasks_per_participant > self.workload.max_tasks_per_participant {
            return Err(CoherenceError::Rules(
                "workload.min_tasks_per_participant must not exceed max_tasks_per_participant".to_string(),
            ));
        }

        for (name, value) in self.penalties() {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoherenceError::Rules(format!("{} must be within [0, 1] (got {})", name, value)));
            }
        }

        Ok(())
    }

    /// Every weight and penalty, named for error reporting
    fn penalties(&self) -> Vec<(String, f64)> {
        let mut values: Vec<(String, f64)> = self
            .structure
            .required_fields
            .iter()
            .map(|fw| (format!("structure.required_fields.{}", fw.field), fw.weight))
            .collect();

        values.extend(
            self.inclusion
                .neurotypes
                .iter()
                .map(|rule| (format!("inclusion.{}.penalty", rule.neurotype), rule.penalty)),
        );

        let fixed = [
            ("structure.few_stages_penalty", self.structure.few_stages_penalty),
            ("structure.many_stages_penalty", self.structure.many_stages_penalty),
            ("coherence.overload_penalty", self.coherence.overload_penalty),
            ("coherence.underload_penalty", self.coherence.underload_penalty),
            ("coherence.coverage_penalty", self.coherence.coverage_penalty),
            ("coherence.min_coverage", self.coherence.min_coverage),
            ("assignment.misaligned_penalty", self.assignment.misaligned_penalty),
            ("assignment.high_load_penalty", self.assignment.high_load_penalty),
            ("assignment.low_load_penalty", self.assignment.low_load_penalty),
            ("assignment.neutral_load", self.assignment.neutral_load),
            ("workload.overload_penalty", self.workload.overload_penalty),
            ("workload.underuse_penalty", self.workload.underuse_penalty),
            ("workload.vague_duration_penalty", self.workload.vague_duration_penalty),
            ("quick.missing_title_penalty", self.quick.missing_title_penalty),
            ("quick.missing_objective_penalty", self.quick.missing_objective_penalty),
            ("quick.missing_stages_penalty", self.quick.missing_stages_penalty),
            ("quick.no_participants_penalty", self.quick.no_participants_penalty),
            ("quick.diversity_bonus", self.quick.diversity_bonus),
        ];
        values.extend(fixed.into_iter().map(|(name, value)| (name.to_string(), value)));
        values
    }

    /// The first role rule, in table order, among the matched role kinds.
    pub fn first_role_rule(&self, matched_roles: &BTreeSet<String>) -> Option<&RoleRule> {
        self.assignment
            .roles
            .iter()
            .find(|rule| matched_roles.contains(&rule.role))
    }
}

/// The compiled rule providers an engine classifies text with
#[derive(Clone)]
pub struct Lexicons {
    /// Activity text → required strength categories
    pub strengths: Arc<dyn RuleProvider>,
    /// Role text → role kinds
    pub roles: Arc<dyn RuleProvider>,
    /// Adaptation text → neurotype tags
    pub neurotypes: Arc<dyn RuleProvider>,
}

impl Lexicons {
    /// Compile keyword classifiers from the rule tables.
    pub fn from_tables(tables: &RuleTables) -> Self {
        let roles: Vec<KeywordCategory> = tables
            .assignment
            .roles
            .iter()
            .map(|rule| KeywordCategory {
                tag: rule.role.clone(),
                keywords: rule.keywords.clone(),
                aliases: Vec::new(),
            })
            .collect();

        let neurotypes: Vec<KeywordCategory> = tables
            .inclusion
            .neurotypes
            .iter()
            .map(|rule| KeywordCategory {
                tag: rule.neurotype.as_str().to_string(),
                keywords: rule.markers.clone(),
                aliases: Vec::new(),
            })
            .collect();

        Self {
            strengths: Arc::new(KeywordClassifier::new(
                "strength keywords",
                MatchMode::Substring,
                &tables.coherence.strength_keywords,
            )),
            roles: Arc::new(KeywordClassifier::new("role keywords", MatchMode::Substring, &roles)),
            neurotypes: Arc::new(KeywordClassifier::new("neurotype markers", MatchMode::Token, &neurotypes)),
        }
    }
}

impl fmt::Debug for Lexicons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexicons")
            .field("strengths", &self.strengths.name())
            .field("roles", &self.roles.name())
            .field("neurotypes", &self.neurotypes.name())
            .finish()
    }
}
