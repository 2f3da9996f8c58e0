//! Ordered suite of aspect evaluators

use crate::rules::{Lexicons, RuleTables};
use crate::validation::assignment::AssignmentEvaluator;
use crate::validation::coherence::CoherenceEvaluator;
use crate::validation::inclusion::InclusionEvaluator;
use crate::validation::structure::StructureEvaluator;
use crate::validation::traits::{AspectEvaluator, ValidationInput, ValidationResult};
use crate::validation::workload::WorkloadEvaluator;
use log::debug;
use std::sync::Arc;

/// A suite of evaluators run in insertion order.
/// Evaluators are independent; one never sees another's result.
#[derive(Clone)]
pub struct AspectSuite {
    /// The evaluators, shared so they can be handed to worker threads
    evaluators: Vec<Arc<dyn AspectEvaluator>>,
}

impl AspectSuite {
    /// Create a new empty suite
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
        }
    }

    /// The five standard evaluators, in report order
    pub fn standard(rules: Arc<RuleTables>, lexicons: Lexicons) -> Self {
        Self::new()
            .with_evaluator(StructureEvaluator::new(rules.clone()))
            .with_evaluator(CoherenceEvaluator::new(rules.clone(), lexicons.clone()))
            .with_evaluator(AssignmentEvaluator::new(rules.clone(), lexicons.clone()))
            .with_evaluator(InclusionEvaluator::new(rules.clone(), lexicons))
            .with_evaluator(WorkloadEvaluator::new(rules))
    }

    /// Add an evaluator to the suite (builder pattern)
    pub fn with_evaluator(mut self, evaluator: impl AspectEvaluator + 'static) -> Self {
        self.evaluators.push(Arc::new(evaluator));
        self
    }

    /// Add a shared evaluator to the suite
    pub fn add_shared(mut self, evaluator: Arc<dyn AspectEvaluator>) -> Self {
        self.evaluators.push(evaluator);
        self
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    pub fn evaluators(&self) -> &[Arc<dyn AspectEvaluator>] {
        &self.evaluators
    }

    /// Get descriptions of all evaluators in the suite
    pub fn descriptions(&self) -> Vec<&str> {
        self.evaluators.iter().map(|e| e.description()).collect()
    }

    /// Run every evaluator on the same input.
    pub fn run(&self, input: &ValidationInput<'_>) -> Vec<ValidationResult> {
        self.evaluators
            .iter()
            .map(|evaluator| {
                let result = evaluator.evaluate(input);
                debug!("{} scored {:.3} (valid: {})", result.aspect, result.score, result.valid);
                result
            })
            .collect()
    }
}

impl Default for AspectSuite {
    fn default() -> Self {
        Self::new()
    }
}
