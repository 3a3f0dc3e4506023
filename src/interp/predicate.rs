//! Semantic-predicate evaluation as an injected capability.
//!
//! The engine never executes target-language action code itself; a
//! host that can evaluate predicates plugs in here. Hosts without one
//! use [`InertEvaluator`], which treats every predicate as passing.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// Where a predicate fired
#[derive(Debug, Clone, Default)]
pub struct PredicateContext {
    /// Rule under interpretation when the predicate gate was reached
    pub rule_name: Option<SmolStr>,
    /// Input offset (characters for lexing, tokens for parsing)
    pub offset: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PredicateError {
    #[error("predicate '{predicate}' could not be evaluated: {message}")]
    Failed { predicate: String, message: String },
}

/// Host hook for deciding predicate gates during interpretation
pub trait PredicateEvaluator {
    fn evaluate(&self, predicate: &str, ctx: &PredicateContext) -> Result<bool, PredicateError>;
}

/// Every predicate passes; the default when no host hook exists
#[derive(Debug, Clone, Copy, Default)]
pub struct InertEvaluator;

impl PredicateEvaluator for InertEvaluator {
    fn evaluate(&self, _predicate: &str, _ctx: &PredicateContext) -> Result<bool, PredicateError> {
        Ok(true)
    }
}

/// Table-driven evaluator for tests and simple hosts: predicate text
/// maps directly to a boolean.
#[derive(Debug, Clone, Default)]
pub struct MapEvaluator {
    values: FxHashMap<String, bool>,
}

impl MapEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, predicate: impl Into<String>, value: bool) {
        self.values.insert(predicate.into(), value);
    }
}

impl PredicateEvaluator for MapEvaluator {
    fn evaluate(&self, predicate: &str, _ctx: &PredicateContext) -> Result<bool, PredicateError> {
        self.values
            .get(predicate)
            .copied()
            .ok_or_else(|| PredicateError::Failed {
                predicate: predicate.to_string(),
                message: "no value registered".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_inert_evaluator_passes_everything() {
        let ctx = PredicateContext::default();
        assert!(InertEvaluator.evaluate("self.version >= 12", &ctx).unwrap());
    }

    #[test]
    fn test_map_evaluator() {
        let mut eval = MapEvaluator::new();
        eval.set("inTemplate", false);
        let ctx = PredicateContext::default();
        assert!(!eval.evaluate("inTemplate", &ctx).unwrap());
        assert!(eval.evaluate("unknown", &ctx).is_err());
    }
}
