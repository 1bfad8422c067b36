use std::fmt;

use super::{Config, Diagnostic, RegistryError, Rule, RuleEvaluationResult};
use crate::backend::ScannerBackend;
use crate::registry::ScannerRegistry;

/// Builder for a [`RuleEngine`].
///
/// # Example
///
/// ```no_run
/// use ruleprobe::{Config, MavenGavBackend, Rule, RuleEngine};
///
/// let engine = RuleEngine::builder()
///     .backend(MavenGavBackend::new())
///     .build()
///     .unwrap();
///
/// let rule = Rule::new("quarkus", "pom.dependency is 'quarkus-core'");
/// let result = engine.evaluate(&rule, &Config::new("."));
/// println!("{result}");
/// ```
#[derive(Debug, Default)]
pub struct RuleEngineBuilder {
    backends: Vec<Box<dyn ScannerBackend>>,
}

impl RuleEngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn backend(mut self, backend: impl ScannerBackend + 'static) -> Self {
        self.backends.push(Box::new(backend));
        self
    }

    #[must_use]
    pub fn boxed_backend(mut self, backend: Box<dyn ScannerBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// # Errors
    ///
    /// Returns [`RegistryError`] if two backends claim the same query shape.
    pub fn build(self) -> Result<RuleEngine, RegistryError> {
        ScannerRegistry::new(self.backends).map(RuleEngine::new)
    }
}

/// A load-time problem with one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleIssue {
    pub rule_id: String,
    pub diagnostic: Diagnostic,
}

impl fmt::Display for RuleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {}: {}", self.rule_id, self.diagnostic)
    }
}

/// Evaluates rules against a repository through a fixed set of backends.
/// Immutable and thread-safe; designed to live behind `Arc`.
#[derive(Debug)]
pub struct RuleEngine {
    registry: ScannerRegistry,
}

impl RuleEngine {
    #[must_use]
    pub fn new(registry: ScannerRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn builder() -> RuleEngineBuilder {
        RuleEngineBuilder::new()
    }

    #[must_use]
    pub fn registry(&self) -> &ScannerRegistry {
        &self.registry
    }

    /// Parse, classify, dispatch and aggregate one rule.
    pub fn evaluate(&self, rule: &Rule, config: &Config) -> RuleEvaluationResult {
        crate::evaluate::evaluate_rule(&self.registry, rule, config)
    }

    /// Evaluate a batch in order. A failing rule never affects the others.
    #[must_use]
    pub fn evaluate_all(&self, rules: &[Rule], config: &Config) -> Vec<RuleEvaluationResult> {
        rules.iter().map(|r| self.evaluate(r, config)).collect()
    }

    /// Check a batch of rules without running any backend: invalid
    /// conditions, clauses no backend claims, and mixed connectives.
    #[must_use]
    pub fn check_rules(&self, rules: &[Rule]) -> Vec<RuleIssue> {
        crate::evaluate::check_rules(&self.registry, rules)
    }
}
