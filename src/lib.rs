//! Rule-condition matching for migration analysis.
//!
//! A rule's condition is a small boolean language over typed clauses
//! (`pom.dependency is 'quarkus-core' OR java.annotation is (name='Entity')`).
//! The [`RuleEngine`] parses it, flattens it into a query group, sends each
//! query to the [`ScannerBackend`](backend::ScannerBackend) that claims it and
//! folds the matches into a [`RuleEvaluationResult`].

pub mod backend;
mod classify;
mod evaluate;
pub mod parse;
mod registry;
mod types;

pub use backend::{
    BackendError, Capability, MavenGavBackend, ScanOutput, ScannerBackend, SymbolPattern,
    UnresolvedInput,
};
pub use classify::classify;
pub use parse::{ParseError, parse};
pub use registry::ScannerRegistry;
pub use types::{
    Attributes, ClassifiedCondition, ConditionExpression, Config, DEFAULT_MAX_PARENT_DEPTH,
    Diagnostic, Domain, Location, Match, MavenSettings, NoBackendFoundError, Query, QueryOutcome,
    QuerySet, RegistryError, Rule, RuleEngine, RuleEngineBuilder, RuleEvaluationResult, RuleIssue,
    SourceLocation, UnknownDomain, clause, default_attribute, shorthand,
};
