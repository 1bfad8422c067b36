mod classified;
mod config;
mod domain;
mod engine;
mod error;
mod evaluation_result;
mod expr;
mod matches;
mod query;
mod rule;

pub use classified::{ClassifiedCondition, QuerySet};
pub use config::{Config, DEFAULT_MAX_PARENT_DEPTH, MavenSettings};
pub use domain::{Domain, UnknownDomain};
pub use engine::{RuleEngine, RuleEngineBuilder, RuleIssue};
pub use error::{NoBackendFoundError, RegistryError};
pub use evaluation_result::{Diagnostic, QueryOutcome, RuleEvaluationResult};
pub use expr::{ConditionExpression, clause, shorthand};
pub use matches::{Location, Match, SourceLocation};
pub use query::{Attributes, Query, default_attribute};
pub use rule::Rule;
