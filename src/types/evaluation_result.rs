use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::{Match, NoBackendFoundError, Query};
use crate::parse::ParseError;

/// Something worth showing next to a verdict. Never changes the verdict by
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The condition text did not parse; the rule has no valid condition.
    InvalidCondition(ParseError),
    /// The condition mixes `AND` and `OR`; it was flattened to the root
    /// connective.
    FlattenedConnectives { condition: String },
    /// A clause no backend claims; it counted as zero matches.
    NoBackend(NoBackendFoundError),
    /// A backend failed on a clause; it counted as zero matches.
    BackendFailed {
        backend: String,
        query: Query,
        message: String,
    },
    /// The backend could not resolve one input while answering a clause.
    /// That input counted as "not found"; the rest of the query ran.
    ResolutionFailed {
        backend: String,
        query: Query,
        path: PathBuf,
        message: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidCondition(err) => write!(f, "{err}"),
            Diagnostic::FlattenedConnectives { condition } => write!(
                f,
                "condition mixes AND and OR and was flattened: {condition}"
            ),
            Diagnostic::NoBackend(err) => write!(f, "{err}"),
            Diagnostic::BackendFailed {
                backend,
                query,
                message,
            } => write!(f, "backend '{backend}' failed on {query}: {message}"),
            Diagnostic::ResolutionFailed {
                backend,
                query,
                path,
                message,
            } => write!(
                f,
                "backend '{backend}' could not resolve '{}' for {query}: {message}",
                path.display()
            ),
        }
    }
}

/// How one query of a rule fared.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QueryOutcome {
    query: Query,
    backend: Option<String>,
    matches: usize,
}

impl QueryOutcome {
    pub(crate) fn new(query: Query, backend: Option<String>, matches: usize) -> Self {
        Self {
            query,
            backend,
            matches,
        }
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The backend that answered, or `None` if none claimed the query.
    #[must_use]
    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    #[must_use]
    pub fn match_count(&self) -> usize {
        self.matches
    }

    #[must_use]
    pub fn matched(&self) -> bool {
        self.matches > 0
    }
}

/// Verdict and located evidence for one rule.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct RuleEvaluationResult {
    rule_id: String,
    matches: Vec<Match>,
    succeeded: bool,
    outcomes: Vec<QueryOutcome>,
    #[cfg_attr(feature = "serde", serde(skip))]
    diagnostics: Vec<Diagnostic>,
    #[cfg_attr(feature = "serde", serde(skip))]
    duration: Duration,
}

impl RuleEvaluationResult {
    pub(crate) fn new(
        rule_id: String,
        matches: Vec<Match>,
        succeeded: bool,
        outcomes: Vec<QueryOutcome>,
        diagnostics: Vec<Diagnostic>,
        duration: Duration,
    ) -> Self {
        Self {
            rule_id,
            matches,
            succeeded,
            outcomes,
            diagnostics,
            duration,
        }
    }

    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// All matches, in query dispatch order. May be non-empty for a rule that
    /// did not succeed (a partially matched `AND`).
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    /// Per-query outcomes, in dispatch order.
    #[must_use]
    pub fn outcomes(&self) -> &[QueryOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Wall-clock duration of the evaluation.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for RuleEvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rule {}: {}, {} match(es)",
            self.rule_id,
            if self.succeeded { "matched" } else { "not matched" },
            self.matches.len()
        )?;
        if !self.diagnostics.is_empty() {
            write!(f, ", {} diagnostic(s)", self.diagnostics.len())?;
        }
        write!(f, ", duration: {:?}", self.duration)
    }
}
