//! Analyzer backends and the contract they implement.
//!
//! Only the Maven GAV backend lives in this crate. Java-symbol,
//! structural-rewrite and text backends implement [`ScannerBackend`]
//! out of tree and own whatever processes or connections they need.

pub mod maven;

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{Config, Domain, Match, Query};

pub use maven::MavenGavBackend;

/// Which symbols of a domain a capability covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolPattern {
    /// One symbol, compared ASCII case-insensitively.
    Exact(String),
    /// Every symbol of the domain, including clauses without one.
    Any,
}

/// A `(domain, symbol)` shape a backend answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Capability {
    pub domain: Domain,
    pub symbol: SymbolPattern,
}

impl Capability {
    pub fn exact(domain: Domain, symbol: impl Into<String>) -> Self {
        Self {
            domain,
            symbol: SymbolPattern::Exact(symbol.into()),
        }
    }

    #[must_use]
    pub fn any(domain: Domain) -> Self {
        Self {
            domain,
            symbol: SymbolPattern::Any,
        }
    }

    /// Depends on the query's domain and symbol only, never on attributes.
    #[must_use]
    pub fn covers(&self, query: &Query) -> bool {
        if self.domain != query.domain() {
            return false;
        }
        match (&self.symbol, query.symbol()) {
            (SymbolPattern::Any, _) => true,
            (SymbolPattern::Exact(s), Some(q)) => s.eq_ignore_ascii_case(q),
            (SymbolPattern::Exact(_), None) => false,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.symbol {
            SymbolPattern::Exact(s) => write!(f, "{}.{s}", self.domain),
            SymbolPattern::Any => write!(f, "{}.*", self.domain),
        }
    }
}

/// Failures a backend reports for a single query.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("repository root '{}' is not a directory", .0.display())]
    RootNotFound(PathBuf),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    External(String),
}

/// An input file a backend skipped because it could not be resolved. The
/// query still runs; the file counts as "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedInput {
    pub path: PathBuf,
    pub message: String,
}

impl UnresolvedInput {
    pub fn new(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}

/// What one query produced.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub matches: Vec<Match>,
    /// Inputs skipped along the way. Kept apart from `matches` so a broken
    /// file is never mistaken for a genuine absence.
    pub unresolved: Vec<UnresolvedInput>,
}

impl ScanOutput {
    #[must_use]
    pub fn new(matches: Vec<Match>) -> Self {
        Self {
            matches,
            unresolved: Vec::new(),
        }
    }
}

impl From<Vec<Match>> for ScanOutput {
    fn from(matches: Vec<Match>) -> Self {
        Self::new(matches)
    }
}

/// An analyzer that answers one or more query shapes.
///
/// Implementations are registered once and shared across threads, so they
/// must be `Send + Sync`; any mutable resource they hold is theirs to guard.
pub trait ScannerBackend: Send + Sync {
    /// Stable name used in matches, diagnostics and logs.
    fn name(&self) -> &str;

    /// The shapes this backend claims. Must not change after registration.
    /// Routing and `supports` both derive from this list.
    fn capabilities(&self) -> Vec<Capability>;

    /// Run one query against the repository described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the query cannot be answered at all.
    /// An absent artifact is an empty [`ScanOutput`], not an error.
    fn execute(&self, config: &Config, query: &Query) -> Result<ScanOutput, BackendError>;
}

impl dyn ScannerBackend + '_ {
    /// Whether one of the capabilities covers `query`. Not overridable, so
    /// it always agrees with how the registry routes.
    #[must_use]
    pub fn supports(&self, query: &Query) -> bool {
        self.capabilities().iter().any(|c| c.covers(query))
    }
}

impl fmt::Debug for dyn ScannerBackend + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScannerBackend")
            .field("name", &self.name())
            .finish()
    }
}
