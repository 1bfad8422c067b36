use std::fmt;
use std::path::{Path, PathBuf};

/// A position inside a source file. Line and column are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    #[must_use]
    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Where a match was found. Backends that cannot point at a position
/// report free text instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Location {
    Source(SourceLocation),
    Text(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Source(loc) => write!(f, "{loc}"),
            Location::Text(text) => f.write_str(text),
        }
    }
}

impl From<SourceLocation> for Location {
    fn from(loc: SourceLocation) -> Self {
        Location::Source(loc)
    }
}

/// One piece of located evidence returned by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[must_use]
pub struct Match {
    match_id: String,
    backend_name: String,
    location: Location,
}

impl Match {
    pub fn new(
        match_id: impl Into<String>,
        backend_name: impl Into<String>,
        location: impl Into<Location>,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            backend_name: backend_name.into(),
            location: location.into(),
        }
    }

    /// The matched artifact, in the backend's own notation.
    #[must_use]
    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    #[must_use]
    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] at {}", self.match_id, self.backend_name, self.location)
    }
}
