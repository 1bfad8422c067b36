use std::path::PathBuf;

use thiserror::Error;

/// Why a POM could not be searched. Distinct from "dependency not found".
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("cannot read POM '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed POM '{}': {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("parent chain of '{}' exceeds {max_depth} levels (cyclic parent?)", path.display())]
    ParentDepthExceeded { path: PathBuf, max_depth: usize },
}
