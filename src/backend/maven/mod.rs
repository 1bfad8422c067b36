//! Maven GAV resolution for `pom.dependency` clauses.

mod effective;
mod error;
mod model;
mod resolver;

use std::collections::HashSet;
use std::path::PathBuf;

use walkdir::WalkDir;

use super::{BackendError, Capability, ScanOutput, ScannerBackend, UnresolvedInput};
use crate::{Config, Domain, Match, Query};

pub use effective::EffectiveModel;
pub use error::ResolutionError;
pub use model::{Dependency, ParentRef, RawModel};
pub use resolver::{GavMatch, GavResolver, GavTarget, MatchOrigin};

/// Answers `pom.dependency` queries by resolving every `pom.xml` under the
/// repository root. POMs that fail to resolve are reported in
/// [`ScanOutput::unresolved`] and count as not declaring the dependency.
///
/// Recognized attributes: `artifactId` (required), `groupId`, `version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MavenGavBackend;

impl MavenGavBackend {
    pub const NAME: &'static str = "maven-gav";

    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn target(query: &Query) -> Result<GavTarget, BackendError> {
        let artifact_id = query
            .attribute("artifactId")
            .ok_or_else(|| BackendError::InvalidQuery(format!("'{query}' has no artifactId")))?;
        let mut target = GavTarget::new(artifact_id);
        if let Some(g) = query.attribute("groupId") {
            target = target.with_group_id(g);
        }
        if let Some(v) = query.attribute("version") {
            target = target.with_version(v);
        }
        Ok(target)
    }

    /// Every `pom.xml` under the root, in file-name order per directory.
    fn pom_files(config: &Config) -> Result<Vec<PathBuf>, BackendError> {
        let root = config.root();
        if !root.is_dir() {
            return Err(BackendError::RootNotFound(root.to_path_buf()));
        }
        let skip = &config.maven().skip_dirs;

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !skip.iter().any(|s| e.file_name() == s.as_str())
            });
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable path");
                    continue;
                }
            };
            if entry.file_type().is_file() && entry.file_name() == "pom.xml" {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }
}

impl ScannerBackend for MavenGavBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn capabilities(&self) -> Vec<Capability> {
        vec![Capability::exact(Domain::Pom, "dependency")]
    }

    fn execute(&self, config: &Config, query: &Query) -> Result<ScanOutput, BackendError> {
        let target = Self::target(query)?;
        let resolver = GavResolver::new(config.maven().max_parent_depth);

        let mut seen = HashSet::new();
        let mut output = ScanOutput::default();
        for pom in Self::pom_files(config)? {
            match resolver.resolve(&pom, &target) {
                Ok(Some(found)) => {
                    tracing::debug!(
                        pom = %pom.display(),
                        %target,
                        origin = ?found.origin,
                        location = %found.location,
                        "dependency declared"
                    );
                    if seen.insert(found.location.clone()) {
                        output
                            .matches
                            .push(Match::new(found.coordinates(), Self::NAME, found.location));
                    }
                }
                Ok(None) => tracing::debug!(pom = %pom.display(), %target, "dependency not declared"),
                Err(err) => {
                    tracing::warn!(
                        pom = %pom.display(),
                        %target,
                        error = %err,
                        "POM resolution error, treating as not found"
                    );
                    output.unresolved.push(UnresolvedInput::new(&pom, err.to_string()));
                }
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_from_shorthand() {
        let q = Query::shorthand(Domain::Pom, Some("dependency"), "quarkus-core");
        assert_eq!(
            MavenGavBackend::target(&q).unwrap(),
            GavTarget::new("quarkus-core")
        );
    }

    #[test]
    fn target_from_pairs() {
        let q = Query::new(
            Domain::Pom,
            Some("dependency"),
            [("groupId", "g"), ("artifactId", "a"), ("version", "1.0")]
                .into_iter()
                .collect(),
        );
        assert_eq!(
            MavenGavBackend::target(&q).unwrap(),
            GavTarget::new("a").with_group_id("g").with_version("1.0")
        );
    }

    #[test]
    fn target_requires_artifact_id() {
        let q = Query::new(
            Domain::Pom,
            Some("dependency"),
            [("groupId", "g")].into_iter().collect(),
        );
        assert!(matches!(
            MavenGavBackend::target(&q),
            Err(BackendError::InvalidQuery(_))
        ));
    }

    #[test]
    fn broken_pom_is_reported_as_unresolved() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("pom.xml"), "<project><dependencies></project>").unwrap();
        let q = Query::shorthand(Domain::Pom, Some("dependency"), "a");

        let output = MavenGavBackend.execute(&Config::new(dir.path()), &q).unwrap();
        assert!(output.matches.is_empty());
        assert_eq!(output.unresolved.len(), 1);
        assert!(output.unresolved[0].path.ends_with("pom.xml"));
        assert!(output.unresolved[0].message.starts_with("malformed POM"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let config = Config::new("/definitely/not/a/repo");
        let q = Query::shorthand(Domain::Pom, Some("dependency"), "a");
        assert!(matches!(
            MavenGavBackend.execute(&config, &q),
            Err(BackendError::RootNotFound(_))
        ));
    }
}
