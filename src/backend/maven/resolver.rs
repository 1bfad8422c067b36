use std::fmt;
use std::path::Path;

use super::ResolutionError;
use super::effective::{self, substitute_once};
use super::model::{Dependency, ModelArena, RawModel, normalize};
use crate::SourceLocation;
use crate::types::DEFAULT_MAX_PARENT_DEPTH;

/// The coordinates being looked for. Omitted parts match anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GavTarget {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
}

impl GavTarget {
    pub fn new(artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: None,
            artifact_id: artifact_id.into(),
            version: None,
        }
    }

    #[must_use]
    pub fn with_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn matches(&self, group_id: Option<&str>, artifact_id: Option<&str>, version: Option<&str>) -> bool {
        artifact_id == Some(self.artifact_id.as_str())
            && self
                .group_id
                .as_deref()
                .is_none_or(|g| group_id == Some(g))
            && self
                .version
                .as_deref()
                .is_none_or(|v| version == Some(v))
    }
}

impl fmt::Display for GavTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.group_id.as_deref().unwrap_or("*"),
            self.artifact_id
        )?;
        if let Some(v) = &self.version {
            write!(f, ":{v}")?;
        }
        Ok(())
    }
}

/// Which search stage produced a [`GavMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOrigin {
    Dependencies,
    DependencyManagement,
    RawDependencies,
    RawDependencyManagement,
    ParentDeclaration,
}

/// A located declaration matching a [`GavTarget`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GavMatch {
    pub group_id: Option<String>,
    pub artifact_id: String,
    pub version: Option<String>,
    pub location: SourceLocation,
    pub origin: MatchOrigin,
}

impl GavMatch {
    /// `groupId:artifactId[:version]` as declared.
    #[must_use]
    pub fn coordinates(&self) -> String {
        let mut out = format!(
            "{}:{}",
            self.group_id.as_deref().unwrap_or_default(),
            self.artifact_id
        );
        if let Some(v) = &self.version {
            out.push(':');
            out.push_str(v);
        }
        out
    }
}

fn search(
    deps: &[Dependency],
    target: &GavTarget,
    origin: MatchOrigin,
    resolve: impl Fn(&str) -> String,
) -> Option<GavMatch> {
    deps.iter().find_map(|dep| {
        let group_id = dep.group_id.as_deref().map(&resolve);
        let artifact_id = dep.artifact_id.as_deref().map(&resolve);
        let version = dep.version.as_deref().map(&resolve);
        if !target.matches(group_id.as_deref(), artifact_id.as_deref(), version.as_deref()) {
            return None;
        }
        Some(GavMatch {
            group_id,
            artifact_id: artifact_id.unwrap_or_default(),
            version,
            location: dep.location.clone(),
            origin,
        })
    })
}

fn search_raw(model: &RawModel, target: &GavTarget) -> Option<GavMatch> {
    let resolve = |value: &str| substitute_once(value, |name| model.property(name));
    search(&model.dependencies, target, MatchOrigin::RawDependencies, resolve)
        .or_else(|| {
            search(
                &model.dependency_management,
                target,
                MatchOrigin::RawDependencyManagement,
                resolve,
            )
        })
}

/// Finds where a POM, or the parent chain it points to, declares a
/// dependency. Filesystem only: parents are never fetched from a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GavResolver {
    max_depth: usize,
}

impl Default for GavResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARENT_DEPTH)
    }
}

impl GavResolver {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Search order: effective dependencies, effective dependency
    /// management, the same two in the raw model (own properties substituted
    /// once), then the parent: recursively through an explicit
    /// `relativePath`, otherwise against the `<parent>` coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError`] for unreadable or malformed POMs and for
    /// parent chains deeper than the configured maximum.
    pub fn resolve(&self, pom: &Path, target: &GavTarget) -> Result<Option<GavMatch>, ResolutionError> {
        let mut arena = ModelArena::default();
        self.resolve_in(&mut arena, &normalize(pom), target, 0)
    }

    fn resolve_in(
        &self,
        arena: &mut ModelArena,
        pom: &Path,
        target: &GavTarget,
        depth: usize,
    ) -> Result<Option<GavMatch>, ResolutionError> {
        if depth > self.max_depth {
            return Err(ResolutionError::ParentDepthExceeded {
                path: pom.to_path_buf(),
                max_depth: self.max_depth,
            });
        }

        let model = effective::build(arena, pom, self.max_depth)?;
        let found = search(&model.dependencies, target, MatchOrigin::Dependencies, str::to_owned)
            .or_else(|| {
                search(
                    &model.dependency_management,
                    target,
                    MatchOrigin::DependencyManagement,
                    str::to_owned,
                )
            });
        if found.is_some() {
            return Ok(found);
        }

        let idx = arena.load(pom)?;
        let raw = arena.get(idx);
        if let Some(found) = search_raw(raw, target) {
            return Ok(Some(found));
        }

        let Some(parent) = raw.parent.clone() else {
            return Ok(None);
        };
        if let Some(next) = raw.explicit_parent_path() {
            tracing::debug!(
                pom = %pom.display(),
                parent = %next.display(),
                depth,
                "descending into parent POM"
            );
            return self.resolve_in(arena, &next, target, depth + 1);
        }

        let declared = target.matches(
            parent.group_id.as_deref(),
            parent.artifact_id.as_deref(),
            parent.version.as_deref(),
        );
        Ok(declared.then(|| GavMatch {
            group_id: parent.group_id,
            artifact_id: parent.artifact_id.unwrap_or_default(),
            version: parent.version,
            location: parent.location,
            origin: MatchOrigin::ParentDeclaration,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_matching() {
        let t = GavTarget::new("a").with_group_id("g");
        assert!(t.matches(Some("g"), Some("a"), None));
        assert!(t.matches(Some("g"), Some("a"), Some("1.0")));
        assert!(!t.matches(Some("h"), Some("a"), None));
        assert!(!t.matches(None, Some("a"), None));

        let t = GavTarget::new("a").with_version("1.0");
        assert!(t.matches(Some("any"), Some("a"), Some("1.0")));
        assert!(!t.matches(Some("any"), Some("a"), Some("2.0")));
        assert!(!t.matches(Some("any"), Some("a"), None));
    }

    #[test]
    fn target_display() {
        assert_eq!(GavTarget::new("a").to_string(), "*:a");
        assert_eq!(
            GavTarget::new("a").with_group_id("g").with_version("1").to_string(),
            "g:a:1"
        );
    }

    #[test]
    fn coordinates_omit_missing_version() {
        let m = GavMatch {
            group_id: Some("g".into()),
            artifact_id: "a".into(),
            version: None,
            location: SourceLocation::new("pom.xml", 1, 1),
            origin: MatchOrigin::Dependencies,
        };
        assert_eq!(m.coordinates(), "g:a");
    }
}
