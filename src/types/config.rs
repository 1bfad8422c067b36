use std::path::{Path, PathBuf};

/// Parent chains deeper than this are treated as cyclic.
pub const DEFAULT_MAX_PARENT_DEPTH: usize = 32;

/// Settings for the Maven GAV backend.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MavenSettings {
    pub max_parent_depth: usize,
    /// Directory names never descended into when looking for `pom.xml`.
    pub skip_dirs: Vec<String>,
}

impl Default for MavenSettings {
    fn default() -> Self {
        Self {
            max_parent_depth: DEFAULT_MAX_PARENT_DEPTH,
            skip_dirs: vec!["target".into(), ".git".into(), "node_modules".into()],
        }
    }
}

/// Per-run configuration handed to every backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    root: PathBuf,
    #[cfg_attr(feature = "serde", serde(default))]
    maven: MavenSettings,
}

impl Config {
    /// Configuration for analyzing the repository rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            maven: MavenSettings::default(),
        }
    }

    #[must_use]
    pub fn with_max_parent_depth(mut self, depth: usize) -> Self {
        self.maven.max_parent_depth = depth;
        self
    }

    #[must_use]
    pub fn with_skip_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.maven.skip_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn maven(&self) -> &MavenSettings {
        &self.maven
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("/repo");
        assert_eq!(config.root(), Path::new("/repo"));
        assert_eq!(config.maven().max_parent_depth, 32);
        assert!(config.maven().skip_dirs.iter().any(|d| d == "target"));
    }

    #[test]
    fn builder_overrides() {
        let config = Config::new("/repo")
            .with_max_parent_depth(4)
            .with_skip_dirs(["build"]);
        assert_eq!(config.maven().max_parent_depth, 4);
        assert_eq!(config.maven().skip_dirs, vec!["build".to_owned()]);
    }
}
