use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use roxmltree::{Document, Node};

use super::ResolutionError;
use crate::SourceLocation;

/// A `<dependency>` entry exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub dep_type: Option<String>,
    pub classifier: Option<String>,
    pub scope: Option<String>,
    pub location: SourceLocation,
}

impl Dependency {
    /// Maven's identity of a dependency entry when merging inherited lists.
    #[must_use]
    pub fn management_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.group_id.as_deref().unwrap_or_default(),
            self.artifact_id.as_deref().unwrap_or_default(),
            self.dep_type.as_deref().unwrap_or("jar"),
            self.classifier.as_deref().unwrap_or_default(),
        )
    }
}

/// The `<parent>` element of a POM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    /// `Some("")` for an explicit empty `<relativePath/>`.
    pub relative_path: Option<String>,
    pub location: SourceLocation,
}

/// A POM as literally written in one file, before inheritance or
/// interpolation. Never modified once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawModel {
    pub path: PathBuf,
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: Vec<(String, String)>,
    pub dependencies: Vec<Dependency>,
    pub dependency_management: Vec<Dependency>,
}

fn child<'a, 'i>(node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

fn children<'a, 'i: 'a>(node: Node<'a, 'i>, name: &'a str) -> impl Iterator<Item = Node<'a, 'i>> {
    node.children()
        .filter(move |c| c.is_element() && c.tag_name().name() == name)
}

fn element_text(node: Node<'_, '_>) -> String {
    node.text().map(str::trim).unwrap_or_default().to_owned()
}

fn child_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .map(element_text)
        .filter(|t| !t.is_empty())
}

impl RawModel {
    /// # Errors
    ///
    /// Returns [`ResolutionError::Unreadable`] or [`ResolutionError::Malformed`].
    pub fn load(path: &Path) -> Result<Self, ResolutionError> {
        let source = fs::read_to_string(path).map_err(|source| ResolutionError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source, path)
    }

    /// Parse POM text; `path` is recorded in every source location.
    ///
    /// # Errors
    ///
    /// Returns [`ResolutionError::Malformed`] for invalid XML or a root
    /// element other than `<project>`.
    pub fn parse(source: &str, path: &Path) -> Result<Self, ResolutionError> {
        let malformed = |message: String| ResolutionError::Malformed {
            path: path.to_path_buf(),
            message,
        };

        let doc = Document::parse(source).map_err(|e| malformed(e.to_string()))?;
        let project = doc.root_element();
        if project.tag_name().name() != "project" {
            return Err(malformed(format!(
                "root element is <{}>, expected <project>",
                project.tag_name().name()
            )));
        }

        let locate = |node: Node<'_, '_>| {
            let pos = doc.text_pos_at(node.range().start);
            SourceLocation::new(path, pos.row, pos.col)
        };

        let dependency = |node: Node<'_, '_>| Dependency {
            group_id: child_text(node, "groupId"),
            artifact_id: child_text(node, "artifactId"),
            version: child_text(node, "version"),
            dep_type: child_text(node, "type"),
            classifier: child_text(node, "classifier"),
            scope: child_text(node, "scope"),
            location: locate(node),
        };

        let dependencies = child(project, "dependencies")
            .map(|deps| children(deps, "dependency").map(&dependency).collect())
            .unwrap_or_default();

        let dependency_management = child(project, "dependencyManagement")
            .and_then(|dm| child(dm, "dependencies"))
            .map(|deps| children(deps, "dependency").map(&dependency).collect())
            .unwrap_or_default();

        let properties = child(project, "properties")
            .map(|props| {
                props
                    .children()
                    .filter(Node::is_element)
                    .map(|p| (p.tag_name().name().to_owned(), element_text(p)))
                    .collect()
            })
            .unwrap_or_default();

        let parent = child(project, "parent").map(|p| ParentRef {
            group_id: child_text(p, "groupId"),
            artifact_id: child_text(p, "artifactId"),
            version: child_text(p, "version"),
            relative_path: child(p, "relativePath").map(element_text),
            location: locate(p),
        });

        Ok(Self {
            path: path.to_path_buf(),
            group_id: child_text(project, "groupId"),
            artifact_id: child_text(project, "artifactId"),
            version: child_text(project, "version"),
            parent,
            properties,
            dependencies,
            dependency_management,
        })
    }

    /// Own groupId, else the one inherited from `<parent>`.
    #[must_use]
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.group_id.as_deref()))
    }

    /// Own version, else the one inherited from `<parent>`.
    #[must_use]
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().and_then(|p| p.version.as_deref()))
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    fn parent_file(&self, relative: &str) -> PathBuf {
        let candidate = normalize(&self.directory().join(relative));
        if candidate.is_dir() {
            candidate.join("pom.xml")
        } else {
            candidate
        }
    }

    /// Where inheritance looks for the parent POM: the explicit
    /// `relativePath`, else Maven's default `../pom.xml`. `None` when there
    /// is no parent or lookup is disabled with an empty `<relativePath/>`.
    #[must_use]
    pub fn parent_candidate(&self) -> Option<PathBuf> {
        let parent = self.parent.as_ref()?;
        match parent.relative_path.as_deref() {
            Some("") => None,
            Some(rel) => Some(self.parent_file(rel)),
            None => Some(self.parent_file("../pom.xml")),
        }
    }

    /// The parent file named by a non-empty explicit `relativePath`.
    #[must_use]
    pub fn explicit_parent_path(&self) -> Option<PathBuf> {
        let rel = self.parent.as_ref()?.relative_path.as_deref()?;
        (!rel.is_empty()).then(|| self.parent_file(rel))
    }

    /// Whether this file is the project a `<parent>` element refers to.
    #[must_use]
    pub fn is_referenced_by(&self, parent: &ParentRef) -> bool {
        fn agrees(own: Option<&str>, wanted: Option<&str>) -> bool {
            match (own, wanted) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
        }
        self.artifact_id.is_some()
            && self.artifact_id == parent.artifact_id
            && agrees(self.effective_group_id(), parent.group_id.as_deref())
            && agrees(self.effective_version(), parent.version.as_deref())
    }
}

/// Lexically remove `.` and `..` components.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Raw models loaded during one resolution, keyed by canonical path.
#[derive(Debug, Default)]
pub(crate) struct ModelArena {
    models: Vec<RawModel>,
    index: HashMap<PathBuf, usize>,
}

impl ModelArena {
    pub(crate) fn load(&mut self, path: &Path) -> Result<usize, ResolutionError> {
        let key = fs::canonicalize(path).map_err(|source| ResolutionError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(&idx) = self.index.get(&key) {
            return Ok(idx);
        }
        let model = RawModel::load(path)?;
        let idx = self.models.len();
        self.models.push(model);
        self.index.insert(key, idx);
        Ok(idx)
    }

    pub(crate) fn get(&self, idx: usize) -> &RawModel {
        &self.models[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.acme</groupId>
    <artifactId>acme-parent</artifactId>
    <version>2.0</version>
    <relativePath/>
  </parent>
  <artifactId>app</artifactId>
  <properties>
    <quarkus.version>3.2.0</quarkus.version>
  </properties>
  <dependencies>
    <dependency>
      <groupId>io.quarkus</groupId>
      <artifactId>quarkus-core</artifactId>
      <version>${quarkus.version}</version>
    </dependency>
  </dependencies>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>io.quarkus</groupId>
        <artifactId>quarkus-bom</artifactId>
        <version>3.2.0</version>
        <type>pom</type>
        <scope>import</scope>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>
"#;

    #[test]
    fn parses_coordinates_and_sections() {
        let model = RawModel::parse(POM, Path::new("app/pom.xml")).unwrap();
        assert_eq!(model.group_id, None);
        assert_eq!(model.effective_group_id(), Some("org.acme"));
        assert_eq!(model.effective_version(), Some("2.0"));
        assert_eq!(model.artifact_id.as_deref(), Some("app"));
        assert_eq!(model.property("quarkus.version"), Some("3.2.0"));
        assert_eq!(model.dependencies.len(), 1);
        assert_eq!(
            model.dependencies[0].version.as_deref(),
            Some("${quarkus.version}")
        );
        assert_eq!(model.dependency_management.len(), 1);
        assert_eq!(
            model.dependency_management[0].management_key(),
            "io.quarkus:quarkus-bom:pom:"
        );
    }

    #[test]
    fn records_element_positions() {
        let model = RawModel::parse(POM, Path::new("app/pom.xml")).unwrap();
        assert_eq!(
            model.dependencies[0].location,
            SourceLocation::new("app/pom.xml", 15, 5)
        );
        let parent = model.parent.as_ref().unwrap();
        assert_eq!(parent.location, SourceLocation::new("app/pom.xml", 4, 3));
    }

    #[test]
    fn empty_relative_path_disables_lookup() {
        let model = RawModel::parse(POM, Path::new("app/pom.xml")).unwrap();
        assert_eq!(model.parent.as_ref().unwrap().relative_path.as_deref(), Some(""));
        assert_eq!(model.parent_candidate(), None);
        assert_eq!(model.explicit_parent_path(), None);
    }

    #[test]
    fn default_parent_candidate() {
        let src = "<project><parent><groupId>g</groupId><artifactId>p</artifactId>\
                   <version>1</version></parent><artifactId>c</artifactId></project>";
        let model = RawModel::parse(src, Path::new("repo/child/pom.xml")).unwrap();
        assert_eq!(model.parent_candidate(), Some(PathBuf::from("repo/pom.xml")));
        assert_eq!(model.explicit_parent_path(), None);
    }

    #[test]
    fn rejects_non_project_root() {
        let err = RawModel::parse("<settings/>", Path::new("pom.xml")).unwrap_err();
        assert!(matches!(err, ResolutionError::Malformed { .. }));
    }

    #[test]
    fn rejects_invalid_xml() {
        let err = RawModel::parse("<project><dependencies></project>", Path::new("pom.xml"))
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Malformed { .. }));
    }

    #[test]
    fn normalize_removes_dot_segments() {
        assert_eq!(normalize(Path::new("a/b/../c/./pom.xml")), PathBuf::from("a/c/pom.xml"));
        assert_eq!(normalize(Path::new("../x/pom.xml")), PathBuf::from("../x/pom.xml"));
        assert_eq!(normalize(Path::new("a/../../pom.xml")), PathBuf::from("../pom.xml"));
    }

    #[test]
    fn matches_parent_reference() {
        let parent_src = "<project><groupId>g</groupId><artifactId>p</artifactId>\
                          <version>1</version></project>";
        let parent = RawModel::parse(parent_src, Path::new("pom.xml")).unwrap();
        let child_src = "<project><parent><groupId>g</groupId><artifactId>p</artifactId>\
                         <version>1</version></parent><artifactId>c</artifactId></project>";
        let child = RawModel::parse(child_src, Path::new("c/pom.xml")).unwrap();
        let reference = child.parent.as_ref().unwrap();
        assert!(parent.is_referenced_by(reference));
        assert!(!child.is_referenced_by(reference));
    }
}
