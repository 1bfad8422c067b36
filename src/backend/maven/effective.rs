use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::ResolutionError;
use super::model::{Dependency, ModelArena};

/// Upper bound on nested `${...}` expansion rounds.
const MAX_INTERPOLATION_PASSES: usize = 16;

/// A POM after filesystem-local inheritance and interpolation.
///
/// Every dependency keeps the location of the file it was written in, so an
/// inherited entry points into the parent POM.
#[derive(Debug, Clone)]
pub struct EffectiveModel {
    pub path: PathBuf,
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<Dependency>,
    pub dependency_management: Vec<Dependency>,
}

/// Replace each `${name}` once using `lookup`. Unknown names and an
/// unterminated `${` are left as written.
pub(crate) fn substitute_once<'p>(value: &str, lookup: impl Fn(&str) -> Option<&'p str>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match lookup(name) {
            Some(v) => out.push_str(v),
            None => {
                out.push_str("${");
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn interpolate(value: &str, properties: &HashMap<String, String>) -> String {
    let mut current = value.to_owned();
    for _ in 0..MAX_INTERPOLATION_PASSES {
        if !current.contains("${") {
            break;
        }
        let next = substitute_once(&current, |name| properties.get(name).map(String::as_str));
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Child entries first, then inherited entries the child does not override.
fn merge(own: &[Dependency], inherited: Vec<Dependency>) -> Vec<Dependency> {
    let keys: HashSet<String> = own.iter().map(Dependency::management_key).collect();
    let mut merged = own.to_vec();
    merged.extend(
        inherited
            .into_iter()
            .filter(|d| !keys.contains(&d.management_key())),
    );
    merged
}

/// Arena indices from `pom` up to the furthest ancestor found on disk.
fn lineage(arena: &mut ModelArena, pom: &Path, max_depth: usize) -> Result<Vec<usize>, ResolutionError> {
    let mut chain = vec![arena.load(pom)?];

    while let Some(&current) = chain.last() {
        let model = arena.get(current);
        let (Some(candidate), Some(reference)) = (model.parent_candidate(), model.parent.clone())
        else {
            break;
        };
        if !candidate.is_file() {
            break;
        }
        if chain.len() > max_depth {
            return Err(ResolutionError::ParentDepthExceeded {
                path: pom.to_path_buf(),
                max_depth,
            });
        }

        let parent = arena.load(&candidate)?;
        if !arena.get(parent).is_referenced_by(&reference) {
            tracing::debug!(
                pom = %arena.get(current).path.display(),
                candidate = %candidate.display(),
                "parent candidate does not match <parent>; inheritance stops"
            );
            break;
        }
        chain.push(parent);
    }

    Ok(chain)
}

/// Build the effective model of `pom`.
///
/// # Errors
///
/// Returns [`ResolutionError`] if `pom` or a located parent cannot be read
/// or parsed, or the parent chain is deeper than `max_depth`.
pub(crate) fn build(
    arena: &mut ModelArena,
    pom: &Path,
    max_depth: usize,
) -> Result<EffectiveModel, ResolutionError> {
    let chain = lineage(arena, pom, max_depth)?;

    let mut properties: HashMap<String, String> = HashMap::new();
    let mut dependencies = Vec::new();
    let mut dependency_management = Vec::new();
    for &idx in chain.iter().rev() {
        let model = arena.get(idx);
        for (k, v) in &model.properties {
            properties.insert(k.clone(), v.clone());
        }
        dependencies = merge(&model.dependencies, dependencies);
        dependency_management = merge(&model.dependency_management, dependency_management);
    }

    let model = arena.get(chain[0]);
    let group_id = model.effective_group_id().map(str::to_owned);
    let version = model.effective_version().map(str::to_owned);
    let artifact_id = model.artifact_id.clone();

    let mut builtins: Vec<(&str, Option<String>)> = vec![
        ("groupId", group_id.clone()),
        ("artifactId", artifact_id.clone()),
        ("version", version.clone()),
        (
            "parent.groupId",
            model.parent.as_ref().and_then(|p| p.group_id.clone()),
        ),
        (
            "parent.version",
            model.parent.as_ref().and_then(|p| p.version.clone()),
        ),
    ];
    let basedir = model
        .path
        .parent()
        .map(|dir| dir.display().to_string());
    builtins.push(("basedir", basedir.clone()));
    if let Some(dir) = basedir {
        properties.insert("basedir".to_owned(), dir);
    }
    for (name, value) in builtins {
        if let Some(value) = value {
            properties.insert(format!("project.{name}"), value.clone());
            properties.insert(format!("pom.{name}"), value);
        }
    }

    let resolve = |dep: &Dependency| Dependency {
        group_id: dep.group_id.as_deref().map(|v| interpolate(v, &properties)),
        artifact_id: dep.artifact_id.as_deref().map(|v| interpolate(v, &properties)),
        version: dep.version.as_deref().map(|v| interpolate(v, &properties)),
        ..dep.clone()
    };
    let dependency_management: Vec<Dependency> = dependency_management.iter().map(resolve).collect();
    let dependencies = dependencies
        .iter()
        .map(resolve)
        .map(|mut dep| {
            if dep.version.is_none() {
                dep.version = dependency_management
                    .iter()
                    .find(|m| m.group_id == dep.group_id && m.artifact_id == dep.artifact_id)
                    .and_then(|m| m.version.clone());
            }
            dep
        })
        .collect();

    Ok(EffectiveModel {
        path: model.path.clone(),
        group_id,
        artifact_id,
        version,
        dependencies,
        dependency_management,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn substitute_once_is_single_pass() {
        let p = props(&[("a", "${b}"), ("b", "1.0")]);
        let lookup = |n: &str| p.get(n).map(String::as_str);
        assert_eq!(substitute_once("v${a}", lookup), "v${b}");
        assert_eq!(substitute_once("${b}-${missing}", lookup), "1.0-${missing}");
        assert_eq!(substitute_once("${unterminated", lookup), "${unterminated");
    }

    #[test]
    fn interpolate_resolves_nested_references() {
        let p = props(&[("a", "${b}"), ("b", "${c}"), ("c", "2.1")]);
        assert_eq!(interpolate("${a}", &p), "2.1");
    }

    #[test]
    fn interpolate_terminates_on_cycles() {
        let p = props(&[("a", "${b}"), ("b", "${a}")]);
        let out = interpolate("${a}", &p);
        assert!(out == "${a}" || out == "${b}", "{out}");
    }

    #[test]
    fn merge_prefers_child_entries() {
        use crate::SourceLocation;
        let dep = |a: &str, v: &str, line: u32| Dependency {
            group_id: Some("g".into()),
            artifact_id: Some(a.into()),
            version: Some(v.into()),
            dep_type: None,
            classifier: None,
            scope: None,
            location: SourceLocation::new("pom.xml", line, 1),
        };
        let merged = merge(&[dep("x", "2", 1)], vec![dep("x", "1", 9), dep("y", "1", 10)]);
        let versions: Vec<_> = merged
            .iter()
            .map(|d| (d.artifact_id.as_deref(), d.version.as_deref()))
            .collect();
        assert_eq!(versions, vec![(Some("x"), Some("2")), (Some("y"), Some("1"))]);
    }
}
