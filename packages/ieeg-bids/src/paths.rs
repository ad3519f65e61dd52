//! Dataset-relative path reconstruction over a flat package listing.

use crate::package::Package;
use std::collections::{HashMap, HashSet};

/// `path/name`, or just `name` at the dataset root.
pub fn join_path(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", path, name)
    }
}

/// Split a dataset-relative file path into `(folder, name)`.
///
/// Leading and trailing slashes are ignored; a bare name lives in folder `""`.
pub fn split_path(path: &str) -> (String, String) {
    let trimmed = path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((folder, name)) => (folder.trim_end_matches('/').to_string(), name.to_string()),
        None => (String::new(), trimmed.to_string()),
    }
}

/// Id lookup over one dataset's packages; build once and reuse.
pub struct PackageIndex<'a> {
    packages: &'a [Package],
    by_id: HashMap<&'a str, &'a Package>,
}

impl<'a> PackageIndex<'a> {
    pub fn new(packages: &'a [Package]) -> Self {
        let by_id = packages
            .iter()
            .filter_map(|pkg| pkg.id().map(|id| (id, pkg)))
            .collect();
        Self { packages, by_id }
    }

    pub fn packages(&self) -> &'a [Package] {
        self.packages
    }

    pub fn get(&self, id: &str) -> Option<&'a Package> {
        self.by_id.get(id).copied()
    }

    /// `/`-joined ancestor names of `package`, outermost first, excluding
    /// its own name. `""` for a root-level package.
    ///
    /// The walk stops at a missing parent id, an unknown parent, or a
    /// revisited id, so a cyclic parent graph yields a truncated path.
    pub fn resolve_path(&self, package: &Package) -> String {
        let mut parts: Vec<&str> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        if let Some(id) = package.id() {
            visited.insert(id);
        }

        let mut current = package;
        while let Some(parent_id) = current.parent_id() {
            let Some(parent) = self.get(parent_id) else {
                break;
            };
            if !visited.insert(parent_id) {
                log::warn!(
                    "Parent cycle detected at package {} while resolving '{}'",
                    parent_id,
                    package.name()
                );
                break;
            }
            if !parent.name().is_empty() {
                parts.push(parent.name());
            }
            current = parent;
        }

        parts.reverse();
        parts.join("/")
    }

    /// Folder path plus the package's own name
    pub fn full_path(&self, package: &Package) -> String {
        join_path(&self.resolve_path(package), package.name())
    }

    /// `(folder, name)` lookup over live packages.
    pub fn locations(&self) -> PackageLocations<'a> {
        let mut by_location = HashMap::new();
        for pkg in self.packages {
            if pkg.is_deleted() {
                continue;
            }
            by_location.insert((self.resolve_path(pkg), pkg.name().to_string()), pkg);
        }
        PackageLocations { by_location }
    }
}

/// Live packages keyed by `(folder, name)`. Later packages win on collision.
pub struct PackageLocations<'a> {
    by_location: HashMap<(String, String), &'a Package>,
}

impl<'a> PackageLocations<'a> {
    pub fn get(&self, folder: &str, name: &str) -> Option<&'a Package> {
        self.by_location
            .get(&(folder.to_string(), name.to_string()))
            .copied()
    }

    /// Look up a dataset-relative file path (`folder/name`).
    pub fn by_path(&self, path: &str) -> Option<&'a Package> {
        let (folder, name) = split_path(path);
        self.get(&folder, &name)
    }

    pub fn len(&self) -> usize {
        self.by_location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}

/// One-shot resolution; prefer `PackageIndex` for repeated calls.
pub fn resolve_path(package: &Package, packages: &[Package]) -> String {
    PackageIndex::new(packages).resolve_path(package)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<Package> {
        vec![
            Package::collection("A", "ieeg"),
            Package::collection("B", "sub01").with_parent("A"),
            Package::new("C", "LA01.mef").with_parent("B"),
            Package::new("D", "README.txt"),
        ]
    }

    #[test]
    fn test_resolve_nested_path() {
        let packages = tree();
        let index = PackageIndex::new(&packages);
        assert_eq!(index.resolve_path(&packages[2]), "ieeg/sub01");
        assert_eq!(index.full_path(&packages[2]), "ieeg/sub01/LA01.mef");
        assert_eq!(index.resolve_path(&packages[0]), "");
        assert_eq!(index.full_path(&packages[3]), "README.txt");
    }

    #[test]
    fn test_resolution_is_pure() {
        let packages = tree();
        assert_eq!(
            resolve_path(&packages[2], &packages),
            resolve_path(&packages[2], &packages)
        );
    }

    #[test]
    fn test_unknown_parent_is_treated_as_root() {
        let packages = vec![Package::new("X", "orphan.tsv").with_parent("missing")];
        assert_eq!(resolve_path(&packages[0], &packages), "");
    }

    #[test]
    fn test_parent_cycle_terminates() {
        let packages = vec![
            Package::collection("A", "a").with_parent("B"),
            Package::collection("B", "b").with_parent("A"),
            Package::new("C", "file.tsv").with_parent("A"),
        ];
        let index = PackageIndex::new(&packages);
        assert_eq!(index.resolve_path(&packages[2]), "b/a");
        assert_eq!(index.resolve_path(&packages[0]), "b");

        let self_loop = vec![Package::collection("S", "s").with_parent("S")];
        assert_eq!(resolve_path(&self_loop[0], &self_loop), "");
    }

    #[test]
    fn test_nameless_ancestors_are_skipped() {
        let packages = vec![
            Package::collection("A", ""),
            Package::new("B", "x.json").with_parent("A"),
        ];
        assert_eq!(resolve_path(&packages[1], &packages), "");
    }

    #[test]
    fn test_locations_skip_deleted() {
        let mut packages = tree();
        packages.push(
            Package::new("E", "old.tsv")
                .with_parent("B")
                .with_state("DELETED"),
        );
        let index = PackageIndex::new(&packages);
        let locations = index.locations();
        assert_eq!(locations.get("ieeg/sub01", "LA01.mef").and_then(Package::id), Some("C"));
        assert!(locations.get("ieeg/sub01", "old.tsv").is_none());
        assert_eq!(locations.by_path("/ieeg/sub01/LA01.mef").and_then(Package::id), Some("C"));
        assert_eq!(locations.by_path("README.txt").and_then(Package::id), Some("D"));
        assert_eq!(locations.len(), 4);
    }

    #[test]
    fn test_split_path() {
        assert_eq!(split_path("f/p.tsv"), ("f".to_string(), "p.tsv".to_string()));
        assert_eq!(split_path("p.tsv"), (String::new(), "p.tsv".to_string()));
        assert_eq!(split_path("/a/b/c.json"), ("a/b".to_string(), "c.json".to_string()));
    }
}
