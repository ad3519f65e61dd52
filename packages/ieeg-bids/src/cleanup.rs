//! Dataset cleanup: delete files by glob pattern or by explicit path.

use crate::api::PackageApi;
use crate::error::Result;
use crate::package::Package;
use crate::paths::PackageIndex;
use crate::reconcile::fetch_packages;
use glob::Pattern;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteSummary {
    pub deleted: usize,
    /// Delete calls that failed, plus (for path deletes) paths not found
    pub failed: usize,
    /// Full paths selected for deletion
    pub matched: Vec<String>,
    pub not_found: Vec<String>,
}

impl DeleteSummary {
    /// `(deleted, failed)`
    pub fn counts(&self) -> (usize, usize) {
        (self.deleted, self.failed)
    }
}

fn delete_one<A: PackageApi + ?Sized>(api: &mut A, pkg: &Package, path: &str) -> bool {
    let Some(node_id) = pkg.node_id() else {
        log::error!("  Failed to delete package {}: missing node id", path);
        return false;
    };
    match api.delete_package(node_id) {
        Ok(()) => {
            log::info!("  Deleted package: {} ({})", path, node_id);
            true
        }
        Err(e) => {
            log::error!("  Failed to delete package {}: {}", path, e);
            false
        }
    }
}

/// Packages whose full path or bare name matches `pattern`. Folders are skipped.
pub fn match_pattern<'a>(packages: &'a [Package], pattern: &Pattern) -> Vec<(String, &'a Package)> {
    let index = PackageIndex::new(packages);
    packages
        .iter()
        .filter(|pkg| !pkg.is_collection())
        .filter_map(|pkg| {
            let full_path = index.full_path(pkg);
            (pattern.matches(&full_path) || pattern.matches(pkg.name())).then_some((full_path, pkg))
        })
        .collect()
}

/// Delete every file matching a glob such as `*.tsv` or `sub-*/*_channels.tsv`.
///
/// An unknown dataset or failed listing deletes nothing.
pub fn delete_by_pattern<A: PackageApi + ?Sized>(
    api: &mut A,
    dataset_name: &str,
    pattern: &str,
) -> Result<DeleteSummary> {
    let pattern = Pattern::new(pattern)?;
    log::info!("Deleting by pattern in dataset {}: {}", dataset_name, pattern);

    let packages = match fetch_packages(api, dataset_name) {
        Ok(packages) => packages,
        Err(e) => {
            log::error!("{}", e);
            return Ok(DeleteSummary::default());
        }
    };
    log::info!("  Found {} packages", packages.len());

    let matches = match_pattern(&packages, &pattern);
    if matches.is_empty() {
        log::info!("  No files match pattern: {}", pattern);
        return Ok(DeleteSummary::default());
    }

    let mut summary = DeleteSummary::default();
    for (path, pkg) in matches {
        if delete_one(api, pkg, &path) {
            summary.deleted += 1;
        } else {
            summary.failed += 1;
        }
        summary.matched.push(path);
    }

    log::info!("  Deleted: {}, Failed: {}", summary.deleted, summary.failed);
    Ok(summary)
}

/// Delete files by dataset-relative path; a leading `/` is ignored.
///
/// An unknown dataset or failed listing counts every path as not found.
pub fn delete_by_path<A: PackageApi + ?Sized>(
    api: &mut A,
    dataset_name: &str,
    file_paths: &[String],
) -> DeleteSummary {
    log::info!("Deleting by path in dataset: {}", dataset_name);

    let mut summary = DeleteSummary::default();
    let packages = match fetch_packages(api, dataset_name) {
        Ok(packages) => packages,
        Err(e) => {
            log::error!("{}", e);
            summary.failed = file_paths.len();
            summary.not_found = file_paths.to_vec();
            return summary;
        }
    };

    let index = PackageIndex::new(&packages);
    let locations = index.locations();

    for file_path in file_paths {
        let normalized = file_path.trim_start_matches('/');
        let Some(pkg) = locations.by_path(normalized) else {
            log::warn!("    NOT FOUND: {}", normalized);
            summary.failed += 1;
            summary.not_found.push(normalized.to_string());
            continue;
        };

        summary.matched.push(normalized.to_string());
        if delete_one(api, pkg, normalized) {
            summary.deleted += 1;
        } else {
            summary.failed += 1;
        }
    }

    log::info!(
        "  Deleted: {}, Not found/failed: {}",
        summary.deleted,
        summary.failed
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{DryRunApi, MemoryApi};
    use crate::error::SidecarError;

    fn dataset() -> Vec<Package> {
        vec![
            Package::collection("A", "ieeg"),
            Package::collection("B", "sub-01").with_parent("A"),
            Package::new("1", "sub-01_channels.tsv").with_parent("B"),
            Package::new("2", "sub-01_ieeg.json").with_parent("B"),
            Package::new("3", "README.tsv"),
            Package::collection("C", "folder.tsv"),
        ]
    }

    #[test]
    fn test_match_pattern_full_path_or_name() {
        let packages = dataset();
        let all_tsv = match_pattern(&packages, &Pattern::new("*.tsv").unwrap());
        let paths: Vec<&str> = all_tsv.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["ieeg/sub-01/sub-01_channels.tsv", "README.tsv"]);

        let nested = match_pattern(&packages, &Pattern::new("ieeg/sub-*/*_ieeg.json").unwrap());
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].1.id(), Some("2"));
    }

    #[test]
    fn test_delete_by_pattern() {
        let mut api = MemoryApi::new("ds", dataset()).fail_delete("N:package:3");
        let summary = delete_by_pattern(&mut api, "ds", "*.tsv").unwrap();
        assert_eq!(summary.counts(), (1, 1));
        assert!(!api.packages().iter().any(|p| p.id() == Some("1")));
    }

    #[test]
    fn test_delete_by_pattern_rejects_bad_glob() {
        let mut api = MemoryApi::new("ds", dataset());
        assert!(matches!(
            delete_by_pattern(&mut api, "ds", "[unclosed"),
            Err(SidecarError::Pattern(_))
        ));
    }

    #[test]
    fn test_delete_without_node_id_fails() {
        let mut packages = dataset();
        packages[4].content.node_id = None;
        let mut api = DryRunApi::new("ds", packages);
        let summary = delete_by_pattern(&mut api, "ds", "*.tsv").unwrap();
        assert_eq!(summary.counts(), (1, 1));
        assert_eq!(api.actions().len(), 1);
    }

    #[test]
    fn test_delete_by_path() {
        let mut api = MemoryApi::new("ds", dataset());
        let paths = vec![
            "/ieeg/sub-01/sub-01_ieeg.json".to_string(),
            "README.tsv".to_string(),
            "ieeg/missing.tsv".to_string(),
        ];
        let summary = delete_by_path(&mut api, "ds", &paths);
        assert_eq!(summary.counts(), (2, 1));
        assert_eq!(summary.not_found, vec!["ieeg/missing.tsv".to_string()]);
        assert_eq!(api.packages().len(), 4);
    }

    #[test]
    fn test_unknown_dataset() {
        let mut api = MemoryApi::new("ds", dataset());
        assert_eq!(delete_by_pattern(&mut api, "other", "*").unwrap().counts(), (0, 0));
        let paths = vec!["a".to_string(), "b".to_string()];
        assert_eq!(delete_by_path(&mut api, "other", &paths).counts(), (0, 2));
    }
}
