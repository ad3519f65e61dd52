//! Duplicate reconciliation: replace an original with its "(1)" re-upload.
//!
//! Per candidate `(folder, filename)` the original is deleted and the
//! duplicate renamed into its place. The two calls are not transactional; a
//! failed rename after a successful delete is reported as a skip and the
//! dataset is left without the original.

use crate::api::PackageApi;
use crate::error::ApiError;
use crate::package::Package;
use crate::paths::{split_path, PackageIndex};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Placeholder expanded to the dataset name in candidate paths
pub const DATASET_PLACEHOLDER: &str = "{dataset}";

fn split_suffix(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(i) if i > 0 && i + 1 < filename.len() => filename.split_at(i),
        _ => (filename, ""),
    }
}

/// `file.json` -> `file (1).json`
pub fn duplicate_name(filename: &str) -> String {
    let (stem, suffix) = split_suffix(filename);
    format!("{} (1){}", stem, suffix)
}

fn duplicate_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(.+) \(1\)(\.[^.]+)$").ok())
        .as_ref()
}

/// `file (1).json` -> `file.json`; names that are not duplicates come back unchanged.
pub fn original_name(name: &str) -> String {
    match duplicate_pattern().and_then(|re| re.captures(name)) {
        Some(caps) => format!("{}{}", &caps[1], &caps[2]),
        None => name.to_string(),
    }
}

pub fn expand_placeholder(template: &str, dataset_name: &str) -> String {
    template.replace(DATASET_PLACEHOLDER, dataset_name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    NeitherFound,
    /// Nothing to replace the original with
    OnlyOriginal,
    /// Nothing to delete
    OnlyDuplicate,
    /// The original could not be deleted; no rename was attempted
    DeleteFailed(String),
    /// The original is gone but the duplicate kept its "(1)" name
    RenameFailed(String),
    DatasetUnavailable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NeitherFound => write!(f, "Neither file found"),
            SkipReason::OnlyOriginal => {
                write!(f, "Only original exists (no duplicate to replace with)")
            }
            SkipReason::OnlyDuplicate => write!(f, "Only duplicate exists (no original to delete)"),
            SkipReason::DeleteFailed(e) => write!(f, "Failed to delete original, skipping rename: {}", e),
            SkipReason::RenameFailed(e) => write!(f, "Failed to rename duplicate: {}", e),
            SkipReason::DatasetUnavailable(e) => write!(f, "Dataset unavailable: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Reconciled,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateOutcome {
    /// Candidate path after placeholder expansion
    pub path: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub success: usize,
    pub skipped: usize,
    pub outcomes: Vec<CandidateOutcome>,
}

impl ReconcileSummary {
    /// `(success, skipped)`
    pub fn counts(&self) -> (usize, usize) {
        (self.success, self.skipped)
    }

    fn push(&mut self, path: String, outcome: Outcome) {
        match &outcome {
            Outcome::Reconciled => self.success += 1,
            Outcome::Skipped(reason) => {
                log::info!("    SKIP: {}", reason);
                self.skipped += 1;
            }
        }
        self.outcomes.push(CandidateOutcome { path, outcome });
    }
}

fn reconcile_pair<A: PackageApi + ?Sized>(
    api: &mut A,
    original: &Package,
    duplicate: &Package,
    filename: &str,
) -> Outcome {
    let (Some(original_id), Some(duplicate_id)) = (original.node_id(), duplicate.node_id()) else {
        log::error!("    Missing node id for {} or its duplicate", filename);
        return Outcome::Skipped(SkipReason::DeleteFailed(format!(
            "missing node id for {} or its duplicate",
            filename
        )));
    };
    log::info!("    FOUND BOTH: original {}, duplicate {}", original_id, duplicate_id);

    if let Err(e) = api.delete_package(original_id) {
        log::error!("    Delete of original {} failed: {}", original_id, e);
        return Outcome::Skipped(SkipReason::DeleteFailed(e.to_string()));
    }
    if let Err(e) = api.rename_package(duplicate_id, filename) {
        log::error!("    Rename of duplicate {} failed: {}", duplicate_id, e);
        return Outcome::Skipped(SkipReason::RenameFailed(e.to_string()));
    }

    log::info!("    SUCCESS: Cleaned up {}", filename);
    Outcome::Reconciled
}

/// Reconcile each candidate path against an already-fetched package listing.
///
/// `{dataset}` in a candidate is replaced with `dataset_name`.
pub fn reconcile_duplicates<A: PackageApi + ?Sized>(
    api: &mut A,
    packages: &[Package],
    dataset_name: &str,
    candidates: &[String],
) -> ReconcileSummary {
    let index = PackageIndex::new(packages);
    let locations = index.locations();
    let mut summary = ReconcileSummary::default();

    for template in candidates {
        let file_path = expand_placeholder(template, dataset_name);
        let (folder, filename) = split_path(&file_path);
        let dup_name = duplicate_name(&filename);

        log::info!("  Looking for: {}", file_path);
        log::debug!(
            "    Original: {}  Duplicate: {}",
            crate::paths::join_path(&folder, &filename),
            crate::paths::join_path(&folder, &dup_name)
        );

        let original = locations.get(&folder, &filename);
        let duplicate = locations.get(&folder, &dup_name);

        let outcome = match (original, duplicate) {
            (None, None) => Outcome::Skipped(SkipReason::NeitherFound),
            (Some(_), None) => Outcome::Skipped(SkipReason::OnlyOriginal),
            (None, Some(_)) => Outcome::Skipped(SkipReason::OnlyDuplicate),
            (Some(orig), Some(dup)) => reconcile_pair(api, orig, dup, &filename),
        };
        summary.push(file_path, outcome);
    }

    summary
}

/// Look up the dataset, fetch its packages and reconcile every candidate.
///
/// A missing dataset or failed listing skips every candidate.
pub fn cleanup_duplicates<A: PackageApi + ?Sized>(
    api: &mut A,
    dataset_name: &str,
    candidates: &[String],
) -> ReconcileSummary {
    log::info!("Cleaning duplicates in dataset: {}", dataset_name);

    let packages = match fetch_packages(api, dataset_name) {
        Ok(packages) => packages,
        Err(e) => {
            log::error!("{}", e);
            let mut summary = ReconcileSummary::default();
            for template in candidates {
                summary.push(
                    expand_placeholder(template, dataset_name),
                    Outcome::Skipped(SkipReason::DatasetUnavailable(e.to_string())),
                );
            }
            return summary;
        }
    };
    log::info!("  Found {} packages", packages.len());

    let summary = reconcile_duplicates(api, &packages, dataset_name, candidates);
    log::info!(
        "  Reconciled: {}, Skipped: {}",
        summary.success,
        summary.skipped
    );
    summary
}

/// Resolve a dataset name and list its packages.
pub(crate) fn fetch_packages<A: PackageApi + ?Sized>(
    api: &A,
    dataset_name: &str,
) -> Result<Vec<Package>, ApiError> {
    let dataset_id = api
        .find_dataset(dataset_name)?
        .ok_or_else(|| ApiError::NotFound(format!("dataset {}", dataset_name)))?;
    api.list_packages(&dataset_id)
}
