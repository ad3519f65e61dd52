//! Dataset/package API collaborator.
//!
//! The HTTP client, authentication and response caching live outside this
//! crate; the reconciliation and cleanup operations only need the calls below.

use crate::error::ApiError;
use crate::package::Package;
#[cfg(any(test, feature = "test-util"))]
use std::collections::HashSet;

pub trait PackageApi {
    /// Dataset id for a dataset name, if the dataset exists.
    fn find_dataset(&self, name: &str) -> Result<Option<String>, ApiError>;

    /// Every package of the dataset, pagination already resolved.
    fn list_packages(&self, dataset_id: &str) -> Result<Vec<Package>, ApiError>;

    fn delete_package(&mut self, node_id: &str) -> Result<(), ApiError>;

    fn rename_package(&mut self, node_id: &str, new_name: &str) -> Result<(), ApiError>;
}

/// Serves a materialised listing and only logs mutations.
pub struct DryRunApi {
    dataset_name: String,
    dataset_id: String,
    packages: Vec<Package>,
    actions: Vec<String>,
}

impl DryRunApi {
    pub fn new(dataset_name: impl Into<String>, packages: Vec<Package>) -> Self {
        let dataset_name = dataset_name.into();
        Self {
            dataset_id: format!("N:dataset:{}", dataset_name),
            dataset_name,
            packages,
            actions: Vec::new(),
        }
    }

    /// Mutations that would have been sent, in order
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    fn record(&mut self, action: String) {
        log::info!("[DRY RUN] {}", action);
        self.actions.push(action);
    }
}

impl PackageApi for DryRunApi {
    fn find_dataset(&self, name: &str) -> Result<Option<String>, ApiError> {
        Ok((name == self.dataset_name).then(|| self.dataset_id.clone()))
    }

    fn list_packages(&self, dataset_id: &str) -> Result<Vec<Package>, ApiError> {
        if dataset_id != self.dataset_id {
            return Err(ApiError::NotFound(dataset_id.to_string()));
        }
        Ok(self.packages.clone())
    }

    fn delete_package(&mut self, node_id: &str) -> Result<(), ApiError> {
        self.record(format!("Would delete package: {}", node_id));
        Ok(())
    }

    fn rename_package(&mut self, node_id: &str, new_name: &str) -> Result<(), ApiError> {
        self.record(format!("Would rename package {} -> '{}'", node_id, new_name));
        Ok(())
    }
}

/// In-process dataset that applies deletes and renames to its own listing.
///
/// Node ids registered with `fail_delete`/`fail_rename` reject the call.
/// Available to tests and behind the `test-util` feature.
#[cfg(any(test, feature = "test-util"))]
pub struct MemoryApi {
    dataset_name: String,
    dataset_id: String,
    packages: Vec<Package>,
    failing_deletes: HashSet<String>,
    failing_renames: HashSet<String>,
}

#[cfg(any(test, feature = "test-util"))]
impl MemoryApi {
    pub fn new(dataset_name: impl Into<String>, packages: Vec<Package>) -> Self {
        let dataset_name = dataset_name.into();
        Self {
            dataset_id: format!("N:dataset:{}", dataset_name),
            dataset_name,
            packages,
            failing_deletes: HashSet::new(),
            failing_renames: HashSet::new(),
        }
    }

    pub fn fail_delete(mut self, node_id: impl Into<String>) -> Self {
        self.failing_deletes.insert(node_id.into());
        self
    }

    pub fn fail_rename(mut self, node_id: impl Into<String>) -> Self {
        self.failing_renames.insert(node_id.into());
        self
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    fn position(&self, node_id: &str) -> Result<usize, ApiError> {
        self.packages
            .iter()
            .position(|p| p.node_id() == Some(node_id) && !p.is_deleted())
            .ok_or_else(|| ApiError::NotFound(node_id.to_string()))
    }
}

#[cfg(any(test, feature = "test-util"))]
impl PackageApi for MemoryApi {
    fn find_dataset(&self, name: &str) -> Result<Option<String>, ApiError> {
        Ok((name == self.dataset_name).then(|| self.dataset_id.clone()))
    }

    fn list_packages(&self, dataset_id: &str) -> Result<Vec<Package>, ApiError> {
        if dataset_id != self.dataset_id {
            return Err(ApiError::NotFound(dataset_id.to_string()));
        }
        Ok(self.packages.clone())
    }

    fn delete_package(&mut self, node_id: &str) -> Result<(), ApiError> {
        if self.failing_deletes.contains(node_id) {
            return Err(ApiError::RequestFailed(format!("delete {}", node_id)));
        }
        let idx = self.position(node_id)?;
        self.packages.remove(idx);
        Ok(())
    }

    fn rename_package(&mut self, node_id: &str, new_name: &str) -> Result<(), ApiError> {
        if self.failing_renames.contains(node_id) {
            return Err(ApiError::RequestFailed(format!("rename {}", node_id)));
        }
        let idx = self.position(node_id)?;
        self.packages[idx].content.name = new_name.to_string();
        Ok(())
    }
}
