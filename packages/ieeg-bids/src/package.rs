//! Package records as served by the dataset API.

use crate::error::{Result, SidecarError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

pub const STATE_DELETED: &str = "DELETED";
pub const STATE_DELETING: &str = "DELETING";
pub const COLLECTION: &str = "Collection";

/// Accept ids given either as JSON numbers or strings.
fn optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageContent {
    #[serde(default, deserialize_with = "optional_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub package_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// A file or folder node in a dataset hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub content: PackageContent,
}

impl Package {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            content: PackageContent {
                node_id: Some(format!("N:package:{}", id)),
                id: Some(id),
                name: name.into(),
                ..Default::default()
            },
        }
    }

    /// A folder node
    pub fn collection(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name).with_package_type(COLLECTION)
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.content.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.content.node_id = Some(node_id.into());
        self
    }

    pub fn with_package_type(mut self, package_type: impl Into<String>) -> Self {
        self.content.package_type = Some(package_type.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.content.state = Some(state.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.content.id.as_deref()
    }

    /// API handle for delete/rename; an empty id counts as missing.
    pub fn node_id(&self) -> Option<&str> {
        self.content.node_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn name(&self) -> &str {
        &self.content.name
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.content.parent_id.as_deref()
    }

    pub fn is_deleted(&self) -> bool {
        matches!(
            self.content.state.as_deref(),
            Some(STATE_DELETED) | Some(STATE_DELETING)
        )
    }

    pub fn is_collection(&self) -> bool {
        self.content.package_type.as_deref() == Some(COLLECTION)
    }
}

/// Parse a package listing: either a bare array or `{"packages": [...]}`.
pub fn parse_packages(value: Value) -> Result<Vec<Package>> {
    let list = match value {
        Value::Object(mut obj) => obj.remove("packages").ok_or_else(|| {
            SidecarError::InvalidInput("package listing object has no 'packages' key".into())
        })?,
        other => other,
    };
    if !list.is_array() {
        return Err(SidecarError::InvalidInput(
            "package listing must be a JSON array".into(),
        ));
    }
    Ok(serde_json::from_value(list)?)
}

pub fn load_packages(path: &Path) -> Result<Vec<Package>> {
    let text = std::fs::read_to_string(path)?;
    let packages = parse_packages(serde_json::from_str(&text)?)?;
    log::debug!("Loaded {} packages from {}", packages.len(), path.display());
    Ok(packages)
}
