//! Static sidecar descriptions: field taxonomy, defaults, column order and rules.

use crate::error::{Result, SidecarError};
use crate::schema::SchemaDef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::str::FromStr;

/// One JSON object (a JSON sidecar) or one TSV row.
pub type Record = serde_json::Map<String, Value>;

/// Literal cell values treated as "not available".
pub const NOT_AVAILABLE: &[&str] = &["n/a", "N/A"];

/// On-disk shape of a sidecar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidecarFormat {
    Json,
    Tsv,
}

impl SidecarFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SidecarFormat::Json => "json",
            SidecarFormat::Tsv => "tsv",
        }
    }
}

/// How a failed check is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl FromStr for Severity {
    type Err = SidecarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(SidecarError::InvalidInput(format!(
                "unknown severity '{}': expected warning or error",
                s
            ))),
        }
    }
}

/// Default value declared in a spec table.
///
/// `Json` holds a raw JSON literal for nested defaults (participants column
/// dictionaries); it is parsed when defaults are materialised.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Float(f64),
    Bool(bool),
    Json(&'static str),
}

impl DefaultValue {
    pub fn to_value(&self) -> Value {
        match *self {
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Int(i) => Value::from(i),
            DefaultValue::Float(f) => Value::from(f),
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Json(raw) => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
            }
        }
    }
}

/// A field that becomes required when another field holds a given value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalRule {
    /// Field whose value triggers the rule
    pub when_field: &'static str,
    /// Trigger value, compared case-insensitively
    pub equals: &'static str,
    /// Field that becomes required
    pub then_required: &'static str,
    /// Whether the type's stock default counts as supplying `then_required`.
    /// Defaults describing the default coordinate space do not describe "Other".
    pub default_satisfies: bool,
}

impl ConditionalRule {
    /// True when the trigger field holds the trigger value.
    pub fn is_triggered(&self, record: &Record) -> bool {
        record
            .get(self.when_field)
            .and_then(Value::as_str)
            .map(|v| v.eq_ignore_ascii_case(self.equals))
            .unwrap_or(false)
    }

    /// True when the record satisfies the rule (trivially so if not triggered).
    pub fn is_satisfied(&self, spec: &SidecarSpec, record: &Record) -> bool {
        if !self.is_triggered(record) {
            return true;
        }
        match record.get(self.then_required) {
            None => false,
            Some(value) if self.default_satisfies => !value.is_null(),
            Some(value) => spec
                .default_for(self.then_required)
                .map(|d| d != *value)
                .unwrap_or(true),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "if {} == '{}' then {} is REQUIRED",
            self.when_field, self.equals, self.then_required
        )
    }
}

/// Every sidecar type the crate knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidecarKind {
    Channels,
    Electrodes,
    Events,
    ParticipantsTsv,
    Sessions,
    Ieeg,
    Eeg,
    CoordSystem,
    Participants,
    DatasetDescription,
}

impl SidecarKind {
    pub fn all() -> &'static [SidecarKind] {
        &[
            SidecarKind::Channels,
            SidecarKind::Electrodes,
            SidecarKind::Events,
            SidecarKind::ParticipantsTsv,
            SidecarKind::Sessions,
            SidecarKind::Ieeg,
            SidecarKind::Eeg,
            SidecarKind::CoordSystem,
            SidecarKind::Participants,
            SidecarKind::DatasetDescription,
        ]
    }

    /// Parse a command-line style name (`channels`, `participants-tsv`, `coordsystem`, ...)
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "channels" => Some(Self::Channels),
            "electrodes" => Some(Self::Electrodes),
            "events" => Some(Self::Events),
            "participants_tsv" => Some(Self::ParticipantsTsv),
            "sessions" => Some(Self::Sessions),
            "ieeg" => Some(Self::Ieeg),
            "eeg" => Some(Self::Eeg),
            "coordsystem" | "coord_system" => Some(Self::CoordSystem),
            "participants" | "participants_json" => Some(Self::Participants),
            "dataset_description" => Some(Self::DatasetDescription),
            _ => None,
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| SidecarError::UnknownSidecar(name.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Channels => "channels",
            Self::Electrodes => "electrodes",
            Self::Events => "events",
            Self::ParticipantsTsv => "participants_tsv",
            Self::Sessions => "sessions",
            Self::Ieeg => "ieeg",
            Self::Eeg => "eeg",
            Self::CoordSystem => "coordsystem",
            Self::Participants => "participants",
            Self::DatasetDescription => "dataset_description",
        }
    }

    pub fn spec(&self) -> &'static SidecarSpec {
        use crate::registry::*;
        match self {
            Self::Channels => &CHANNELS,
            Self::Electrodes => &ELECTRODES,
            Self::Events => &EVENTS,
            Self::ParticipantsTsv => &PARTICIPANTS_TSV,
            Self::Sessions => &SESSIONS,
            Self::Ieeg => &IEEG,
            Self::Eeg => &EEG,
            Self::CoordSystem => &COORDSYSTEM,
            Self::Participants => &PARTICIPANTS_JSON,
            Self::DatasetDescription => &DATASET_DESCRIPTION,
        }
    }

    pub fn format(&self) -> SidecarFormat {
        self.spec().format
    }
}

impl std::fmt::Display for SidecarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-type sidecar description.
///
/// The three field sets are disjoint by convention; their union is the set of
/// "known" fields for the type.
#[derive(Debug, Clone, Copy)]
pub struct SidecarSpec {
    pub kind: SidecarKind,
    /// Builder name used in log lines
    pub name: &'static str,
    pub format: SidecarFormat,
    /// Default output filename
    pub filename: &'static str,
    pub required: &'static [&'static str],
    pub recommended: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub defaults: &'static [(&'static str, DefaultValue)],
    /// TSV output column order; unknown columns follow alphabetically
    pub column_order: &'static [&'static str],
    /// TSV columns whose values must parse as numbers
    pub numeric_fields: &'static [&'static str],
    pub numeric_severity: Severity,
    pub rules: &'static [ConditionalRule],
    pub schema: Option<&'static SchemaDef>,
    pub documentation: &'static str,
}

impl SidecarSpec {
    pub fn required_set(&self) -> BTreeSet<&'static str> {
        self.required.iter().copied().collect()
    }

    pub fn recommended_set(&self) -> BTreeSet<&'static str> {
        self.recommended.iter().copied().collect()
    }

    pub fn optional_set(&self) -> BTreeSet<&'static str> {
        self.optional.iter().copied().collect()
    }

    /// Union of required, recommended and optional fields
    pub fn known_fields(&self) -> BTreeSet<&'static str> {
        self.required
            .iter()
            .chain(self.recommended)
            .chain(self.optional)
            .copied()
            .collect()
    }

    pub fn is_known(&self, field: &str) -> bool {
        self.required.contains(&field)
            || self.recommended.contains(&field)
            || self.optional.contains(&field)
    }

    pub fn default_for(&self, field: &str) -> Option<Value> {
        self.defaults
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.to_value())
    }

    /// Defaults as a record, in declaration order
    pub fn default_record(&self) -> Record {
        self.defaults
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_value()))
            .collect()
    }

    /// REQUIRED / RECOMMENDED / OPTIONAL listing, each sorted
    pub fn field_summary(&self) -> String {
        let join = |set: BTreeSet<&str>| set.into_iter().collect::<Vec<_>>().join(", ");
        format!(
            "REQUIRED: {}\nRECOMMENDED: {}\nOPTIONAL: {}",
            join(self.required_set()),
            join(self.recommended_set()),
            join(self.optional_set())
        )
    }
}
