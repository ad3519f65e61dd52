//! Field validator: presence classes, row consistency, numeric format,
//! conditional requirements and the structural schema pass.

use crate::error::{Result, SidecarError};
use crate::spec::{Record, Severity, SidecarSpec, NOT_AVAILABLE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const EMPTY_ROWS_MESSAGE: &str = "Data must be a non-empty list of dictionaries.";

/// Outcome of a validation pass. Validation succeeds iff `errors` is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Sorted set of observed field names
    pub columns: Vec<String>,
}

impl ValidationReport {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Render a sorted name set as `['a', 'b']`
fn name_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = names.into_iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a cell passes the numeric-format check.
///
/// Null and the "n/a" literals are skipped. Strings must parse as a float after
/// trimming; booleans count as 0/1. Arrays and objects never pass.
pub fn is_numeric_like(value: &Value) -> bool {
    match value {
        Value::Null | Value::Number(_) | Value::Bool(_) => true,
        Value::String(s) if NOT_AVAILABLE.contains(&s.as_str()) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub struct FieldValidator<'a> {
    spec: &'a SidecarSpec,
    numeric_severity: Severity,
}

impl<'a> FieldValidator<'a> {
    pub fn new(spec: &'a SidecarSpec) -> Self {
        Self {
            spec,
            numeric_severity: spec.numeric_severity,
        }
    }

    /// Override the per-type numeric-check severity.
    pub fn with_numeric_severity(mut self, severity: Option<Severity>) -> Self {
        if let Some(severity) = severity {
            self.numeric_severity = severity;
        }
        self
    }

    /// Validate a single JSON record.
    ///
    /// Schema violations short-circuit with `SidecarError::Schema` before any
    /// presence check runs.
    pub fn validate_record(&self, record: &Record) -> Result<ValidationReport> {
        if let Some(schema) = self.spec.schema {
            let violations = schema.check(record);
            if !violations.is_empty() {
                for violation in &violations {
                    log::error!("{}", violation);
                }
                return Err(SidecarError::Schema(violations));
            }
        }

        let observed: BTreeSet<&str> = record.keys().map(String::as_str).collect();
        let mut report = ValidationReport::default();
        self.check_presence(&observed, std::slice::from_ref(record), &mut report);
        report.columns = observed.iter().map(|s| s.to_string()).collect();
        Ok(report)
    }

    /// Validate a TSV row set. An empty row set is itself an error.
    pub fn validate_rows(&self, rows: &[Record]) -> ValidationReport {
        if rows.is_empty() {
            return ValidationReport {
                errors: vec![EMPTY_ROWS_MESSAGE.to_string()],
                ..Default::default()
            };
        }

        let observed: BTreeSet<&str> = rows
            .iter()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect();

        let mut report = ValidationReport::default();
        self.check_presence(&observed, rows, &mut report);

        for (i, row) in rows.iter().enumerate() {
            let keys: BTreeSet<&str> = row.keys().map(String::as_str).collect();
            if keys != observed {
                report
                    .warnings
                    .push(format!("Row {} has inconsistent columns", i + 1));
            }
        }

        for field in self.spec.numeric_fields {
            for (i, row) in rows.iter().enumerate() {
                let Some(value) = row.get(*field) else {
                    continue;
                };
                if is_numeric_like(value) {
                    continue;
                }
                let message = format!(
                    "Row {}: Field '{}' should be numeric, got '{}'",
                    i + 1,
                    field,
                    display_value(value)
                );
                match self.numeric_severity {
                    Severity::Error => report.errors.push(message),
                    Severity::Warning => report.warnings.push(message),
                }
            }
        }

        report.columns = observed.iter().map(|s| s.to_string()).collect();
        report
    }

    /// Required / recommended / extra classification plus conditional rules.
    fn check_presence(
        &self,
        observed: &BTreeSet<&str>,
        records: &[Record],
        report: &mut ValidationReport,
    ) {
        let mut missing_required: BTreeSet<&str> = self
            .spec
            .required
            .iter()
            .copied()
            .filter(|f| !observed.contains(f))
            .collect();

        for rule in self.spec.rules {
            if records.iter().any(|r| !rule.is_satisfied(self.spec, r)) {
                log::debug!("{}: conditional rule failed: {}", self.spec.name, rule.describe());
                missing_required.insert(rule.then_required);
            }
        }

        let missing_recommended: BTreeSet<&str> = self
            .spec
            .recommended
            .iter()
            .copied()
            .filter(|f| !observed.contains(f))
            .collect();

        let extras: BTreeSet<&str> = observed
            .iter()
            .copied()
            .filter(|f| !self.spec.is_known(f))
            .collect();

        if !missing_required.is_empty() {
            report.errors.push(format!(
                "Missing REQUIRED fields: {}",
                name_list(missing_required)
            ));
        }
        if !missing_recommended.is_empty() {
            report.warnings.push(format!(
                "Missing RECOMMENDED fields: {}",
                name_list(missing_recommended)
            ));
        }
        if !extras.is_empty() {
            report.warnings.push(format!(
                "Extra (non-BIDS) fields detected: {}",
                name_list(extras)
            ));
        }
    }
}
