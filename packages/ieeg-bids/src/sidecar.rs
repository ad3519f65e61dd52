//! Sidecar model: JSON records and TSV row sets built over a static spec.

use crate::config::SidecarOptions;
use crate::error::{Result, SidecarError};
use crate::merge::{merge_rows, merge_with_defaults};
use crate::spec::{Record, SidecarFormat, SidecarKind, SidecarSpec};
use crate::tsv;
use crate::validator::{FieldValidator, ValidationReport};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Common contract of every sidecar type
pub trait Sidecar {
    fn spec(&self) -> &'static SidecarSpec;

    fn options(&self) -> &SidecarOptions;

    /// Classify data against the type's `SidecarSpec`: `data` as given, with
    /// no default merging, or the sidecar's own data when `None`.
    ///
    /// JSON sidecars return `SidecarError::Schema` when the structural check
    /// fails; every other finding lands in the report.
    fn validate_data(&self, data: Option<&Value>) -> Result<ValidationReport>;

    /// Serialize `data` (or the sidecar's own data) to an explicit path,
    /// creating parent directories.
    fn write_data(&self, path: &Path, data: Option<&Value>) -> Result<PathBuf>;

    fn validate(&self) -> Result<ValidationReport> {
        self.validate_data(None)
    }

    fn save_to(&self, path: &Path) -> Result<PathBuf> {
        self.write_data(path, None)
    }

    fn filename(&self) -> &str {
        self.options()
            .filename
            .as_deref()
            .unwrap_or(self.spec().filename)
    }

    /// Validate and log the findings. In strict mode a failed validation is
    /// returned as `SidecarError::ValidationFailed`.
    fn run_validation(&self, strict: bool) -> Result<bool> {
        let name = self.spec().name;
        let report = self.validate()?;

        for msg in &report.errors {
            log::error!("{}", msg);
        }
        for msg in &report.warnings {
            log::warn!("{}", msg);
        }

        if report.ok() {
            log::info!("{} validation passed.", name);
            return Ok(true);
        }
        if strict {
            return Err(SidecarError::ValidationFailed {
                sidecar: name.to_string(),
                errors: report.errors,
            });
        }
        Ok(false)
    }

    /// Write to `output_dir/filename` (the configured output directory when
    /// `output_dir` is `None`).
    ///
    /// With `validate` set, validation runs first and any failure is logged;
    /// the file is written regardless.
    fn save(&self, output_dir: Option<&Path>, validate: bool) -> Result<PathBuf> {
        self.save_data(output_dir, None, validate)
    }

    /// `save` with explicit data written in place of the sidecar's own.
    fn save_data(
        &self,
        output_dir: Option<&Path>,
        data: Option<&Value>,
        validate: bool,
    ) -> Result<PathBuf> {
        if validate {
            match self.validate_data(data) {
                Ok(report) if !report.ok() => log::warn!(
                    "Validation failed with {} errors",
                    report.errors.len()
                ),
                Ok(_) => {}
                Err(e) => log::warn!("Validation failed: {}", e),
            }
        }

        let dir = output_dir.unwrap_or(&self.options().paths.output_dir);
        self.write_data(&dir.join(self.filename()), data)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn expect_format(kind: SidecarKind, format: SidecarFormat) -> Result<&'static SidecarSpec> {
    let spec = kind.spec();
    if spec.format != format {
        return Err(SidecarError::InvalidInput(format!(
            "{} is a {} sidecar",
            kind,
            spec.format.extension()
        )));
    }
    Ok(spec)
}

fn record_from_value(value: Value) -> Result<Record> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(SidecarError::InvalidInput(format!(
            "fields must be a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

/// A JSON array of objects; a single object is one row.
fn rows_from_value(value: Value) -> Result<Vec<Record>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(row) => Ok(row),
                other => Err(SidecarError::InvalidInput(format!(
                    "row {} must be a JSON object, got {}",
                    i + 1,
                    type_name(&other)
                ))),
            })
            .collect(),
        Value::Object(row) => Ok(vec![row]),
        other => Err(SidecarError::InvalidInput(format!(
            "rows must be a JSON array of objects, got {}",
            type_name(&other)
        ))),
    }
}

// =============================================================================
// JSON
// =============================================================================

/// One merged record written as an indented JSON object
#[derive(Debug, Clone)]
pub struct JsonSidecar {
    spec: &'static SidecarSpec,
    data: Record,
    options: SidecarOptions,
}

impl JsonSidecar {
    pub fn new(kind: SidecarKind, fields: Record, options: SidecarOptions) -> Result<Self> {
        let spec = expect_format(kind, SidecarFormat::Json)?;
        Ok(Self::build(spec, fields, options))
    }

    fn build(spec: &'static SidecarSpec, fields: Record, options: SidecarOptions) -> Self {
        let data = merge_with_defaults(spec, &fields);
        log::debug!(
            "{} initialized with {} fields ({} user-supplied, {} defaults).",
            spec.name,
            data.len(),
            fields.len(),
            spec.defaults.len()
        );
        Self { spec, data, options }
    }

    /// Build from an arbitrary JSON value, which must be an object.
    pub fn from_value(kind: SidecarKind, value: Value, options: SidecarOptions) -> Result<Self> {
        Self::new(kind, record_from_value(value)?, options)
    }

    pub fn data(&self) -> &Record {
        &self.data
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }

    /// Validate an explicit record against this sidecar's spec.
    pub fn validate_record(&self, record: &Record) -> Result<ValidationReport> {
        FieldValidator::new(self.spec)
            .with_numeric_severity(self.options.numeric_severity)
            .validate_record(record)
    }

    pub fn to_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_json(&mut buf, &self.data)?;
        String::from_utf8(buf).map_err(|e| SidecarError::InvalidInput(e.to_string()))
    }

    fn write_json<W: Write>(&self, writer: W, record: &Record) -> Result<()> {
        let indent = vec![b' '; self.options.json_indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
        let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
        record.serialize(&mut ser)?;
        Ok(())
    }
}

impl Sidecar for JsonSidecar {
    fn spec(&self) -> &'static SidecarSpec {
        self.spec
    }

    fn options(&self) -> &SidecarOptions {
        &self.options
    }

    fn validate_data(&self, data: Option<&Value>) -> Result<ValidationReport> {
        match data {
            Some(value) => self.validate_record(&record_from_value(value.clone())?),
            None => self.validate_record(&self.data),
        }
    }

    fn write_data(&self, path: &Path, data: Option<&Value>) -> Result<PathBuf> {
        let record = match data {
            Some(value) => Cow::Owned(record_from_value(value.clone())?),
            None => Cow::Borrowed(&self.data),
        };
        ensure_parent(path)?;
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_json(&mut writer, &record)?;
        writer.flush()?;

        log::info!("Saved {} to {}", self.spec.name, path.display());
        Ok(path.to_path_buf())
    }
}

// =============================================================================
// TSV
// =============================================================================

/// Ordered rows, each merged independently against the row defaults
#[derive(Debug, Clone)]
pub struct TsvSidecar {
    spec: &'static SidecarSpec,
    rows: Vec<Record>,
    options: SidecarOptions,
}

impl TsvSidecar {
    pub fn new(kind: SidecarKind, rows: Vec<Record>, options: SidecarOptions) -> Result<Self> {
        let spec = expect_format(kind, SidecarFormat::Tsv)?;
        Ok(Self::build(spec, rows, options))
    }

    fn build(spec: &'static SidecarSpec, rows: Vec<Record>, options: SidecarOptions) -> Self {
        let rows = merge_rows(spec, &rows);
        log::debug!(
            "{} initialized with {} rows (defaults: {:?})",
            spec.name,
            rows.len(),
            spec.defaults.iter().map(|(k, _)| *k).collect::<Vec<_>>()
        );
        Self { spec, rows, options }
    }

    /// Build from a JSON array of objects (a single object is one row).
    pub fn from_value(kind: SidecarKind, value: Value, options: SidecarOptions) -> Result<Self> {
        Self::new(kind, rows_from_value(value)?, options)
    }

    /// Append one row, merged with defaults; existing rows are untouched.
    pub fn add_row(&mut self, row: Record) {
        self.rows.push(merge_with_defaults(self.spec, &row));
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Output header for the current rows
    pub fn columns(&self) -> Vec<String> {
        tsv::ordered_columns(self.spec.column_order, &self.rows)
    }

    /// Validate an explicit row set against this sidecar's spec.
    pub fn validate_rows(&self, rows: &[Record]) -> ValidationReport {
        FieldValidator::new(self.spec)
            .with_numeric_severity(self.options.numeric_severity)
            .validate_rows(rows)
    }
}

impl Sidecar for TsvSidecar {
    fn spec(&self) -> &'static SidecarSpec {
        self.spec
    }

    fn options(&self) -> &SidecarOptions {
        &self.options
    }

    fn validate_data(&self, data: Option<&Value>) -> Result<ValidationReport> {
        match data {
            Some(value) => Ok(self.validate_rows(&rows_from_value(value.clone())?)),
            None => Ok(self.validate_rows(&self.rows)),
        }
    }

    fn write_data(&self, path: &Path, data: Option<&Value>) -> Result<PathBuf> {
        let rows = match data {
            Some(value) => Cow::Owned(rows_from_value(value.clone())?),
            None => Cow::Borrowed(self.rows.as_slice()),
        };
        if rows.is_empty() {
            return Err(SidecarError::EmptyRows {
                sidecar: self.spec.name.to_string(),
            });
        }
        ensure_parent(path)?;
        let columns = tsv::ordered_columns(self.spec.column_order, &rows);
        tsv::write_tsv(path, &columns, &rows)?;

        log::info!(
            "Saved {} ({} rows) to {}",
            self.spec.name,
            rows.len(),
            path.display()
        );
        Ok(path.to_path_buf())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build any registered sidecar from JSON input.
pub fn build_sidecar(
    kind: SidecarKind,
    value: Value,
    options: SidecarOptions,
) -> Result<Box<dyn Sidecar>> {
    Ok(match kind.format() {
        SidecarFormat::Json => Box::new(JsonSidecar::from_value(kind, value, options)?),
        SidecarFormat::Tsv => Box::new(TsvSidecar::from_value(kind, value, options)?),
    })
}

// =============================================================================
// TYPED SIDECARS
// =============================================================================

macro_rules! typed_sidecar {
    ($(#[$meta:meta])* $name:ident, $base:ident, $kind:expr, $input:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name($base);

        impl $name {
            pub const KIND: SidecarKind = $kind;

            pub fn new(input: $input) -> Self {
                Self::with_options(input, SidecarOptions::default())
            }

            pub fn with_options(input: $input, options: SidecarOptions) -> Self {
                Self($base::build(Self::KIND.spec(), input, options))
            }

            pub fn into_inner(self) -> $base {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = $base;

            fn deref(&self) -> &$base {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut $base {
                &mut self.0
            }
        }

        impl Sidecar for $name {
            fn spec(&self) -> &'static SidecarSpec {
                self.0.spec()
            }

            fn options(&self) -> &SidecarOptions {
                self.0.options()
            }

            fn validate_data(&self, data: Option<&Value>) -> Result<ValidationReport> {
                self.0.validate_data(data)
            }

            fn write_data(&self, path: &Path, data: Option<&Value>) -> Result<PathBuf> {
                self.0.write_data(path, data)
            }
        }
    };
}

typed_sidecar!(
    /// channels.tsv
    ChannelsSidecar, TsvSidecar, SidecarKind::Channels, Vec<Record>
);
typed_sidecar!(
    /// electrodes.tsv
    ElectrodesSidecar, TsvSidecar, SidecarKind::Electrodes, Vec<Record>
);
typed_sidecar!(
    /// events.tsv
    EventsSidecar, TsvSidecar, SidecarKind::Events, Vec<Record>
);
typed_sidecar!(
    /// participants.tsv
    ParticipantsTsvSidecar, TsvSidecar, SidecarKind::ParticipantsTsv, Vec<Record>
);
typed_sidecar!(
    /// sessions.tsv
    SessionsSidecar, TsvSidecar, SidecarKind::Sessions, Vec<Record>
);
typed_sidecar!(
    /// *_ieeg.json
    IeegSidecar, JsonSidecar, SidecarKind::Ieeg, Record
);
typed_sidecar!(
    /// *_eeg.json
    EegSidecar, JsonSidecar, SidecarKind::Eeg, Record
);
typed_sidecar!(
    /// *_coordsystem.json
    CoordSystemSidecar, JsonSidecar, SidecarKind::CoordSystem, Record
);
typed_sidecar!(
    /// participants.json
    ParticipantsSidecar, JsonSidecar, SidecarKind::Participants, Record
);
typed_sidecar!(
    /// dataset_description.json
    DatasetDescriptionSidecar, JsonSidecar, SidecarKind::DatasetDescription, Record
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathConfig;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_wrong_format_is_rejected() {
        assert!(matches!(
            JsonSidecar::new(SidecarKind::Channels, Record::new(), SidecarOptions::default()),
            Err(SidecarError::InvalidInput(_))
        ));
        assert!(matches!(
            TsvSidecar::new(SidecarKind::Eeg, vec![], SidecarOptions::default()),
            Err(SidecarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_value_shapes() {
        let opts = SidecarOptions::default;
        assert!(JsonSidecar::from_value(SidecarKind::Eeg, json!([1]), opts()).is_err());
        assert!(TsvSidecar::from_value(SidecarKind::Events, json!("x"), opts()).is_err());
        assert!(TsvSidecar::from_value(SidecarKind::Events, json!([{"onset": 1}, 2]), opts()).is_err());

        let single = TsvSidecar::from_value(SidecarKind::Events, json!({"onset": 1}), opts()).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_add_row_merges_only_new_row() {
        let mut channels = ChannelsSidecar::new(vec![record(json!({"name": "LA01", "units": "mV"}))]);
        channels.add_row(record(json!({"name": "LA02"})));
        assert_eq!(channels.rows().len(), 2);
        assert_eq!(channels.rows()[0]["units"], json!("mV"));
        assert_eq!(channels.rows()[1]["units"], json!("uV"));
    }

    #[test]
    fn test_empty_tsv_cannot_be_saved() {
        let dir = tempdir().unwrap();
        let events = EventsSidecar::new(vec![]);
        let err = events.save(Some(dir.path()), false).unwrap_err();
        assert!(matches!(err, SidecarError::EmptyRows { .. }));
        assert!(!dir.path().join("events.tsv").exists());
    }

    #[test]
    fn test_save_uses_filename_override_and_configured_dir() {
        let dir = tempdir().unwrap();
        let options = SidecarOptions::default()
            .with_filename("sub-01_task-clinical_ieeg.json")
            .with_paths(PathConfig::default().with_output_dir(dir.path().join("nested")));
        let ieeg = IeegSidecar::with_options(record(json!({"SamplingFrequency": 512})), options);
        let path = ieeg.save(None, true).unwrap();
        assert_eq!(path, dir.path().join("nested/sub-01_task-clinical_ieeg.json"));

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["SamplingFrequency"], json!(512));
        assert_eq!(written["TaskName"], json!("clinical"));
    }

    #[test]
    fn test_json_indent_is_configurable() {
        let eeg = EegSidecar::with_options(Record::new(), SidecarOptions::default().with_json_indent(2));
        let text = eeg.to_json_string().unwrap();
        assert!(text.starts_with("{\n  \"TaskName\": \"default_task\""));

        let eeg = EegSidecar::new(Record::new());
        assert!(eeg.to_json_string().unwrap().starts_with("{\n    \"TaskName\""));
    }

    #[test]
    fn test_permissive_save_writes_invalid_data() {
        let dir = tempdir().unwrap();
        let coords = CoordSystemSidecar::new(record(json!({"iEEGCoordinateSystem": "Other"})));
        assert!(!coords.validate().unwrap().ok());
        let path = coords.save(Some(dir.path()), true).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_run_validation_strict() {
        let coords = CoordSystemSidecar::new(record(json!({"iEEGCoordinateSystem": "Other"})));
        assert!(!coords.run_validation(false).unwrap());
        match coords.run_validation(true) {
            Err(SidecarError::ValidationFailed { sidecar, errors }) => {
                assert_eq!(sidecar, "CoordSystemSidecar");
                assert!(errors[0].contains("iEEGCoordinateSystemDescription"));
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }

        let coords = CoordSystemSidecar::new(Record::new());
        assert!(coords.run_validation(true).unwrap());
    }

    #[test]
    fn test_validate_data_checks_input_without_defaults() {
        let channels = ChannelsSidecar::new(vec![record(json!({"name": "LA01"}))]);
        let raw = json!([{"name": "LA01"}]);

        let report = channels.validate_data(Some(&raw)).unwrap();
        assert!(!report.ok());
        assert!(report.errors[0].starts_with("Missing REQUIRED fields: "));
        assert!(report.errors[0].contains("'units'"));
        assert_eq!(report.columns, vec!["name".to_string()]);

        let eeg = EegSidecar::new(Record::new());
        assert!(matches!(
            eeg.validate_data(Some(&json!([1]))),
            Err(SidecarError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_save_data_writes_explicit_rows() {
        let dir = tempdir().unwrap();
        let events = EventsSidecar::new(vec![record(json!({"onset": 1}))]);
        let path = events
            .save_data(Some(dir.path()), Some(&json!([{"duration": 2, "onset": 5}])), true)
            .unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "onset\tduration\n5\t2\n");

        assert!(matches!(
            events.save_data(Some(dir.path()), Some(&json!([])), false),
            Err(SidecarError::EmptyRows { .. })
        ));
    }

    #[test]
    fn test_build_sidecar_dispatches_on_format() {
        let sidecar = build_sidecar(
            SidecarKind::Electrodes,
            json!([{"name": "A1", "x": 1, "y": 2, "z": 3}]),
            SidecarOptions::default(),
        )
        .unwrap();
        assert_eq!(sidecar.filename(), "electrodes.tsv");
        assert!(sidecar.validate().unwrap().ok());
    }
}
