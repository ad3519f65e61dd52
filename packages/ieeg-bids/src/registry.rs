//! Sidecar registry: one static spec per BIDS sidecar type.

use crate::schema::{FieldSchema, JsonType, SchemaDef};
use crate::spec::{
    ConditionalRule, DefaultValue, SidecarFormat, SidecarKind, SidecarSpec, Severity,
};

use DefaultValue::{Bool, Float, Int, Json, Str};
use JsonType::{Array, Boolean, Integer, Null, Number, Object, NotApplicable, StringArray};

const STRING: JsonType = JsonType::String;

/// All registered sidecar specs, TSV types first
pub static SIDECAR_REGISTRY: &[&SidecarSpec] = &[
    &CHANNELS,
    &ELECTRODES,
    &EVENTS,
    &PARTICIPANTS_TSV,
    &SESSIONS,
    &IEEG,
    &EEG,
    &COORDSYSTEM,
    &PARTICIPANTS_JSON,
    &DATASET_DESCRIPTION,
];

pub fn tsv_specs() -> impl Iterator<Item = &'static SidecarSpec> {
    SIDECAR_REGISTRY
        .iter()
        .copied()
        .filter(|s| s.format == SidecarFormat::Tsv)
}

pub fn json_specs() -> impl Iterator<Item = &'static SidecarSpec> {
    SIDECAR_REGISTRY
        .iter()
        .copied()
        .filter(|s| s.format == SidecarFormat::Json)
}

// =============================================================================
// TSV SIDECARS
// =============================================================================

/// channels.tsv: one row per recorded channel
pub static CHANNELS: SidecarSpec = SidecarSpec {
    kind: SidecarKind::Channels,
    name: "ChannelsSidecar",
    format: SidecarFormat::Tsv,
    filename: "channels.tsv",
    required: &[
        "name",
        "type",
        "units",
        "sampling_frequency",
        "low_cutoff",
        "high_cutoff",
        "notch",
        "reference",
        "group",
    ],
    recommended: &["ground"],
    optional: &["description"],
    defaults: &[
        ("type", Str("SEEG")),
        ("units", Str("uV")),
        ("low_cutoff", Str("n/a")),
        ("high_cutoff", Str("n/a")),
        ("notch", Str("n/a")),
        ("reference", Str("unknown")),
        ("ground", Str("unknown")),
        ("group", Str("n/a")),
        ("sampling_frequency", Str("n/a")),
    ],
    column_order: &[
        "name",
        "type",
        "units",
        "low_cutoff",
        "high_cutoff",
        "reference",
        "ground",
        "group",
        "sampling_frequency",
        "notch",
    ],
    numeric_fields: &["low_cutoff", "high_cutoff", "sampling_frequency", "notch"],
    numeric_severity: Severity::Warning,
    rules: &[],
    schema: None,
    documentation: "Per-channel acquisition metadata for an iEEG recording.",
};

/// electrodes.tsv: one row per electrode contact
pub static ELECTRODES: SidecarSpec = SidecarSpec {
    kind: SidecarKind::Electrodes,
    name: "ElectrodesSidecar",
    format: SidecarFormat::Tsv,
    filename: "electrodes.tsv",
    required: &["name", "x", "y", "z", "size"],
    recommended: &["material", "manufacturer", "group", "hemisphere"],
    optional: &["type", "impedance", "dimension", "roi"],
    defaults: &[
        ("size", Str("n/a")),
        ("material", Str("n/a")),
        ("manufacturer", Str("n/a")),
        ("group", Str("n/a")),
        ("hemisphere", Str("n/a")),
    ],
    column_order: &[
        "name",
        "x",
        "y",
        "z",
        "size",
        "material",
        "manufacturer",
        "group",
        "hemisphere",
        "type",
        "impedance",
        "dimension",
        "roi",
    ],
    numeric_fields: &["x", "y", "z", "size", "impedance"],
    // Unparseable coordinates are errors, not warnings.
    numeric_severity: Severity::Error,
    rules: &[],
    schema: None,
    documentation: "Electrode contact positions and hardware descriptors.",
};

/// events.tsv: one row per annotated event
pub static EVENTS: SidecarSpec = SidecarSpec {
    kind: SidecarKind::Events,
    name: "EventsSidecar",
    format: SidecarFormat::Tsv,
    filename: "events.tsv",
    required: &["onset", "duration"],
    recommended: &[],
    optional: &[
        "trial_type",
        "response_time",
        "HED",
        "stim_file",
        "channel",
        "Description",
        "Parent",
        "Annotated",
        "Annotator",
        "Type",
        "Layer",
    ],
    defaults: &[("duration", Str("n/a")), ("trial_type", Str("n/a"))],
    column_order: &[
        "onset",
        "duration",
        "trial_type",
        "response_time",
        "HED",
        "stim_file",
        "channel",
    ],
    numeric_fields: &["onset", "duration", "response_time"],
    numeric_severity: Severity::Warning,
    rules: &[],
    schema: None,
    documentation: "Onsets and durations of annotated events.",
};

/// participants.tsv: one row per subject
pub static PARTICIPANTS_TSV: SidecarSpec = SidecarSpec {
    kind: SidecarKind::ParticipantsTsv,
    name: "ParticipantsTsvSidecar",
    format: SidecarFormat::Tsv,
    filename: "participants.tsv",
    required: &[
        "participant_id",
        "species",
        "age",
        "population",
        "sex",
        "handedness",
    ],
    recommended: &[],
    optional: &[],
    defaults: &[
        ("species", Str("Homo sapiens")),
        ("age", Str("n/a")),
        ("population", Str("n/a")),
        ("sex", Str("n/a")),
        ("handedness", Str("n/a")),
    ],
    column_order: &[
        "participant_id",
        "species",
        "age",
        "population",
        "sex",
        "handedness",
    ],
    numeric_fields: &[],
    numeric_severity: Severity::Warning,
    rules: &[],
    schema: None,
    documentation: "Subject-level demographics and clinical columns.",
};

/// sessions.tsv: one row per session of a subject
pub static SESSIONS: SidecarSpec = SidecarSpec {
    kind: SidecarKind::Sessions,
    name: "SessionsSidecar",
    format: SidecarFormat::Tsv,
    filename: "sessions.tsv",
    required: &["session_id"],
    recommended: &[],
    optional: &["acq_time", "session_description", "subject_age_session"],
    defaults: &[("session_description", Str("n/a"))],
    column_order: &[
        "session_id",
        "acq_time",
        "session_description",
        "subject_age_session",
    ],
    numeric_fields: &[],
    numeric_severity: Severity::Warning,
    rules: &[],
    schema: None,
    documentation: "Per-subject listing of recording sessions.",
};

// =============================================================================
// JSON SIDECARS
// =============================================================================

const EPOCHED_NEEDS_LENGTH: ConditionalRule = ConditionalRule {
    when_field: "RecordingType",
    equals: "epoched",
    then_required: "EpochLength",
    default_satisfies: true,
};

pub static IEEG_SCHEMA: SchemaDef = SchemaDef {
    title: "BIDS iEEG Sidecar",
    fields: &[
        FieldSchema::of("TaskName", &[STRING]),
        FieldSchema::of("PowerLineFrequency", &[Number]),
        FieldSchema::of("SamplingFrequency", &[Number]),
        FieldSchema::of("SoftwareFilters", &[STRING, Object]),
        FieldSchema::of("iEEGReference", &[STRING]),
        FieldSchema::of("iEEGGround", &[STRING]),
        FieldSchema::of("Manufacturer", &[STRING]),
        FieldSchema::of("ManufacturersModelName", &[STRING]),
        FieldSchema::of("RecordingDuration", &[Number, Null]),
        FieldSchema::of("RecordingType", &[STRING]),
        FieldSchema::of("ElectricalStimulation", &[Boolean, STRING]),
        FieldSchema::of("InstitutionName", &[STRING]),
    ],
    column_descriptors: false,
};

/// *_ieeg.json: acquisition descriptor for an iEEG recording
pub static IEEG: SidecarSpec = SidecarSpec {
    kind: SidecarKind::Ieeg,
    name: "IeegSidecar",
    format: SidecarFormat::Json,
    filename: "ieeg.json",
    required: &[
        "TaskName",
        "PowerLineFrequency",
        "SamplingFrequency",
        "SoftwareFilters",
        "iEEGReference",
    ],
    recommended: &[
        "Manufacturer",
        "ManufacturersModelName",
        "SoftwareVersions",
        "DeviceSerialNumber",
        "HardwareFilters",
        "RecordingDuration",
        "RecordingType",
        "iEEGGround",
        "ECOGChannelCount",
        "SEEGChannelCount",
        "EEGChannelCount",
        "EOGChannelCount",
        "ECGChannelCount",
        "EMGChannelCount",
        "MiscChannelCount",
        "TriggerChannelCount",
        "ElectrodeManufacturer",
        "ElectrodeManufacturersModelName",
        "EpochLength",
        "iEEGPlacementScheme",
        "iEEGElectrodeGroups",
        "SubjectArtefactDescription",
        "TaskDescription",
        "Instructions",
        "CogAtlasID",
        "CogPOID",
        "InstitutionName",
        "InstitutionAddress",
        "InstitutionalDepartmentName",
    ],
    optional: &["ElectricalStimulation", "ElectricalStimulationParameters"],
    defaults: &[
        ("TaskName", Str("clinical")),
        ("PowerLineFrequency", Int(60)),
        ("SamplingFrequency", Str("n/a")),
        ("SoftwareFilters", Str("n/a")),
        ("iEEGReference", Str("unknown")),
        ("iEEGGround", Str("unknown")),
        ("RecordingType", Str("discontinuous")),
        ("Manufacturer", Str("Natus")),
        ("ManufacturersModelName", Str("Quantum")),
        ("InstitutionName", Str("Penn Medicine")),
        ("ElectrodeManufacturer", Str("AD-TECH")),
    ],
    column_order: &[],
    numeric_fields: &[],
    numeric_severity: Severity::Warning,
    rules: &[EPOCHED_NEEDS_LENGTH],
    schema: Some(&IEEG_SCHEMA),
    documentation: "Task, filtering, reference and channel-count metadata for iEEG.",
};

pub static EEG_SCHEMA: SchemaDef = SchemaDef {
    title: "BIDS EEG JSON Sidecar",
    fields: &[
        FieldSchema::of("TaskName", &[STRING]),
        FieldSchema::of("TaskDescription", &[STRING]),
        FieldSchema::of("Instructions", &[STRING]),
        FieldSchema::of("CogAtlasID", &[STRING]),
        FieldSchema::of("CogPOID", &[STRING]),
        FieldSchema::of("InstitutionName", &[STRING]),
        FieldSchema::of("InstitutionAddress", &[STRING]),
        FieldSchema::of("InstitutionalDepartmentName", &[STRING]),
        FieldSchema::of("Manufacturer", &[STRING]),
        FieldSchema::of("ManufacturersModelName", &[STRING]),
        FieldSchema::of("SoftwareVersions", &[STRING]),
        FieldSchema::of("DeviceSerialNumber", &[STRING]),
        FieldSchema::of("CapManufacturer", &[STRING]),
        FieldSchema::of("CapManufacturersModelName", &[STRING]),
        FieldSchema::of("EEGReference", &[STRING]),
        FieldSchema::of("EEGGround", &[STRING]),
        FieldSchema::of("SamplingFrequency", &[Number]),
        FieldSchema::of("PowerLineFrequency", &[Number, NotApplicable]),
        FieldSchema::of("SoftwareFilters", &[Object, NotApplicable]),
        FieldSchema::of("EEGChannelCount", &[Integer]),
        FieldSchema::of("ECGChannelCount", &[Integer]),
        FieldSchema::of("EMGChannelCount", &[Integer]),
        FieldSchema::of("EOGChannelCount", &[Integer]),
        FieldSchema::of("MISCChannelCount", &[Integer]),
        FieldSchema::of("TriggerChannelCount", &[Integer]),
        FieldSchema::of("RecordingDuration", &[Number]),
        FieldSchema::one_of("RecordingType", &[STRING], &["continuous", "epoched"]),
        FieldSchema::of("EpochLength", &[Number]),
        FieldSchema::of("HeadCircumference", &[Number, STRING]),
        FieldSchema::of("EEGPlacementScheme", &[STRING]),
        FieldSchema::of("HardwareFilters", &[Object, NotApplicable]),
        FieldSchema::of("SubjectArtefactDescription", &[STRING]),
        FieldSchema::of("ElectricalStimulation", &[Boolean]),
        FieldSchema::of("ElectricalStimulationParameters", &[STRING]),
    ],
    column_descriptors: false,
};

/// *_eeg.json: acquisition descriptor for scalp EEG
pub static EEG: SidecarSpec = SidecarSpec {
    kind: SidecarKind::Eeg,
    name: "EegSidecar",
    format: SidecarFormat::Json,
    filename: "eeg.json",
    required: &[
        "TaskName",
        "EEGReference",
        "SamplingFrequency",
        "PowerLineFrequency",
        "SoftwareFilters",
    ],
    recommended: &[
        "TaskDescription",
        "Instructions",
        "CogAtlasID",
        "CogPOID",
        "InstitutionName",
        "InstitutionAddress",
        "InstitutionalDepartmentName",
        "Manufacturer",
        "ManufacturersModelName",
        "SoftwareVersions",
        "DeviceSerialNumber",
        "CapManufacturer",
        "CapManufacturersModelName",
        "EEGGround",
        "EEGChannelCount",
        "ECGChannelCount",
        "EMGChannelCount",
        "EOGChannelCount",
        "MISCChannelCount",
        "TriggerChannelCount",
        "RecordingDuration",
        "RecordingType",
        "HeadCircumference",
        "EEGPlacementScheme",
        "HardwareFilters",
        "SubjectArtefactDescription",
    ],
    optional: &[
        "EpochLength",
        "ElectricalStimulation",
        "ElectricalStimulationParameters",
    ],
    defaults: &[
        ("TaskName", Str("default_task")),
        ("EEGReference", Str("Cz")),
        ("SamplingFrequency", Float(256.0)),
        ("PowerLineFrequency", Int(60)),
        ("SoftwareFilters", Str("n/a")),
        ("Manufacturer", Str("Unknown")),
        ("ManufacturersModelName", Str("Unknown")),
        ("EEGGround", Str("n/a")),
        ("RecordingType", Str("continuous")),
        ("HeadCircumference", Str("n/a")),
        ("ElectricalStimulation", Bool(false)),
        ("Description", Str("Automatically generated EEG sidecar file.")),
    ],
    column_order: &[],
    numeric_fields: &[],
    numeric_severity: Severity::Warning,
    rules: &[EPOCHED_NEEDS_LENGTH],
    schema: Some(&EEG_SCHEMA),
    documentation: "Task, filtering and reference metadata for scalp EEG.",
};

pub static COORDSYSTEM_SCHEMA: SchemaDef = SchemaDef {
    title: "BIDS iEEG Coordinate System Sidecar",
    fields: &[
        FieldSchema::of("IntendedFor", &[STRING, StringArray]),
        FieldSchema::of("iEEGCoordinateSystem", &[STRING]),
        FieldSchema::of("iEEGCoordinateUnits", &[STRING]),
        FieldSchema::of("iEEGCoordinateSystemDescription", &[STRING]),
        FieldSchema::of("iEEGCoordinateProcessingDescription", &[STRING]),
        FieldSchema::of("iEEGCoordinateProcessingReference", &[STRING]),
    ],
    column_descriptors: false,
};

/// *_coordsystem.json: coordinate space of electrode positions
pub static COORDSYSTEM: SidecarSpec = SidecarSpec {
    kind: SidecarKind::CoordSystem,
    name: "CoordSystemSidecar",
    format: SidecarFormat::Json,
    filename: "coordsystem.json",
    required: &["iEEGCoordinateSystem", "iEEGCoordinateUnits"],
    recommended: &[
        "iEEGCoordinateSystemDescription",
        "iEEGCoordinateProcessingDescription",
        "iEEGCoordinateProcessingReference",
    ],
    optional: &["IntendedFor"],
    defaults: &[
        ("iEEGCoordinateSystem", Str("fsnative")),
        ("iEEGCoordinateUnits", Str("mm")),
        (
            "iEEGCoordinateSystemDescription",
            Str("Native FreeSurfer surface space."),
        ),
        (
            "iEEGCoordinateProcessingDescription",
            Str("Processed using FreeSurfer recon-all pipeline."),
        ),
        (
            "iEEGCoordinateProcessingReference",
            Str("Dale, A.M., Fischl, B., Sereno, M.I., 1999. Cortical surface-based analysis. NeuroImage."),
        ),
    ],
    column_order: &[],
    numeric_fields: &[],
    numeric_severity: Severity::Warning,
    rules: &[ConditionalRule {
        when_field: "iEEGCoordinateSystem",
        equals: "other",
        then_required: "iEEGCoordinateSystemDescription",
        default_satisfies: false,
    }],
    schema: Some(&COORDSYSTEM_SCHEMA),
    documentation: "Coordinate system, units and provenance of electrode coordinates.",
};

pub static PARTICIPANTS_SCHEMA: SchemaDef = SchemaDef {
    title: "BIDS Participants JSON",
    fields: &[],
    column_descriptors: true,
};

/// participants.json: dictionary describing the participants.tsv columns
pub static PARTICIPANTS_JSON: SidecarSpec = SidecarSpec {
    kind: SidecarKind::Participants,
    name: "ParticipantsSidecar",
    format: SidecarFormat::Json,
    filename: "participants.json",
    required: &["participant_id"],
    recommended: &["species", "age", "sex", "handedness", "strain", "strain_rrid"],
    optional: &["HED"],
    defaults: &[
        (
            "participant_id",
            Json(r#"{"Description": "Unique participant identifier", "Units": "string"}"#),
        ),
        (
            "species",
            Json(r#"{"Description": "Species of the participant", "Units": "Homo sapiens"}"#),
        ),
        (
            "population",
            Json(r#"{"Description": "Adult or pediatric", "Levels": {"A": "adult", "P": "pediatric"}}"#),
        ),
        (
            "sex",
            Json(r#"{"Description": "Biological sex of the participant", "Levels": {"M": "male", "F": "female"}}"#),
        ),
    ],
    column_order: &[],
    numeric_fields: &[],
    numeric_severity: Severity::Warning,
    rules: &[],
    schema: Some(&PARTICIPANTS_SCHEMA),
    documentation: "Column dictionary for participants.tsv; extra columns are expected.",
};

pub static DATASET_DESCRIPTION_SCHEMA: SchemaDef = SchemaDef {
    title: "BIDS Dataset Description",
    fields: &[
        FieldSchema::of("Name", &[STRING]),
        FieldSchema::of("BIDSVersion", &[STRING]),
        FieldSchema::of("HEDVersion", &[STRING, StringArray]),
        FieldSchema::one_of("DatasetType", &[STRING], &["raw", "derivative"]),
        FieldSchema::of("License", &[STRING]),
        FieldSchema::of("Authors", &[Array]),
        FieldSchema::of("GeneratedBy", &[Array]),
        FieldSchema::of("SourceDatasets", &[Array]),
        FieldSchema::of("Acknowledgements", &[STRING]),
        FieldSchema::of("HowToAcknowledge", &[STRING]),
        FieldSchema::of("Funding", &[StringArray]),
        FieldSchema::of("EthicsApprovals", &[StringArray]),
        FieldSchema::of("ReferencesAndLinks", &[STRING, StringArray]),
        FieldSchema::of("DatasetDOI", &[STRING]),
        FieldSchema::of("Keywords", &[StringArray]),
        FieldSchema::of("DatasetLinks", &[Object]),
    ],
    column_descriptors: false,
};

/// dataset_description.json: dataset-level identity and provenance
pub static DATASET_DESCRIPTION: SidecarSpec = SidecarSpec {
    kind: SidecarKind::DatasetDescription,
    name: "DatasetDescriptionSidecar",
    format: SidecarFormat::Json,
    filename: "dataset_description.json",
    required: &["Name", "BIDSVersion"],
    recommended: &[
        "HEDVersion",
        "DatasetType",
        "License",
        "Authors",
        "GeneratedBy",
        "SourceDatasets",
    ],
    optional: &[
        "Acknowledgements",
        "HowToAcknowledge",
        "Funding",
        "EthicsApprovals",
        "ReferencesAndLinks",
        "DatasetDOI",
        "Keywords",
        "DatasetLinks",
    ],
    defaults: &[("BIDSVersion", Str("1.10.1")), ("DatasetType", Str("raw"))],
    column_order: &[],
    numeric_fields: &[],
    numeric_severity: Severity::Warning,
    rules: &[ConditionalRule {
        when_field: "DatasetType",
        equals: "derivative",
        then_required: "GeneratedBy",
        default_satisfies: true,
    }],
    schema: Some(&DATASET_DESCRIPTION_SCHEMA),
    documentation: "Dataset name, BIDS version, authorship, licensing and funding.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_kind() {
        assert_eq!(SIDECAR_REGISTRY.len(), SidecarKind::all().len());
        for kind in SidecarKind::all() {
            assert!(SIDECAR_REGISTRY.iter().any(|s| s.kind == *kind));
        }
    }

    #[test]
    fn test_tsv_and_json_partition() {
        assert_eq!(tsv_specs().count(), 5);
        assert_eq!(json_specs().count(), 5);
        assert!(tsv_specs().all(|s| s.filename.ends_with(".tsv")));
        assert!(json_specs().all(|s| s.filename.ends_with(".json")));
    }

    #[test]
    fn test_only_electrodes_escalates_numeric_failures() {
        let escalating: Vec<_> = tsv_specs()
            .filter(|s| s.numeric_severity == Severity::Error)
            .map(|s| s.kind)
            .collect();
        assert_eq!(escalating, vec![SidecarKind::Electrodes]);
    }
}
