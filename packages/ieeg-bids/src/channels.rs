//! Channel rows for channels.tsv built from a dataset's package listing.
//!
//! Each `.mef` package is one recorded channel. Its name is cleaned, typed
//! through the channel lookup table, and grouped under its parent folder.

use crate::error::Result;
use crate::package::Package;
use crate::spec::Record;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Package kinds the channel builder cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageClass {
    IeegJson,
    ElectrodesCsv,
    ElectrodesTxt,
    Mef,
}

pub fn classify_package(name: &str) -> Option<PackageClass> {
    let lower = name.trim().to_lowercase();
    if lower.ends_with("implant_ieeg.json") {
        Some(PackageClass::IeegJson)
    } else if lower == "electrodes2roi_mni.csv" {
        Some(PackageClass::ElectrodesCsv)
    } else if lower == "electrodes.txt" {
        Some(PackageClass::ElectrodesTxt)
    } else if lower.ends_with(".mef") {
        Some(PackageClass::Mef)
    } else {
        None
    }
}

/// Normalise a package name to a channel label: `LA01-Ref.mef` -> `LA01`.
pub fn clean_channel_name(package_name: &str) -> String {
    let lower = package_name.to_lowercase();
    let lower = lower.strip_suffix(".mef").unwrap_or(&lower);
    let stripped = lower.replace("eeg", "").replace("-ref", "");
    stripped
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .trim()
        .to_uppercase()
}

struct ChannelClass {
    channel_type: &'static str,
    names: &'static [&'static str],
    /// Fixed group; `None` means the channel name is its own group
    group: Option<&'static str>,
}

const CHANNEL_CLASSES: &[ChannelClass] = &[
    ChannelClass {
        channel_type: "ECG",
        names: &["EKG", "EKG1", "EKG2", "ECG", "ECG1", "ECG2"],
        group: Some("n/a"),
    },
    ChannelClass {
        channel_type: "EEG",
        names: &[
            "C3", "C03", "C4", "C04", "CZ", "F3", "F4", "F7", "F8", "FP1", "FP2", "FZ", "O1",
            "O2", "P3", "P4", "PZ", "T3", "T4", "T5", "T6",
        ],
        group: None,
    },
    ChannelClass {
        channel_type: "EOG",
        names: &["LOC", "ROC"],
        group: None,
    },
    ChannelClass {
        channel_type: "EMG",
        names: &["EMG", "EMG1", "EMG2"],
        group: None,
    },
];

/// BIDS channel type and group for a cleaned channel name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub channel_type: String,
    pub group: String,
}

pub fn channel_info(name: &str) -> ChannelInfo {
    let upper = name.to_uppercase();
    if upper == "REF" || upper == "GND" {
        return ChannelInfo {
            channel_type: "unknown".into(),
            group: "unknown".into(),
        };
    }

    for class in CHANNEL_CLASSES {
        if class.names.contains(&name) {
            return ChannelInfo {
                channel_type: class.channel_type.into(),
                group: class.group.unwrap_or(name).into(),
            };
        }
    }

    // Depth electrodes share a two-letter prefix per shaft.
    ChannelInfo {
        channel_type: "SEEG".into(),
        group: name.chars().take(2).collect(),
    }
}

/// One channels.tsv row for a `.mef` package.
///
/// EKG channels carry no reference or ground and no high cutoff.
pub fn build_channel_row(
    package_name: &str,
    sampling_frequency: &Value,
    reference: &str,
    ground: &str,
) -> Record {
    let name = clean_channel_name(package_name);
    let info = channel_info(&name);
    let is_ekg = name.to_lowercase().contains("ekg");

    let mut row = Record::new();
    row.insert("name".into(), Value::String(name));
    row.insert("type".into(), Value::String(info.channel_type));
    row.insert("units".into(), "uV".into());
    row.insert("low_cutoff".into(), "n/a".into());
    row.insert(
        "high_cutoff".into(),
        if is_ekg { "n/a" } else { "0.01" }.into(),
    );
    row.insert(
        "reference".into(),
        if is_ekg { "unknown" } else { reference }.into(),
    );
    row.insert(
        "ground".into(),
        if is_ekg { "unknown" } else { ground }.into(),
    );
    row.insert("group".into(), Value::String(info.group));
    row.insert("sampling_frequency".into(), sampling_frequency.clone());
    row.insert("notch".into(), "n/a".into());
    row
}

/// Settings shared by every row of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSettings {
    pub reference: String,
    pub ground: String,
    pub sampling_frequency: Value,
    /// Per-folder sampling frequency, keyed by parent package id
    pub sampling_frequency_by_parent: HashMap<String, Value>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            reference: "unknown".into(),
            ground: "unknown".into(),
            sampling_frequency: Value::String("n/a".into()),
            sampling_frequency_by_parent: HashMap::new(),
        }
    }
}

/// Channel rows grouped by parent package id (`""` for root-level files),
/// each group sorted by lowercase channel name. Deleted packages are skipped.
pub fn channel_rows_by_parent(
    packages: &[Package],
    settings: &ChannelSettings,
) -> BTreeMap<String, Vec<Record>> {
    let mut by_parent: BTreeMap<String, Vec<Record>> = BTreeMap::new();

    for pkg in packages {
        if pkg.is_deleted() || classify_package(pkg.name()) != Some(PackageClass::Mef) {
            continue;
        }
        let parent = pkg.parent_id().unwrap_or_default().to_string();
        let frequency = settings
            .sampling_frequency_by_parent
            .get(&parent)
            .unwrap_or(&settings.sampling_frequency);
        let row = build_channel_row(pkg.name(), frequency, &settings.reference, &settings.ground);
        by_parent.entry(parent).or_default().push(row);
    }

    for rows in by_parent.values_mut() {
        rows.sort_by_key(|row| {
            row.get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_lowercase()
        });
    }
    by_parent
}

/// Channel-type tallies written into the iEEG sidecar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChannelCounts {
    #[serde(rename = "ECOGChannelCount")]
    pub ecog: u32,
    #[serde(rename = "SEEGChannelCount")]
    pub seeg: u32,
    #[serde(rename = "EEGChannelCount")]
    pub eeg: u32,
    #[serde(rename = "EOGChannelCount")]
    pub eog: u32,
    #[serde(rename = "ECGChannelCount")]
    pub ecg: u32,
    #[serde(rename = "EMGChannelCount")]
    pub emg: u32,
    #[serde(rename = "MiscChannelCount")]
    pub misc: u32,
    #[serde(rename = "TriggerChannelCount")]
    pub trigger: u32,
}

impl ChannelCounts {
    pub fn add(&mut self, channel_type: &str) {
        match channel_type.trim().to_lowercase().as_str() {
            "ecog" => self.ecog += 1,
            "seeg" => self.seeg += 1,
            "eeg" => self.eeg += 1,
            "eog" => self.eog += 1,
            "ecg" => self.ecg += 1,
            "emg" => self.emg += 1,
            "trig" => self.trigger += 1,
            _ => self.misc += 1,
        }
    }

    pub fn from_rows(rows: &[Record]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            counts.add(row.get("type").and_then(Value::as_str).unwrap_or_default());
        }
        counts
    }

    /// Fields to merge into an iEEG sidecar
    pub fn to_record(&self) -> Record {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Record::new(),
        }
    }
}

/// `EPS Number -> (iEEGReference, iEEGGround)` from the master CSV.
/// Blank cells become "unknown"; rows without an EPS number are ignored.
pub fn load_reference_map(path: &Path) -> Result<HashMap<String, (String, String)>> {
    let reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    reference_map_from_reader(reader)
}

pub fn reference_map_from_reader<R: std::io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<HashMap<String, (String, String)>> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (eps_col, ref_col, gnd_col) = (
        column("EPS Number"),
        column("iEEGReference"),
        column("iEEGGround"),
    );

    let cell = |record: &csv::StringRecord, col: Option<usize>| -> String {
        let value = col.and_then(|c| record.get(c)).unwrap_or("").trim();
        if value.is_empty() {
            "unknown".to_string()
        } else {
            value.to_string()
        }
    };

    let mut map = HashMap::new();
    for record in reader.records() {
        let record = record?;
        let eps = eps_col.and_then(|c| record.get(c)).unwrap_or("").trim();
        if eps.is_empty() {
            continue;
        }
        map.insert(
            eps.to_string(),
            (cell(&record, ref_col), cell(&record, gnd_col)),
        );
    }
    log::debug!("Loaded reference/ground for {} datasets", map.len());
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_package() {
        assert_eq!(classify_package("sub-1_implant_ieeg.json"), Some(PackageClass::IeegJson));
        assert_eq!(classify_package(" Electrodes2ROI_MNI.csv "), Some(PackageClass::ElectrodesCsv));
        assert_eq!(classify_package("electrodes.txt"), Some(PackageClass::ElectrodesTxt));
        assert_eq!(classify_package("LA01.MEF"), Some(PackageClass::Mef));
        assert_eq!(classify_package("notes.txt"), None);
    }

    #[test]
    fn test_clean_channel_name() {
        assert_eq!(clean_channel_name("LA01.mef"), "LA01");
        assert_eq!(clean_channel_name("EEG Fp1-Ref.mef"), "FP1");
        assert_eq!(clean_channel_name("ekg_1.mef"), "EKG1");
        assert_eq!(clean_channel_name("C3"), "C3");
    }

    #[test]
    fn test_channel_info_lookup() {
        assert_eq!(channel_info("EKG1"), ChannelInfo { channel_type: "ECG".into(), group: "n/a".into() });
        assert_eq!(channel_info("FZ"), ChannelInfo { channel_type: "EEG".into(), group: "FZ".into() });
        assert_eq!(channel_info("LOC").group, "LOC");
        assert_eq!(channel_info("EMG2").channel_type, "EMG");
        assert_eq!(channel_info("ref").channel_type, "unknown");
        assert_eq!(channel_info("GND").group, "unknown");
        assert_eq!(channel_info("LA01"), ChannelInfo { channel_type: "SEEG".into(), group: "LA".into() });
        assert_eq!(channel_info("X").group, "X");
    }

    #[test]
    fn test_ekg_rows_drop_reference() {
        let row = build_channel_row("EKG1.mef", &json!(512), "LE10", "RF6");
        assert_eq!(row["type"], json!("ECG"));
        assert_eq!(row["reference"], json!("unknown"));
        assert_eq!(row["ground"], json!("unknown"));
        assert_eq!(row["high_cutoff"], json!("n/a"));
        assert_eq!(row["sampling_frequency"], json!(512));

        let row = build_channel_row("LA01.mef", &json!("n/a"), "LE10", "RF6");
        assert_eq!(row["reference"], json!("LE10"));
        assert_eq!(row["high_cutoff"], json!("0.01"));
        assert_eq!(row["group"], json!("LA"));
    }

    #[test]
    fn test_rows_grouped_and_sorted() {
        let packages = vec![
            Package::collection("D1", "D01"),
            Package::new("1", "lb02.mef").with_parent("D1"),
            Package::new("2", "LA01.mef").with_parent("D1"),
            Package::new("3", "LA03.mef").with_parent("D1").with_state("DELETED"),
            Package::new("4", "sub_implant_ieeg.json").with_parent("D1"),
            Package::new("5", "EKG.mef"),
        ];
        let mut settings = ChannelSettings::default();
        settings
            .sampling_frequency_by_parent
            .insert("D1".into(), json!(1024));

        let by_parent = channel_rows_by_parent(&packages, &settings);
        assert_eq!(by_parent.len(), 2);
        let names: Vec<&str> = by_parent["D1"].iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["LA01", "LB02"]);
        assert_eq!(by_parent["D1"][0]["sampling_frequency"], json!(1024));
        assert_eq!(by_parent[""][0]["sampling_frequency"], json!("n/a"));
    }

    #[test]
    fn test_channel_counts() {
        let rows: Vec<Record> = ["SEEG", "seeg", "EEG", "ECG", "TRIG", "unknown", "ECOG"]
            .iter()
            .map(|t| json!({"type": t}).as_object().cloned().unwrap())
            .collect();
        let counts = ChannelCounts::from_rows(&rows);
        assert_eq!(counts.seeg, 2);
        assert_eq!(counts.trigger, 1);
        assert_eq!(counts.misc, 1);
        let record = counts.to_record();
        assert_eq!(record["SEEGChannelCount"], json!(2));
        assert_eq!(record["ECOGChannelCount"], json!(1));
        assert_eq!(record.len(), 8);
    }

    #[test]
    fn test_reference_map() {
        let data = "EPS Number,iEEGReference,iEEGGround\nEPS0000049,LE10,\n,X,Y\nEPS0000050, , RF6\n";
        let reader = csv::ReaderBuilder::new().from_reader(data.as_bytes());
        let map = reference_map_from_reader(reader).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["EPS0000049"], ("LE10".to_string(), "unknown".to_string()));
        assert_eq!(map["EPS0000050"], ("unknown".to_string(), "RF6".to_string()));
    }
}
