//! Right-biased merge of caller values over per-type defaults.

use crate::spec::{Record, SidecarSpec};

/// `{**defaults, **supplied}`: supplied keys win, absent keys fall back to the
/// spec's defaults, keys in neither stay absent.
///
/// Default keys keep their declaration order; supplied-only keys follow in
/// the order they were given.
pub fn merge_with_defaults(spec: &SidecarSpec, supplied: &Record) -> Record {
    let mut merged = spec.default_record();
    for (key, value) in supplied {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Merge every row independently against the same defaults.
pub fn merge_rows(spec: &SidecarSpec, rows: &[Record]) -> Vec<Record> {
    rows.iter().map(|row| merge_with_defaults(spec, row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SidecarKind;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_supplied_values_win() {
        let spec = SidecarKind::Channels.spec();
        let merged = merge_with_defaults(spec, &record(json!({"name": "LA01", "units": "mV"})));
        assert_eq!(merged["units"], json!("mV"));
        assert_eq!(merged["type"], json!("SEEG"));
        assert_eq!(merged["name"], json!("LA01"));
        assert!(!merged.contains_key("description"));
    }

    #[test]
    fn test_merge_property_holds_for_every_kind() {
        let supplied = record(json!({"name": "X", "TaskName": "rest", "extra_col": 3}));
        for kind in SidecarKind::all() {
            let spec = kind.spec();
            let merged = merge_with_defaults(spec, &supplied);
            for (key, value) in &merged {
                match supplied.get(key) {
                    Some(v) => assert_eq!(v, value),
                    None => assert_eq!(spec.default_for(key).as_ref(), Some(value)),
                }
            }
            for key in supplied.keys() {
                assert!(merged.contains_key(key));
            }
            for (key, _) in spec.defaults {
                assert!(merged.contains_key(*key));
            }
        }
    }

    #[test]
    fn test_defaults_precede_supplied_keys() {
        let spec = SidecarKind::Events.spec();
        let merged = merge_with_defaults(spec, &record(json!({"onset": 1.5})));
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["duration", "trial_type", "onset"]);
    }

    #[test]
    fn test_rows_are_merged_independently() {
        let spec = SidecarKind::Electrodes.spec();
        let rows = vec![
            record(json!({"name": "A1", "size": 2})),
            record(json!({"name": "A2"})),
        ];
        let merged = merge_rows(spec, &rows);
        assert_eq!(merged[0]["size"], json!(2));
        assert_eq!(merged[1]["size"], json!("n/a"));
    }
}
