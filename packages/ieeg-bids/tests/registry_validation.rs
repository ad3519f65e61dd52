//! Registry consistency tests
//!
//! Every sidecar spec must be internally coherent: disjoint field classes,
//! defaults and column order drawn from known fields, rules that reference
//! real fields.

use ieeg_bids::registry::{json_specs, tsv_specs};
use ieeg_bids::*;
use std::collections::HashSet;

/// Expected registry contents - canonical source of truth for tests
mod expected {
    pub const SIDECARS: &[(&str, &str, &str)] = &[
        // (kind name, filename, format)
        ("channels", "channels.tsv", "tsv"),
        ("electrodes", "electrodes.tsv", "tsv"),
        ("events", "events.tsv", "tsv"),
        ("participants_tsv", "participants.tsv", "tsv"),
        ("sessions", "sessions.tsv", "tsv"),
        ("ieeg", "ieeg.json", "json"),
        ("eeg", "eeg.json", "json"),
        ("coordsystem", "coordsystem.json", "json"),
        ("participants", "participants.json", "json"),
        ("dataset_description", "dataset_description.json", "json"),
    ];

    pub const CHANNEL_COLUMNS: &[&str] = &[
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
    ];
}

// =============================================================================
// REGISTRY CONTENTS
// =============================================================================

#[test]
fn test_all_sidecars_present() {
    assert_eq!(SIDECAR_REGISTRY.len(), expected::SIDECARS.len());

    for (name, filename, format) in expected::SIDECARS {
        let kind = SidecarKind::from_name(name).unwrap_or_else(|| panic!("{} not registered", name));
        let spec = kind.spec();
        assert_eq!(spec.filename, *filename, "Filename mismatch for {}", name);
        assert_eq!(spec.format.extension(), *format, "Format mismatch for {}", name);
    }
}

#[test]
fn test_names_are_unique() {
    let names: HashSet<&str> = SIDECAR_REGISTRY.iter().map(|s| s.name).collect();
    assert_eq!(names.len(), SIDECAR_REGISTRY.len());

    let filenames: HashSet<&str> = SIDECAR_REGISTRY.iter().map(|s| s.filename).collect();
    assert_eq!(filenames.len(), SIDECAR_REGISTRY.len());
}

#[test]
fn test_channel_column_order() {
    assert_eq!(SidecarKind::Channels.spec().column_order, expected::CHANNEL_COLUMNS);
}

// =============================================================================
// FIELD TAXONOMY
// =============================================================================

#[test]
fn test_field_classes_are_disjoint() {
    for spec in SIDECAR_REGISTRY {
        let required = spec.required_set();
        let recommended = spec.recommended_set();
        let optional = spec.optional_set();
        assert!(required.is_disjoint(&recommended), "{}", spec.name);
        assert!(required.is_disjoint(&optional), "{}", spec.name);
        assert!(recommended.is_disjoint(&optional), "{}", spec.name);
        assert_eq!(
            spec.known_fields().len(),
            required.len() + recommended.len() + optional.len(),
            "{} declares a field twice",
            spec.name
        );
    }
}

#[test]
fn test_every_type_has_required_fields() {
    for spec in SIDECAR_REGISTRY {
        assert!(!spec.required.is_empty(), "{} has no required fields", spec.name);
    }
}

#[test]
fn test_tsv_columns_are_known() {
    for spec in tsv_specs() {
        for column in spec.column_order {
            assert!(spec.is_known(column), "{}: unknown column {}", spec.name, column);
        }
        for field in spec.numeric_fields {
            assert!(spec.is_known(field), "{}: unknown numeric field {}", spec.name, field);
        }
        for field in spec.required {
            assert!(
                spec.column_order.contains(field),
                "{}: required column {} missing from column order",
                spec.name,
                field
            );
        }
    }
}

#[test]
fn test_json_specs_have_schemas() {
    for spec in json_specs() {
        assert!(spec.schema.is_some(), "{} has no schema", spec.name);
        assert!(spec.column_order.is_empty());
        assert!(spec.numeric_fields.is_empty());
    }
    for spec in tsv_specs() {
        assert!(spec.schema.is_none());
    }
}

#[test]
fn test_rules_reference_known_fields() {
    for spec in SIDECAR_REGISTRY {
        for rule in spec.rules {
            assert!(spec.is_known(rule.when_field), "{}: {}", spec.name, rule.describe());
            assert!(spec.is_known(rule.then_required), "{}: {}", spec.name, rule.describe());
        }
    }
}

// =============================================================================
// DEFAULTS
// =============================================================================

#[test]
fn test_default_keys_are_unique() {
    for spec in SIDECAR_REGISTRY {
        let keys: HashSet<&str> = spec.defaults.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.len(), spec.defaults.len(), "{}", spec.name);
    }
}

#[test]
fn test_tsv_defaults_are_known_columns() {
    for spec in tsv_specs() {
        for (field, _) in spec.defaults {
            assert!(spec.is_known(field), "{}: default for unknown field {}", spec.name, field);
        }
    }
}

#[test]
fn test_default_only_json_sidecars_match_their_schema() {
    // The iEEG default sampling frequency is the "n/a" placeholder and must be
    // supplied by the caller before the record conforms.
    for spec in json_specs() {
        let Some(schema) = spec.schema else { continue };
        let violations = schema.check(&spec.default_record());
        if spec.kind == SidecarKind::Ieeg {
            assert_eq!(violations.len(), 1, "{:?}", violations);
            assert!(violations[0].contains("SamplingFrequency"));
        } else {
            assert!(violations.is_empty(), "{}: {:?}", spec.name, violations);
        }
    }
}
