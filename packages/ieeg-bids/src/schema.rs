//! Structural type checks for JSON sidecars.
//!
//! A small declarative subset of JSON Schema: each listed field accepts one of
//! a set of JSON types, optionally restricted to an enumeration of strings.
//! Fields not listed are unconstrained.

use crate::spec::{Record, NOT_AVAILABLE};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Accepted JSON shape for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    /// Any JSON number, integral or not
    Number,
    /// A number with no fractional part
    Integer,
    Boolean,
    Object,
    Array,
    /// An array whose items are all strings
    StringArray,
    Null,
    /// The literal "n/a" or "N/A"
    NotApplicable,
}

impl JsonType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            JsonType::String => value.is_string(),
            JsonType::Number => value.is_number(),
            JsonType::Integer => match value {
                Value::Number(n) => {
                    n.is_i64() || n.is_u64() || n.as_f64().map(|f| f.fract() == 0.0).unwrap_or(false)
                }
                _ => false,
            },
            JsonType::Boolean => value.is_boolean(),
            JsonType::Object => value.is_object(),
            JsonType::Array => value.is_array(),
            JsonType::StringArray => value
                .as_array()
                .map(|items| items.iter().all(Value::is_string))
                .unwrap_or(false),
            JsonType::Null => value.is_null(),
            JsonType::NotApplicable => value
                .as_str()
                .map(|s| NOT_AVAILABLE.contains(&s))
                .unwrap_or(false),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::StringArray => "array of strings",
            JsonType::Null => "null",
            JsonType::NotApplicable => "'n/a'",
        }
    }
}

/// Type constraint for one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub field: &'static str,
    pub accepts: &'static [JsonType],
    /// Allowed string values when non-empty
    pub allowed: &'static [&'static str],
}

impl FieldSchema {
    pub const fn of(field: &'static str, accepts: &'static [JsonType]) -> Self {
        Self {
            field,
            accepts,
            allowed: &[],
        }
    }

    pub const fn one_of(
        field: &'static str,
        accepts: &'static [JsonType],
        allowed: &'static [&'static str],
    ) -> Self {
        Self {
            field,
            accepts,
            allowed,
        }
    }

    fn check(&self, value: &Value) -> Option<String> {
        if !self.accepts.iter().any(|t| t.matches(value)) {
            let expected: Vec<&str> = self.accepts.iter().map(JsonType::name).collect();
            return Some(format!(
                "Schema error at ['{}']: {} is not of type {}",
                self.field,
                value,
                expected.join(" or ")
            ));
        }
        if !self.allowed.is_empty() {
            if let Some(s) = value.as_str() {
                if !self.allowed.contains(&s) {
                    return Some(format!(
                        "Schema error at ['{}']: {} is not one of {:?}",
                        self.field, value, self.allowed
                    ));
                }
            }
        }
        None
    }
}

/// Declarative schema for a JSON sidecar
#[derive(Debug, Clone, Copy)]
pub struct SchemaDef {
    pub title: &'static str,
    pub fields: &'static [FieldSchema],
    /// Every identifier-like key must map to a column descriptor object
    /// (`Description`/`Units` strings, `Levels` object).
    pub column_descriptors: bool,
}

fn column_key_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").ok())
        .as_ref()
}

const DESCRIPTOR_FIELDS: &[FieldSchema] = &[
    FieldSchema::of("Description", &[JsonType::String]),
    FieldSchema::of("Units", &[JsonType::String]),
    FieldSchema::of("Levels", &[JsonType::Object]),
];

impl SchemaDef {
    /// Collect every violation in the record. An empty result means the record conforms.
    pub fn check(&self, record: &Record) -> Vec<String> {
        let mut errors = Vec::new();

        for field in self.fields {
            if let Some(value) = record.get(field.field) {
                if let Some(err) = field.check(value) {
                    errors.push(err);
                }
            }
        }

        if self.column_descriptors {
            for (key, value) in record {
                if !column_key_pattern().is_some_and(|re| re.is_match(key)) {
                    continue;
                }
                let Some(descriptor) = value.as_object() else {
                    errors.push(format!(
                        "Schema error at ['{}']: {} is not of type object",
                        key, value
                    ));
                    continue;
                };
                for field in DESCRIPTOR_FIELDS {
                    if let Some(inner) = descriptor.get(field.field) {
                        if let Some(err) = field.check(inner) {
                            errors.push(err.replacen("['", &format!("['{}', '", key), 1));
                        }
                    }
                }
            }
        }

        errors.sort();
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    const SAMPLE: SchemaDef = SchemaDef {
        title: "sample",
        fields: &[
            FieldSchema::of("SamplingFrequency", &[JsonType::Number]),
            FieldSchema::of(
                "PowerLineFrequency",
                &[JsonType::Number, JsonType::NotApplicable],
            ),
            FieldSchema::one_of(
                "RecordingType",
                &[JsonType::String],
                &["continuous", "epoched"],
            ),
            FieldSchema::of("EEGChannelCount", &[JsonType::Integer]),
            FieldSchema::of("IntendedFor", &[JsonType::String, JsonType::StringArray]),
        ],
        column_descriptors: false,
    };

    #[test]
    fn test_conforming_record_has_no_errors() {
        let rec = record(json!({
            "SamplingFrequency": 512,
            "PowerLineFrequency": "n/a",
            "RecordingType": "epoched",
            "EEGChannelCount": 64.0,
            "IntendedFor": ["a.nii.gz", "b.nii.gz"],
            "Unlisted": {"anything": true}
        }));
        assert!(SAMPLE.check(&rec).is_empty());
    }

    #[test]
    fn test_type_mismatches_are_collected() {
        let rec = record(json!({
            "SamplingFrequency": "n/a",
            "PowerLineFrequency": "sixty",
            "RecordingType": "discontinuous",
            "EEGChannelCount": 1.5,
            "IntendedFor": [1, 2]
        }));
        let errors = SAMPLE.check(&rec);
        assert_eq!(errors.len(), 5);
        assert!(errors
            .iter()
            .any(|e| e.contains("['SamplingFrequency']") && e.contains("number")));
    }

    #[test]
    fn test_boolean_is_not_a_number() {
        let rec = record(json!({"SamplingFrequency": true}));
        assert_eq!(SAMPLE.check(&rec).len(), 1);
    }

    #[test]
    fn test_column_descriptor_shape() {
        let schema = SchemaDef {
            title: "participants",
            fields: &[],
            column_descriptors: true,
        };
        let ok = record(json!({
            "sex": {"Description": "Biological sex", "Levels": {"M": "male"}},
            "age": {"Description": "Age", "Units": "years"}
        }));
        assert!(schema.check(&ok).is_empty());

        let bad = record(json!({
            "sex": "male",
            "age": {"Description": 12, "Levels": []}
        }));
        let errors = schema.check(&bad);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("['age', 'Description']")));
    }
}
