//! Tab-separated sidecar writer and reader.

use crate::error::Result;
use crate::spec::Record;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Header order for a row set: declared columns that are present, then any
/// remaining columns sorted alphabetically.
pub fn ordered_columns(column_order: &[&str], rows: &[Record]) -> Vec<String> {
    let present: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut columns: Vec<String> = column_order
        .iter()
        .filter(|c| present.contains(*c))
        .map(|c| c.to_string())
        .collect();

    columns.extend(
        present
            .iter()
            .filter(|c| !column_order.contains(c))
            .map(|c| c.to_string()),
    );
    columns
}

/// String form of a cell. Missing and null cells are empty.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Write rows under `columns` as a tab-delimited file with a header line.
pub fn write_tsv(path: &Path, columns: &[String], rows: &[Record]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)?;

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| cell_text(row.get(c))))?;
    }
    writer.flush()?;

    log::debug!("Wrote {} TSV rows to {}", rows.len(), path.display());
    Ok(())
}

/// Header and string rows of a TSV file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TsvTable {
    /// Rows keyed by header name; every value is a string.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.header
                    .iter()
                    .zip(row)
                    .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                    .collect()
            })
            .collect()
    }
}

pub fn read_tsv(path: &Path) -> Result<TsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)?;

    let header = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(TsvTable { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_ordered_columns_appends_extras_sorted() {
        let rows = vec![
            record(json!({"zeta": 1, "name": "A", "type": "SEEG"})),
            record(json!({"alpha": 2, "name": "B"})),
        ];
        let columns = ordered_columns(&["name", "type", "units"], &rows);
        assert_eq!(columns, vec!["name", "type", "alpha", "zeta"]);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(None), "");
        assert_eq!(cell_text(Some(&Value::Null)), "");
        assert_eq!(cell_text(Some(&json!("uV"))), "uV");
        assert_eq!(cell_text(Some(&json!(0.01))), "0.01");
        assert_eq!(cell_text(Some(&json!(256))), "256");
        assert_eq!(cell_text(Some(&json!(false))), "false");
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.tsv");
        let rows = vec![
            record(json!({"onset": 1.5, "duration": "n/a"})),
            record(json!({"onset": 3, "trial_type": "seizure onset"})),
        ];
        let columns = ordered_columns(&["onset", "duration", "trial_type"], &rows);
        write_tsv(&path, &columns, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "onset\tduration\ttrial_type\n1.5\tn/a\t\n3\t\tseizure onset\n"
        );

        let table = read_tsv(&path).unwrap();
        assert_eq!(table.header, columns);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.records()[1]["trial_type"], json!("seizure onset"));
    }
}
