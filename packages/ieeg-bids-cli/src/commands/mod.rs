pub mod channels;
pub mod dataset;
pub mod fields;
pub mod generate;
pub mod paths;
pub mod validate;

use ieeg_bids::package::load_packages;
use ieeg_bids::tsv::read_tsv;
use ieeg_bids::Package;
use serde_json::Value;
use std::path::Path;

/// Read a JSON input file, or a TSV file as an array of string-valued rows.
pub fn read_input(path: &str) -> Result<Value, String> {
    let path = Path::new(path);
    if !path.is_file() {
        return Err(format!("File not found: {}", path.display()));
    }

    let is_tsv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
    if is_tsv {
        let table = read_tsv(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        return Ok(Value::Array(
            table.records().into_iter().map(Value::Object).collect(),
        ));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("Invalid JSON in '{}': {}", path.display(), e))
}

pub fn read_packages(path: &str) -> Result<Vec<Package>, String> {
    load_packages(Path::new(path)).map_err(|e| format!("Failed to load packages from '{}': {}", path, e))
}
