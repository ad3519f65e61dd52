use std::io::Write;
use std::path::Path;

/// Write JSON string to stdout or a file.
pub fn write_output(json: &str, output_path: Option<&str>) -> Result<(), String> {
    match output_path {
        Some(path) => std::fs::write(Path::new(path), json)
            .map_err(|e| format!("Failed to write output file '{}': {}", path, e)),
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(json.as_bytes())
                .and_then(|_| handle.write_all(b"\n"))
                .map_err(|e| format!("Failed to write to stdout: {}", e))
        }
    }
}

/// Serialize a value to pretty JSON.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {}", e))
}

/// Serialize and print a command result.
pub fn emit_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    write_output(&to_json(value)?, None)
}

/// Left-aligned table row, truncating cells that overflow their width.
pub fn table_row(cells: &[(&str, usize)]) -> String {
    let mut line = String::from(" ");
    for (text, width) in cells {
        let cell: String = if text.chars().count() > *width {
            text.chars().take(width.saturating_sub(1)).chain(['~']).collect()
        } else {
            text.to_string()
        };
        line.push(' ');
        line.push_str(&format!("{:<width$}", cell, width = *width));
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_row_pads_and_truncates() {
        assert_eq!(table_row(&[("a", 3), ("b", 2)]), "  a   b");
        assert_eq!(table_row(&[("abcdef", 4)]), "  abc~");
    }

    #[test]
    fn test_to_json_is_pretty() {
        let json = to_json(&serde_json::json!({"a": 1})).unwrap();
        assert_eq!(json, "{\n  \"a\": 1\n}");
    }
}
