use crate::spec::Severity;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_JSON_INDENT: usize = 4;

/// Directories a sidecar build reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathConfig {
    /// Where sidecar files are written
    pub output_dir: PathBuf,
    /// Source directory for downloaded content
    pub input_dir: PathBuf,
    /// Dataset root prefix
    pub bids_path: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output/"),
            input_dir: PathBuf::from("input/"),
            bids_path: PathBuf::from("bids_root/"),
        }
    }
}

impl PathConfig {
    /// Load from the environment (and `.env` if present), falling back to defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            output_dir: env::var("IEEG_BIDS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            input_dir: env::var("IEEG_BIDS_INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.input_dir),
            bids_path: env::var("IEEG_BIDS_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.bids_path),
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

/// Per-instance sidecar options
#[derive(Debug, Clone, PartialEq)]
pub struct SidecarOptions {
    pub paths: PathConfig,
    /// Overrides the type's default output filename
    pub filename: Option<String>,
    pub json_indent: usize,
    /// Overrides the type's numeric-check severity
    pub numeric_severity: Option<Severity>,
}

impl Default for SidecarOptions {
    fn default() -> Self {
        Self {
            paths: PathConfig::default(),
            filename: None,
            json_indent: DEFAULT_JSON_INDENT,
            numeric_severity: None,
        }
    }
}

impl SidecarOptions {
    pub fn with_paths(mut self, paths: PathConfig) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_json_indent(mut self, indent: usize) -> Self {
        self.json_indent = indent;
        self
    }

    pub fn with_numeric_severity(mut self, severity: Severity) -> Self {
        self.numeric_severity = Some(severity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SidecarOptions::default();
        assert_eq!(options.json_indent, 4);
        assert_eq!(options.paths.output_dir, PathBuf::from("output/"));
        assert_eq!(options.paths.bids_path, PathBuf::from("bids_root/"));
        assert!(options.filename.is_none());
        assert!(options.numeric_severity.is_none());
    }

    #[test]
    fn test_builders() {
        let options = SidecarOptions::default()
            .with_filename("sub-01_channels.tsv")
            .with_json_indent(2)
            .with_numeric_severity(Severity::Error)
            .with_paths(PathConfig::default().with_output_dir("/tmp/out"));
        assert_eq!(options.filename.as_deref(), Some("sub-01_channels.tsv"));
        assert_eq!(options.json_indent, 2);
        assert_eq!(options.numeric_severity, Some(Severity::Error));
        assert_eq!(options.paths.output_dir, PathBuf::from("/tmp/out"));
    }
}
