use clap::{Args, Parser, Subcommand};
use ieeg_bids::{Severity, SidecarKind};
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "ieegbids",
    version,
    about = "BIDS sidecar generation and validation for clinical iEEG datasets",
    long_about = "Generate and validate BIDS sidecars (channels, electrodes, events, participants,\n\
                  sessions, ieeg, eeg, coordsystem, dataset_description) and reconcile dataset\n\
                  package listings. Dataset operations run against a dry-run API."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// List REQUIRED / RECOMMENDED / OPTIONAL fields per sidecar type
    Fields(FieldsArgs),
    /// Build a sidecar from JSON input and save it
    Generate(GenerateArgs),
    /// Validate a JSON object, JSON row array or TSV file
    Validate(ValidateArgs),
    /// Resolve dataset-relative paths from a package listing
    Paths(PathsArgs),
    /// Write channels.tsv files from a package listing
    Channels(ChannelsArgs),
    /// Duplicate reconciliation and cleanup (dry run)
    #[command(subcommand)]
    Dataset(DatasetCommand),
}

#[derive(Args)]
pub struct FieldsArgs {
    /// Sidecar type (all types when omitted)
    #[arg(long, value_parser = parse_sidecar_kind)]
    pub sidecar: Option<SidecarKind>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Sidecar type, e.g. channels, ieeg, coordsystem
    #[arg(long, value_parser = parse_sidecar_kind)]
    pub sidecar: SidecarKind,

    /// JSON input: an object for JSON sidecars, an array of objects for TSV sidecars
    #[arg(long)]
    pub input: String,

    /// Output directory
    #[arg(long, env = "IEEG_BIDS_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Explicit output file (overrides --output-dir and --filename)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output filename (default: the type's BIDS filename)
    #[arg(long)]
    pub filename: Option<String>,

    /// JSON indentation width
    #[arg(long, default_value_t = ieeg_bids::config::DEFAULT_JSON_INDENT)]
    pub indent: usize,

    /// Validate before saving and log the findings
    #[arg(long, default_value_t = false)]
    pub validate: bool,

    /// Refuse to save when validation reports errors
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Severity of failed numeric checks (warning or error)
    #[arg(long, value_parser = parse_severity)]
    pub numeric_severity: Option<Severity>,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Sidecar type
    #[arg(long, value_parser = parse_sidecar_kind)]
    pub sidecar: SidecarKind,

    /// Input file (.json or .tsv)
    #[arg(long)]
    pub input: String,

    /// Treat warnings as failures
    #[arg(long, default_value_t = false)]
    pub strict: bool,

    /// Severity of failed numeric checks (warning or error)
    #[arg(long, value_parser = parse_severity)]
    pub numeric_severity: Option<Severity>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct PathsArgs {
    /// Package listing JSON (array or {"packages": [...]})
    #[arg(long)]
    pub packages: String,

    /// Only files whose path or name matches this glob
    #[arg(long)]
    pub pattern: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct ChannelsArgs {
    /// Package listing JSON
    #[arg(long)]
    pub packages: String,

    /// Output root directory
    #[arg(short, long, env = "IEEG_BIDS_OUTPUT_DIR")]
    pub output: String,

    /// Dataset name; enables the clinical BIDS layout under the output root
    #[arg(long)]
    pub dataset: Option<String>,

    /// Reference electrode
    #[arg(long)]
    pub reference: Option<String>,

    /// Ground electrode
    #[arg(long)]
    pub ground: Option<String>,

    /// Master CSV with "EPS Number", "iEEGReference" and "iEEGGround" columns
    #[arg(long)]
    pub reference_map: Option<String>,

    /// Sampling frequency in Hz
    #[arg(long, default_value = "n/a")]
    pub sampling_frequency: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum DatasetCommand {
    /// Replace original files with their "(1)" re-uploads
    CleanupDuplicates(CleanupDuplicatesArgs),
    /// Delete files whose path or name matches a glob
    DeletePattern(DeletePatternArgs),
    /// Delete files by dataset-relative path
    DeletePath(DeletePathArgs),
}

#[derive(Args)]
pub struct DatasetArgs {
    /// Package listing JSON for the dataset
    #[arg(long)]
    pub packages: String,

    /// Dataset name
    #[arg(long)]
    pub dataset: String,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanupDuplicatesArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Candidate paths ("{dataset}" is replaced with the dataset name)
    #[arg(long = "file", required = true, num_args = 1..)]
    pub files: Vec<String>,
}

#[derive(Args)]
pub struct DeletePatternArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Glob such as "*.tsv" or "sub-*/*_channels.tsv"
    #[arg(long)]
    pub pattern: String,
}

#[derive(Args)]
pub struct DeletePathArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Dataset-relative file paths
    #[arg(long = "path", required = true, num_args = 1..)]
    pub paths: Vec<String>,
}

/// Parse a sidecar type name such as "channels" or "dataset_description".
pub fn parse_sidecar_kind(s: &str) -> Result<SidecarKind, String> {
    SidecarKind::parse(s).map_err(|e| {
        let names: Vec<&str> = SidecarKind::all().iter().map(|k| k.as_str()).collect();
        format!("{}. Known types: {}", e, names.join(", "))
    })
}

pub fn parse_severity(s: &str) -> Result<Severity, String> {
    s.parse::<Severity>()
        .map_err(|_| format!("Invalid severity '{}': expected warning or error", s))
}

/// Numeric frequencies become JSON numbers; anything else ("n/a") stays a string.
pub fn frequency_value(s: &str) -> Value {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::from(n);
    }
    match trimmed.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::from(f),
        _ => Value::String(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sidecar_kind() {
        assert_eq!(parse_sidecar_kind("channels").unwrap(), SidecarKind::Channels);
        assert_eq!(
            parse_sidecar_kind("dataset_description").unwrap(),
            SidecarKind::DatasetDescription
        );
        let err = parse_sidecar_kind("nifti").unwrap_err();
        assert!(err.contains("Known types"));
        assert!(err.contains("coordsystem"));
    }

    #[test]
    fn test_parse_severity() {
        assert_eq!(parse_severity("error").unwrap(), Severity::Error);
        assert_eq!(parse_severity("Warning").unwrap(), Severity::Warning);
        assert!(parse_severity("fatal").is_err());
    }

    #[test]
    fn test_frequency_value() {
        assert_eq!(frequency_value("1024"), json!(1024));
        assert_eq!(frequency_value(" 511.99 "), json!(511.99));
        assert_eq!(frequency_value("n/a"), json!("n/a"));
        assert_eq!(frequency_value("NaN"), json!("NaN"));
    }
}
