use crate::cli::ValidateArgs;
use crate::commands::read_input;
use crate::exit_codes;
use crate::output;
use ieeg_bids::{build_sidecar, SidecarError, SidecarOptions, ValidationReport};
use serde::Serialize;

#[derive(Serialize)]
struct ValidateOutput {
    sidecar: &'static str,
    input: String,
    valid: bool,
    /// Structural violations; when present the field checks did not run
    schema_errors: Vec<String>,
    errors: Vec<String>,
    warnings: Vec<String>,
}

pub fn execute(args: ValidateArgs) -> i32 {
    let value = match read_input(&args.input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let mut options = SidecarOptions::default();
    if let Some(severity) = args.numeric_severity {
        options = options.with_numeric_severity(severity);
    }

    let sidecar = match build_sidecar(args.sidecar, value.clone(), options) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    // Defaults would mask missing fields, so the input is checked as given.
    let (schema_errors, report) = match sidecar.validate_data(Some(&value)) {
        Ok(report) => (Vec::new(), report),
        Err(SidecarError::Schema(violations)) => (violations, ValidationReport::default()),
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    };

    let valid = schema_errors.is_empty()
        && report.ok()
        && !(args.strict && !report.warnings.is_empty());

    let result = ValidateOutput {
        sidecar: args.sidecar.as_str(),
        input: args.input.clone(),
        valid,
        schema_errors,
        errors: report.errors,
        warnings: report.warnings,
    };

    if args.json {
        if let Err(e) = output::emit_json(&result) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    } else {
        for msg in &result.schema_errors {
            println!("  SCHEMA:  {}", msg);
        }
        for msg in &result.errors {
            println!("  ERROR:   {}", msg);
        }
        for msg in &result.warnings {
            println!("  WARNING: {}", msg);
        }
        if result.valid {
            println!("{} validation passed.", sidecar.spec().name);
        } else {
            println!("{} validation failed.", sidecar.spec().name);
        }
    }

    if result.valid {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    }
}
