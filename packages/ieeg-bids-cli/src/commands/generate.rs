use crate::cli::GenerateArgs;
use crate::commands::read_input;
use crate::exit_codes;
use ieeg_bids::{build_sidecar, PathConfig, SidecarError, SidecarOptions};
use std::path::Path;

fn options_for(args: &GenerateArgs) -> SidecarOptions {
    let mut paths = PathConfig::from_env();
    if let Some(dir) = &args.output_dir {
        paths = paths.with_output_dir(dir);
    }

    let mut options = SidecarOptions::default()
        .with_paths(paths)
        .with_json_indent(args.indent);
    if let Some(filename) = &args.filename {
        options = options.with_filename(filename);
    }
    if let Some(severity) = args.numeric_severity {
        options = options.with_numeric_severity(severity);
    }
    options
}

pub fn execute(args: GenerateArgs) -> i32 {
    let value = match read_input(&args.input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let sidecar = match build_sidecar(args.sidecar, value, options_for(&args)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    if args.strict {
        match sidecar.run_validation(true) {
            Ok(_) => {}
            Err(SidecarError::ValidationFailed { sidecar, errors }) => {
                eprintln!("Error: {} validation failed:", sidecar);
                for msg in &errors {
                    eprintln!("  {}", msg);
                }
                return exit_codes::VALIDATION_FAILED;
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::VALIDATION_FAILED;
            }
        }
    }

    let result = match &args.output {
        Some(path) => {
            if args.validate && !args.strict {
                if let Err(e) = sidecar.run_validation(false) {
                    log::warn!("Validation failed: {}", e);
                }
            }
            sidecar.save_to(Path::new(path))
        }
        None => sidecar.save(None, args.validate && !args.strict),
    };

    match result {
        Ok(path) => {
            println!("{}", path.display());
            exit_codes::SUCCESS
        }
        Err(e @ SidecarError::EmptyRows { .. }) => {
            eprintln!("Error: {}", e);
            exit_codes::INPUT_ERROR
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
