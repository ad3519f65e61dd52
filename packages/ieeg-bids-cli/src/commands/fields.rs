use crate::cli::FieldsArgs;
use crate::exit_codes;
use crate::output;
use ieeg_bids::{SidecarKind, SidecarSpec};
use serde::Serialize;

#[derive(Serialize)]
struct FieldsOutput {
    sidecar: &'static str,
    filename: &'static str,
    format: &'static str,
    required: Vec<&'static str>,
    recommended: Vec<&'static str>,
    optional: Vec<&'static str>,
    rules: Vec<String>,
    documentation: &'static str,
}

impl FieldsOutput {
    fn from_spec(kind: SidecarKind, spec: &'static SidecarSpec) -> Self {
        Self {
            sidecar: kind.as_str(),
            filename: spec.filename,
            format: spec.format.extension(),
            required: spec.required_set().into_iter().collect(),
            recommended: spec.recommended_set().into_iter().collect(),
            optional: spec.optional_set().into_iter().collect(),
            rules: spec.rules.iter().map(|r| r.describe()).collect(),
            documentation: spec.documentation,
        }
    }
}

pub fn execute(args: FieldsArgs) -> i32 {
    let kinds: Vec<SidecarKind> = match args.sidecar {
        Some(kind) => vec![kind],
        None => SidecarKind::all().to_vec(),
    };
    let listing: Vec<FieldsOutput> = kinds
        .iter()
        .map(|kind| FieldsOutput::from_spec(*kind, kind.spec()))
        .collect();

    if args.json {
        if let Err(e) = output::emit_json(&listing) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
        return exit_codes::SUCCESS;
    }

    for (kind, entry) in kinds.iter().zip(&listing) {
        println!("{} ({})", entry.sidecar, entry.filename);
        println!("  {}", "-".repeat(64));
        for line in kind.spec().field_summary().lines() {
            println!("  {}", line);
        }
        for rule in &entry.rules {
            println!("  RULE: {}", rule);
        }
        println!();
    }

    exit_codes::SUCCESS
}
