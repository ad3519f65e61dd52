use crate::cli::{
    CleanupDuplicatesArgs, DatasetArgs, DatasetCommand, DeletePathArgs, DeletePatternArgs,
};
use crate::commands::read_packages;
use crate::exit_codes;
use crate::output;
use ieeg_bids::cleanup::{delete_by_path, delete_by_pattern, DeleteSummary};
use ieeg_bids::reconcile::{CandidateOutcome, Outcome};
use ieeg_bids::{cleanup_duplicates, DryRunApi};
use serde::Serialize;

#[derive(Serialize)]
struct ReconcileOutput<'a> {
    dataset: &'a str,
    success: usize,
    skipped: usize,
    outcomes: &'a [CandidateOutcome],
    actions: &'a [String],
}

#[derive(Serialize)]
struct DeleteOutput<'a> {
    dataset: &'a str,
    #[serde(flatten)]
    summary: &'a DeleteSummary,
    actions: &'a [String],
}

pub fn execute(command: DatasetCommand) -> i32 {
    match command {
        DatasetCommand::CleanupDuplicates(args) => cleanup(args),
        DatasetCommand::DeletePattern(args) => delete_pattern(args),
        DatasetCommand::DeletePath(args) => delete_path(args),
    }
}

fn dry_run_api(args: &DatasetArgs) -> Result<DryRunApi, i32> {
    match read_packages(&args.packages) {
        Ok(packages) => Ok(DryRunApi::new(args.dataset.as_str(), packages)),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(exit_codes::INPUT_ERROR)
        }
    }
}

fn emit<T: Serialize>(value: &T) -> i32 {
    match output::emit_json(value) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}

fn print_actions(actions: &[String]) {
    if actions.is_empty() {
        return;
    }
    println!("\n[DRY RUN] {} action(s):", actions.len());
    for action in actions {
        println!("  {}", action);
    }
}

fn cleanup(args: CleanupDuplicatesArgs) -> i32 {
    let mut api = match dry_run_api(&args.dataset) {
        Ok(api) => api,
        Err(code) => return code,
    };
    let dataset = args.dataset.dataset.as_str();
    let summary = cleanup_duplicates(&mut api, dataset, &args.files);

    if args.dataset.json {
        let code = emit(&ReconcileOutput {
            dataset,
            success: summary.success,
            skipped: summary.skipped,
            outcomes: &summary.outcomes,
            actions: api.actions(),
        });
        if code != exit_codes::SUCCESS {
            return code;
        }
    } else {
        for entry in &summary.outcomes {
            match &entry.outcome {
                Outcome::Reconciled => println!("  OK       {}", entry.path),
                Outcome::Skipped(reason) => println!("  SKIPPED  {} ({})", entry.path, reason),
            }
        }
        print_actions(api.actions());
        println!(
            "\nDataset {}: {} reconciled, {} skipped",
            dataset, summary.success, summary.skipped
        );
    }

    if summary.skipped == 0 {
        exit_codes::SUCCESS
    } else {
        exit_codes::PARTIAL_FAILURE
    }
}

fn report_deletes(args: &DatasetArgs, summary: &DeleteSummary, actions: &[String]) -> i32 {
    if args.json {
        let code = emit(&DeleteOutput {
            dataset: &args.dataset,
            summary,
            actions,
        });
        if code != exit_codes::SUCCESS {
            return code;
        }
    } else {
        for path in &summary.matched {
            println!("  MATCHED    {}", path);
        }
        for path in &summary.not_found {
            println!("  NOT FOUND  {}", path);
        }
        print_actions(actions);
        println!(
            "\nDataset {}: {} deleted, {} failed",
            args.dataset, summary.deleted, summary.failed
        );
    }

    if summary.failed == 0 {
        exit_codes::SUCCESS
    } else {
        exit_codes::PARTIAL_FAILURE
    }
}

fn delete_pattern(args: DeletePatternArgs) -> i32 {
    let mut api = match dry_run_api(&args.dataset) {
        Ok(api) => api,
        Err(code) => return code,
    };
    let summary = match delete_by_pattern(&mut api, &args.dataset.dataset, &args.pattern) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };
    report_deletes(&args.dataset, &summary, api.actions())
}

fn delete_path(args: DeletePathArgs) -> i32 {
    let mut api = match dry_run_api(&args.dataset) {
        Ok(api) => api,
        Err(code) => return code,
    };
    let summary = delete_by_path(&mut api, &args.dataset.dataset, &args.paths);
    report_deletes(&args.dataset, &summary, api.actions())
}
