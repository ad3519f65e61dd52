use crate::cli::PathsArgs;
use crate::commands::read_packages;
use crate::exit_codes;
use crate::output::{self, table_row};
use ieeg_bids::cleanup::match_pattern;
use ieeg_bids::{Package, PackageIndex};
use serde::Serialize;

#[derive(Serialize)]
struct PathEntry {
    id: Option<String>,
    name: String,
    folder: String,
    full_path: String,
    collection: bool,
}

impl PathEntry {
    fn new(index: &PackageIndex<'_>, pkg: &Package) -> Self {
        Self {
            id: pkg.id().map(str::to_string),
            name: pkg.name().to_string(),
            folder: index.resolve_path(pkg),
            full_path: index.full_path(pkg),
            collection: pkg.is_collection(),
        }
    }
}

pub fn execute(args: PathsArgs) -> i32 {
    let packages = match read_packages(&args.packages) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };
    let index = PackageIndex::new(&packages);

    let entries: Vec<PathEntry> = match &args.pattern {
        Some(pattern) => {
            let pattern = match glob::Pattern::new(pattern) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error: Invalid glob pattern '{}': {}", pattern, e);
                    return exit_codes::INPUT_ERROR;
                }
            };
            match_pattern(&packages, &pattern)
                .into_iter()
                .filter(|(_, pkg)| !pkg.is_deleted())
                .map(|(_, pkg)| PathEntry::new(&index, pkg))
                .collect()
        }
        None => packages
            .iter()
            .filter(|pkg| !pkg.is_deleted())
            .map(|pkg| PathEntry::new(&index, pkg))
            .collect(),
    };

    if args.json {
        if let Err(e) = output::emit_json(&entries) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
        return exit_codes::SUCCESS;
    }

    println!("{}", table_row(&[("Id", 12), ("Kind", 6), ("Path", 64)]));
    println!("  {}", "-".repeat(84));
    for entry in &entries {
        let kind = if entry.collection { "dir" } else { "file" };
        println!(
            "{}",
            table_row(&[
                (entry.id.as_deref().unwrap_or("-"), 12),
                (kind, 6),
                (entry.full_path.as_str(), 64),
            ])
        );
    }
    println!("\n{} package(s)", entries.len());

    exit_codes::SUCCESS
}
