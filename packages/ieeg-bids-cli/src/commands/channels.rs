use crate::cli::{frequency_value, ChannelsArgs};
use crate::commands::read_packages;
use crate::exit_codes;
use crate::output::{self, table_row};
use ieeg_bids::channels::{channel_rows_by_parent, load_reference_map, ChannelCounts, ChannelSettings};
use ieeg_bids::naming::{
    channels_output_path, day_subfolder, is_clinical_dataset_name, is_day_folder, penn_epi_to_eps,
};
use ieeg_bids::{ChannelsSidecar, PackageIndex, Sidecar};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct ChannelsOutput {
    folder: String,
    path: String,
    channels: usize,
    counts: ChannelCounts,
}

/// Reference and ground from the flags, falling back to the master CSV entry
/// for the dataset, then "unknown".
fn reference_and_ground(args: &ChannelsArgs) -> Result<(String, String), String> {
    let mut from_map = None;
    if let (Some(map_path), Some(dataset)) = (&args.reference_map, &args.dataset) {
        let map = load_reference_map(Path::new(map_path))
            .map_err(|e| format!("Failed to read reference map '{}': {}", map_path, e))?;
        let eps = penn_epi_to_eps(dataset);
        from_map = map.get(&eps).cloned();
        if from_map.is_none() {
            log::warn!("No reference/ground entry for {} in {}", eps, map_path);
        }
    }

    let (map_ref, map_gnd) = from_map.unwrap_or_else(|| ("unknown".into(), "unknown".into()));
    Ok((
        args.reference.clone().unwrap_or(map_ref),
        args.ground.clone().unwrap_or(map_gnd),
    ))
}

/// Where a parent folder's channels.tsv goes; `None` when a multi-day
/// clinical dataset has channels outside its day folders.
fn output_path(
    root: &Path,
    dataset: Option<&str>,
    folder: &str,
    folder_name: Option<&str>,
    multi_day: bool,
) -> Option<PathBuf> {
    match dataset {
        Some(name) if is_clinical_dataset_name(name) => day_subfolder(folder_name, multi_day)
            .map(|day| channels_output_path(root, name, day)),
        _ => Some(root.join(folder).join("channels.tsv")),
    }
}

pub fn execute(args: ChannelsArgs) -> i32 {
    let packages = match read_packages(&args.packages) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };

    let (reference, ground) = match reference_and_ground(&args) {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::INPUT_ERROR;
        }
    };
    let settings = ChannelSettings {
        reference,
        ground,
        sampling_frequency: frequency_value(&args.sampling_frequency),
        ..Default::default()
    };

    let by_parent = channel_rows_by_parent(&packages, &settings);
    if by_parent.is_empty() {
        eprintln!("Error: No .mef channel packages found in {}", args.packages);
        return exit_codes::INPUT_ERROR;
    }

    let index = PackageIndex::new(&packages);
    let root = Path::new(&args.output);
    let multi_day = by_parent
        .keys()
        .any(|id| index.get(id).is_some_and(|p| is_day_folder(p.name())));
    if multi_day {
        log::info!("Multi-day dataset: writing one channels.tsv per day folder");
    }
    let mut written = Vec::new();
    let mut failed = 0;

    for (parent_id, rows) in by_parent {
        let parent = index.get(&parent_id);
        let folder = parent.map(|p| index.full_path(p)).unwrap_or_default();
        let folder_name = parent.map(|p| p.name());
        let Some(path) = output_path(root, args.dataset.as_deref(), &folder, folder_name, multi_day)
        else {
            log::warn!(
                "Skipping {} channel(s) under '{}': not a day folder",
                rows.len(),
                folder
            );
            continue;
        };

        let counts = ChannelCounts::from_rows(&rows);
        let channels = rows.len();
        match ChannelsSidecar::new(rows).save_to(&path) {
            Ok(path) => written.push(ChannelsOutput {
                folder,
                path: path.display().to_string(),
                channels,
                counts,
            }),
            Err(e) => {
                eprintln!("  Error writing {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if args.json {
        if let Err(e) = output::emit_json(&written) {
            eprintln!("Error: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    } else {
        println!("{}", table_row(&[("Folder", 24), ("Channels", 9), ("SEEG", 5), ("Path", 64)]));
        println!("  {}", "-".repeat(104));
        for entry in &written {
            let folder = if entry.folder.is_empty() { "/" } else { entry.folder.as_str() };
            println!(
                "{}",
                table_row(&[
                    (folder, 24),
                    (entry.channels.to_string().as_str(), 9),
                    (entry.counts.seeg.to_string().as_str(), 5),
                    (entry.path.as_str(), 64),
                ])
            );
        }
    }

    if failed == 0 {
        exit_codes::SUCCESS
    } else if !written.is_empty() {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}
