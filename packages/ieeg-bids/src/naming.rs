//! Dataset naming and BIDS file/folder names.

use std::path::{Path, PathBuf};

const PENN_EPI_PREFIX: &str = "PennEPI";
const EPS_PREFIX: &str = "EPS";

/// First run of ASCII digits in `name`, parsed.
fn first_number(name: &str) -> u64 {
    name.split(|c: char| !c.is_ascii_digit())
        .find(|part| !part.is_empty())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// `EPS00049` -> `PennEPI00049`
pub fn eps_to_penn_epi(dataset_name: &str) -> String {
    format!("{}{:05}", PENN_EPI_PREFIX, first_number(dataset_name))
}

/// `PennEPI00049` -> `EPS0000049`
pub fn penn_epi_to_eps(dataset_name: &str) -> String {
    format!("{}{:07}", EPS_PREFIX, first_number(dataset_name))
}

/// Recording-day folders of a multi-day clinical dataset
pub const MULTI_DAY_FOLDERS: &[&str] = &["D01", "D02", "D03", "D04", "D05", "D06", "D07"];

pub fn is_day_folder(name: &str) -> bool {
    MULTI_DAY_FOLDERS.contains(&name)
}

/// Day subfolder for channels.tsv output under a parent folder.
///
/// Single-day datasets (no parent is a day folder) write flat, so every parent
/// maps to `Some(None)`. In a multi-day dataset only day folders map to
/// `Some(Some(day))`; any other parent yields `None` and is not written.
pub fn day_subfolder<'a>(parent: Option<&'a str>, multi_day: bool) -> Option<Option<&'a str>> {
    if !multi_day {
        return Some(None);
    }
    parent.filter(|name| is_day_folder(name)).map(Some)
}

/// Whether a dataset follows either naming scheme
pub fn is_clinical_dataset_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.starts_with("eps") || lower.starts_with("pennepi")
}

/// `sub-X[_ses-Y]_task-Z[_run-NN]_suffix.ext`
pub fn build_filename(
    subject_id: &str,
    session_id: Option<&str>,
    task: &str,
    run: Option<u32>,
    suffix: &str,
    extension: &str,
) -> String {
    let mut parts = vec![format!("sub-{}", subject_id)];

    if let Some(session) = session_id {
        parts.push(format!("ses-{}", session));
    }

    parts.push(format!("task-{}", task));

    if let Some(run_num) = run {
        parts.push(format!("run-{:02}", run_num));
    }

    parts.push(suffix.to_string());

    format!("{}.{}", parts.join("_"), extension)
}

/// `root/sub-X[/ses-Y]/<datatype>`
pub fn data_directory(root: &Path, subject_id: &str, session_id: Option<&str>, datatype: &str) -> PathBuf {
    let mut path = root.join(format!("sub-{}", subject_id));

    if let Some(session) = session_id {
        path = path.join(format!("ses-{}", session));
    }

    path.join(datatype)
}

/// Output location of a clinical dataset's channels.tsv:
/// `root/<PennEPI>/primary/sub-<PennEPI>/ses-postimplant/ieeg[/<day>]/sub-<PennEPI>_ses-postimplant_task-clinical_channels.tsv`
pub fn channels_output_path(root: &Path, dataset_name: &str, day: Option<&str>) -> PathBuf {
    let subject = eps_to_penn_epi(dataset_name);
    let mut dir = data_directory(
        &root.join(&subject).join("primary"),
        &subject,
        Some("postimplant"),
        "ieeg",
    );
    if let Some(day) = day {
        dir = dir.join(day);
    }
    dir.join(build_filename(
        &subject,
        Some("postimplant"),
        "clinical",
        None,
        "channels",
        "tsv",
    ))
}
