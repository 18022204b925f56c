//! CSV output for batch scans.
//!
//! Append-only: each row is written as soon as its scan finishes, so results
//! survive a crash halfway through a batch.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::batch::queue::ScanWorkItem;
use crate::scan::ScanResult;

/// Absent numbers are left empty; evolution cost uses -1 (fully evolved) and
/// -999 (unreadable).
const CSV_HEADER: &str =
    "index,timestamp,screenshot,level,name,candy_name,hp,cp,candy_amount,evolution_cost";

fn has_content(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

/// Writes the header into a new or empty file. Existing rows are kept.
pub fn init_csv(path: &Path) -> Result<()> {
    if has_content(path) {
        tracing::info!("Appending to existing CSV {}", path.display());
        return Ok(());
    }

    fs::write(path, format!("{}\n", CSV_HEADER))
        .with_context(|| format!("Failed to write CSV header to {}", path.display()))?;
    Ok(())
}

fn optional(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn format_row(work_item: &ScanWorkItem, result: &ScanResult) -> String {
    [
        work_item.index.to_string(),
        work_item.queued_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        work_item.screenshot_path.display().to_string(),
        result.level.to_string(),
        result.name.clone(),
        result.candy_name.clone(),
        optional(result.hp),
        optional(result.cp),
        optional(result.candy_amount),
        result.evolution_cost.code().to_string(),
    ]
    .join(",")
}

/// Appends one result row.
pub fn append_to_csv(path: &Path, work_item: &ScanWorkItem, result: &ScanResult) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {} for append", path.display()))?;

    writeln!(file, "{}", format_row(work_item, result))
        .with_context(|| format!("Failed to append row #{}", work_item.index))?;
    Ok(())
}
