//! Scan worker thread.
//!
//! Owns the pipeline for its whole life, processes queued screenshots one at a
//! time and releases the recognizer once the queue closes.

use std::path::PathBuf;
use std::sync::mpsc::Receiver;

use crate::batch::csv_writer::append_to_csv;
use crate::batch::queue::ScanWorkItem;
use crate::ocr::engine::TextRecognizer;
use crate::scan::ScanPipeline;

/// Counts reported when the worker finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub scanned: u32,
    pub failed: u32,
    /// Scanned, but HP, CP or the evolution cost could not be read.
    pub incomplete: u32,
}

/// Runs the worker loop until the sender side of the queue is dropped.
///
/// Unreadable screenshots and failed scans are logged and skipped. Blocks, so
/// run it on a dedicated thread.
pub fn run_scan_worker<R: TextRecognizer>(
    receiver: Receiver<ScanWorkItem>,
    mut pipeline: ScanPipeline<R>,
    csv_path: PathBuf,
) -> BatchSummary {
    tracing::info!("Scan worker started");
    let mut summary = BatchSummary::default();

    while let Ok(item) = receiver.recv() {
        tracing::info!(
            "Scan worker: processing #{} ({})",
            item.index,
            item.screenshot_path.display()
        );

        let img = match image::open(&item.screenshot_path) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                tracing::warn!(
                    "Scan worker: failed to load {}: {}",
                    item.screenshot_path.display(),
                    e
                );
                summary.failed += 1;
                continue;
            }
        };

        let result = match pipeline.scan(&img, item.trainer_level) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Scan worker: scan failed for #{}: {}", item.index, e);
                summary.failed += 1;
                continue;
            }
        };

        if !result.is_complete() {
            tracing::warn!("Scan worker: #{} has unreadable fields", item.index);
            summary.incomplete += 1;
        }

        if let Err(e) = append_to_csv(&csv_path, &item, &result) {
            tracing::warn!("Scan worker: failed to write CSV for #{}: {}", item.index, e);
        }
        summary.scanned += 1;
    }

    tracing::info!("Scan worker: queue closed, releasing pipeline");
    if let Err(e) = pipeline.release() {
        tracing::error!("Scan worker: release failed: {}", e);
    }

    tracing::info!(
        "Scan worker finished: {} scanned ({} incomplete), {} failed",
        summary.scanned,
        summary.incomplete,
        summary.failed
    );
    summary
}
