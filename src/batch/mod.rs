//! Batch scanning of many screenshots.
//!
//! A single worker thread owns the scan pipeline, so every recognition call is
//! serialized by construction. The caller queues screenshot paths and the
//! worker appends one CSV row per successful scan.

pub mod csv_writer;
pub mod queue;
pub mod worker;

pub use csv_writer::{append_to_csv, init_csv};
pub use queue::{create_work_queue, enqueue_batch, ScanWorkItem};
pub use worker::{run_scan_worker, BatchSummary};
