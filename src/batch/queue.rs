//! Work queue between the caller and the scan worker thread.

use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, SendError, Sender};

/// A screenshot waiting to be scanned.
#[derive(Debug, Clone)]
pub struct ScanWorkItem {
    pub screenshot_path: PathBuf,
    /// Position in the batch (1-based)
    pub index: u32,
    pub trainer_level: u32,
    pub queued_at: DateTime<Local>,
}

impl ScanWorkItem {
    pub fn new(screenshot_path: PathBuf, index: u32, trainer_level: u32) -> Self {
        Self {
            screenshot_path,
            index,
            trainer_level,
            queued_at: Local::now(),
        }
    }
}

/// Creates an unbounded work queue: the sender side queues screenshots, the
/// receiver side is handed to [`run_scan_worker`](super::run_scan_worker).
pub fn create_work_queue() -> (Sender<ScanWorkItem>, Receiver<ScanWorkItem>) {
    channel()
}

/// Queues `screenshots` in order, numbering them from 1. Returns how many
/// were queued; fails once the worker has hung up.
pub fn enqueue_batch(
    sender: &Sender<ScanWorkItem>,
    screenshots: impl IntoIterator<Item = PathBuf>,
    trainer_level: u32,
) -> Result<u32, SendError<ScanWorkItem>> {
    let mut queued = 0;
    for path in screenshots {
        queued += 1;
        sender.send(ScanWorkItem::new(path, queued, trainer_level))?;
    }
    tracing::info!("Queued {} screenshot(s) for scanning", queued);
    Ok(queued)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_queue_preserves_order() {
        let (sender, receiver) = create_work_queue();

        for i in 1..=5 {
            let item = ScanWorkItem::new(PathBuf::from(format!("shot_{}.png", i)), i, 30);
            sender.send(item).expect("Failed to send");
        }

        for i in 1..=5 {
            let received = receiver.recv().expect("Failed to receive");
            assert_eq!(received.index, i);
            assert_eq!(received.trainer_level, 30);
        }
    }

    #[test]
    fn test_enqueue_batch_numbers_from_one() {
        let (sender, receiver) = create_work_queue();
        let shots = ["a.png", "b.png", "c.png"].map(PathBuf::from);

        assert_eq!(enqueue_batch(&sender, shots, 25).unwrap(), 3);
        drop(sender);

        let items: Vec<ScanWorkItem> = receiver.iter().collect();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].index, 1);
        assert_eq!(items[2].index, 3);
        assert_eq!(items[2].screenshot_path, PathBuf::from("c.png"));
        assert!(items.iter().all(|item| item.trainer_level == 25));
    }

    #[test]
    fn test_enqueue_batch_fails_without_worker() {
        let (sender, receiver) = create_work_queue();
        drop(receiver);

        assert!(enqueue_batch(&sender, [PathBuf::from("a.png")], 20).is_err());
    }

    #[test]
    fn test_channel_closes_when_sender_dropped() {
        let (sender, receiver) = create_work_queue();

        sender
            .send(ScanWorkItem::new(PathBuf::from("test.png"), 1, 20))
            .unwrap();
        drop(sender);

        assert!(receiver.recv().is_ok());
        assert!(receiver.recv().is_err());
    }
}
