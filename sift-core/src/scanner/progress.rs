use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// Scanning progress snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    /// Items visited so far, failures included
    pub scanned_count: u64,
    /// Path being processed when the snapshot was taken
    #[serde(with = "crate::model::lossy_path")]
    pub current_path: PathBuf,
    /// 0-100, only when the total is known up front
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_progress: Option<f32>,
}

impl ScanProgress {
    pub fn new(scanned_count: u64, current_path: PathBuf) -> Self {
        Self {
            scanned_count,
            current_path,
            estimated_progress: None,
        }
    }

    pub fn with_estimate(mut self, percent: f32) -> Self {
        self.estimated_progress = Some(percent.clamp(0.0, 100.0));
        self
    }
}

/// Create a lossy, latest-value progress channel
pub fn progress_channel() -> (ProgressSender, ProgressSubscription) {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let sender = ProgressSender {
        tx,
        evict: rx.clone(),
        high_water: AtomicU64::new(0),
    };
    (sender, ProgressSubscription { rx })
}

/// Producer half, owned by the scanner.
///
/// The single slot holds the newest unread snapshot. Publishing into a full
/// slot drops the stale snapshot first, so the producer never waits on a
/// slow or absent consumer.
#[derive(Debug)]
pub struct ProgressSender {
    tx: Sender<ScanProgress>,
    evict: Receiver<ScanProgress>,
    high_water: AtomicU64,
}

impl ProgressSender {
    /// Publish a snapshot. Snapshots older than one already published are ignored.
    pub fn publish(&self, progress: ScanProgress) {
        let previous = self
            .high_water
            .fetch_max(progress.scanned_count, Ordering::AcqRel);
        if progress.scanned_count < previous {
            return;
        }

        match self.tx.try_send(progress) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(progress)) => {
                // Consumers only take from the slot, so after evicting there is room
                let _ = self.evict.try_recv();
                let _ = self.tx.try_send(progress);
            }
        }
    }
}

/// Consumer handle. The subscription lasts as long as the handle does;
/// iteration ends once the scan has finished and its sender is gone.
#[derive(Debug, Clone)]
pub struct ProgressSubscription {
    rx: Receiver<ScanProgress>,
}

impl ProgressSubscription {
    /// Newest snapshot currently available, without blocking
    pub fn latest(&self) -> Option<ScanProgress> {
        self.rx.try_iter().last()
    }

    /// Wait up to `timeout` for the next snapshot.
    /// `Err(Disconnected)` means the scan is over.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<ScanProgress, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Blocking iterator over snapshots until the scan finishes
    pub fn iter(&self) -> impl Iterator<Item = ScanProgress> + '_ {
        self.rx.iter()
    }
}

impl IntoIterator for ProgressSubscription {
    type Item = ScanProgress;
    type IntoIter = crossbeam_channel::IntoIter<ScanProgress>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.into_iter()
    }
}
