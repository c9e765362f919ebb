mod progress;
mod walker;

pub use progress::{ProgressSender, ProgressSubscription, ScanProgress, progress_channel};
pub use walker::{CancellationToken, ScanConfig, ScanHandle, Scanner};
