//! ============================================================================
//! Analytics Side-Channel - Fire-and-forget usage recording
//! ============================================================================
//! Usage counting is a non-critical side effect: it runs off the send path,
//! and its failures are logged and discarded so a successful generation
//! always results in a visible reply.
//! ============================================================================

use std::sync::Arc;

use tracing::{debug, warn};

use crate::directory::ShopDirectory;

/// Usage increment recorded per successful reply.
pub const USAGE_INCREMENT: u64 = 1;

/// Records per-shop usage against the directory service.
pub struct UsageRecorder {
    directory: Arc<dyn ShopDirectory>,
}

impl UsageRecorder {
    pub fn new(directory: Arc<dyn ShopDirectory>) -> Self {
        Self { directory }
    }

    /// Spawn a usage increment for `shop_id` and return immediately.
    /// The outcome is never awaited by the caller.
    pub fn record(&self, shop_id: &str) {
        let directory = Arc::clone(&self.directory);
        let shop_id = shop_id.to_string();
        tokio::spawn(async move {
            match directory.record_usage(&shop_id, USAGE_INCREMENT).await {
                Ok(()) => debug!("Recorded usage for shop {}", shop_id),
                Err(e) => warn!("Failed to record usage for shop {}: {}", shop_id, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeDirectory;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_record_reaches_directory() {
        let directory = Arc::new(FakeDirectory::default());
        let recorder = UsageRecorder::new(directory.clone());

        recorder.record("bean-there");
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(directory.usage_calls.load(Ordering::SeqCst), 1);
        let log = directory.usage_log();
        assert_eq!(log, vec![("bean-there".to_string(), USAGE_INCREMENT)]);
    }

    #[tokio::test]
    async fn test_record_failure_is_swallowed() {
        let directory = Arc::new(FakeDirectory::default().with_usage_failure());
        let recorder = UsageRecorder::new(directory.clone());

        // Nothing to observe but the absence of a panic and the call count.
        recorder.record("bean-there");
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(directory.usage_calls.load(Ordering::SeqCst), 1);
    }
}
