//! ============================================================================
//! Shop Directory Interface - External similarity-search collaborator
//! ============================================================================
//! The directory service persists shop records, performs nearest-neighbor
//! search over stored embeddings, and accumulates per-shop usage counters.
//! This core consumes it at its interface only; implementations live with
//! the surrounding application.
//! ============================================================================

use anyhow::Result;
use async_trait::async_trait;

use crate::shop::ShopRecord;
use crate::types::SimilarityMatch;

/// Client interface to the shop directory service.
///
/// Failures here are collaborator failures, not part of the chat error
/// taxonomy; the core folds them into unclassified errors at its boundary.
#[async_trait]
pub trait ShopDirectory: Send + Sync {
    /// Fetch a shop record by identifier.
    async fn get_shop(&self, id: &str) -> Result<Option<ShopRecord>>;

    /// Nearest-neighbor search over stored shop embeddings.
    ///
    /// Returns up to `top_n` matches with score >= `threshold`, most
    /// similar first.
    async fn find_similar(
        &self,
        embedding: &[f32],
        top_n: u64,
        threshold: f32,
    ) -> Result<Vec<SimilarityMatch>>;

    /// Increment a shop's usage counter. Fire-and-forget on the caller's
    /// side; the return value is only consumed by logging.
    async fn record_usage(&self, shop_id: &str, count: u64) -> Result<()>;
}
