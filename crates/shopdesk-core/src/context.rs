//! ============================================================================
//! Context Resolver - Decides the grounding text for each question
//! ============================================================================
//! Guards against un-indexed shops before any paid API call, embeds the
//! question, and consults the directory's similarity search. The similarity
//! result is a diagnostic signal, not a routing mechanism: the chat screen
//! is already scoped to one shop, so a miss or mismatch never withholds
//! that shop's own content.
//! ============================================================================

use std::sync::Arc;

use tracing::{debug, warn};

use crate::ai::AiService;
use crate::directory::ShopDirectory;
use crate::error::AssistantError;
use crate::shop::ShopRecord;

/// Number of nearest shops requested per query.
pub const SIMILARITY_TOP_N: u64 = 1;

/// Minimum score for a directory match to be considered relevant.
pub const SIMILARITY_THRESHOLD: f32 = 0.5;

/// Resolves the grounding context for one question against one shop.
pub struct ContextResolver {
    directory: Arc<dyn ShopDirectory>,
    ai: Arc<dyn AiService>,
}

impl ContextResolver {
    pub fn new(directory: Arc<dyn ShopDirectory>, ai: Arc<dyn AiService>) -> Self {
        Self { directory, ai }
    }

    /// Produce the grounding text for `question`, or fail before any paid
    /// call if the shop cannot possibly be grounded.
    pub async fn resolve(
        &self,
        shop: &ShopRecord,
        question: &str,
    ) -> Result<String, AssistantError> {
        if !shop.is_chat_ready() {
            return Err(AssistantError::NotReady);
        }

        let query = self.ai.embed(question).await?;

        let matches = self
            .directory
            .find_similar(&query, SIMILARITY_TOP_N, SIMILARITY_THRESHOLD)
            .await
            .map_err(|e| AssistantError::Internal(format!("similarity search failed: {}", e)))?;

        match matches.first() {
            Some(hit) if hit.shop_id == shop.id => {
                debug!(
                    "Query matched shop {} (score {:.2})",
                    shop.id, hit.score
                );
            }
            Some(hit) => {
                warn!(
                    "Nearest shop for query is {} (score {:.2}), not {}; grounding in own content",
                    hit.shop_id, hit.score, shop.id
                );
            }
            None => {
                debug!(
                    "No similarity match above threshold for shop {}; grounding in own content",
                    shop.id
                );
            }
        }

        Ok(shop.grounding_text())
    }
}

/// Synthesize a shop's raw text and embed it, for handing to the directory
/// service at indexing time. Counterpart of the chat-ready predicate: a shop
/// indexed through this becomes eligible for context resolution.
pub async fn prepare_embedding(
    ai: &dyn AiService,
    shop: &ShopRecord,
) -> Result<(String, Vec<f32>), AssistantError> {
    let raw = shop.synthesized_text();
    let vector = ai.embed(&raw).await?;
    Ok((raw, vector))
}
