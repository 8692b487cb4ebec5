//! ============================================================================
//! SHOPDESK-CORE: Grounded customer chat for small shops
//! ============================================================================
//! Orchestrates a reply to a customer question without inventing facts:
//! - Embeds the question and consults the shop directory's similarity search
//! - Grounds generation strictly in the shop's own owner-supplied content
//! - Bounds conversation history and serializes sends per session
//! - Converts every failure into an actionable in-chat message
//!
//! ## Architecture
//! ```text
//! User Message → ChatSession (guard, history) → ContextResolver
//!                                                    ↓
//!                              embed(question) → find_similar → grounding text
//!                                                    ↓
//!                              generate_reply(system + last 6 turns + question)
//!                                                    ↓
//!                              reply appended → UsageRecorder (fire-and-forget)
//! ```
//!
//! The shop directory service and the embedding/generation provider are
//! external collaborators: the first is consumed through the
//! [`ShopDirectory`] trait, the second through [`AiService`], with
//! [`OpenAiClient`] as the production implementation.
//! ============================================================================

pub mod ai;
pub mod analytics;
pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod session;
pub mod shop;
pub mod types;

#[cfg(test)]
mod testutil;

// Re-export the public surface
pub use ai::{AiService, OpenAiClient, CHAT_MAX_TOKENS, CHAT_TEMPERATURE, HISTORY_WINDOW};
pub use analytics::UsageRecorder;
pub use config::AiConfig;
pub use context::{prepare_embedding, ContextResolver, SIMILARITY_THRESHOLD, SIMILARITY_TOP_N};
pub use directory::ShopDirectory;
pub use error::{AssistantError, ServiceCause};
pub use session::{ChatSession, SendOutcome};
pub use shop::ShopRecord;
pub use types::{ChatMessage, Role, SimilarityMatch};
