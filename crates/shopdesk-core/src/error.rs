//! ============================================================================
//! Error Taxonomy - Failure classification for the chat pipeline
//! ============================================================================
//! One closed enum covers every failure the send pipeline can surface.
//! Downstream handling is a flat match over the discriminant, so each variant
//! maps to exactly one user-facing message.
//! ============================================================================

use serde::{Deserialize, Serialize};

/// Which side of a remote AI call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCause {
    /// The provider accepted the connection but rejected the request.
    Api,
    /// The request never completed (timeout, DNS, connection reset).
    Network,
}

/// Error type for the assistant core.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AssistantError {
    #[error("AI service credential is not configured")]
    NotConfigured,

    #[error("shop has no embeddable content")]
    NotReady,

    #[error("AI service failure ({cause:?}): {message}")]
    Service {
        cause: ServiceCause,
        /// Remote-provided message for `Api`, transport detail for `Network`.
        message: String,
    },

    #[error("{0}")]
    Internal(String),
}

impl AssistantError {
    /// Shorthand for a transport-level failure.
    pub fn network(detail: impl Into<String>) -> Self {
        AssistantError::Service {
            cause: ServiceCause::Network,
            message: detail.into(),
        }
    }

    /// Shorthand for a provider rejection.
    pub fn api(message: impl Into<String>) -> Self {
        AssistantError::Service {
            cause: ServiceCause::Api,
            message: message.into(),
        }
    }

    /// Text shown to the customer in place of a real reply.
    ///
    /// API rejections surface the remote-provided message verbatim when one
    /// is available; everything else maps to a fixed actionable sentence.
    pub fn user_message(&self) -> String {
        match self {
            AssistantError::NotConfigured => {
                "The AI service is not properly configured. Please contact the shop owner."
                    .to_string()
            }
            AssistantError::NotReady => {
                "This shop's information isn't ready yet. Please try again later.".to_string()
            }
            AssistantError::Service {
                cause: ServiceCause::Api,
                message,
            } => {
                if message.is_empty() {
                    "The AI service could not process that request. Please try again.".to_string()
                } else {
                    message.clone()
                }
            }
            AssistantError::Service {
                cause: ServiceCause::Network,
                ..
            } => "The AI service is temporarily unavailable. Please try again soon.".to_string(),
            AssistantError::Internal(_) => {
                "I'm sorry, I'm having trouble processing your request right now. Please try again."
                    .to_string()
            }
        }
    }
}
