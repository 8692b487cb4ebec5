//! ============================================================================
//! Shop Record - Owner-supplied shop facts and derived chat-readiness
//! ============================================================================
//! The directory service owns persistence; this module only defines the
//! record shape and the derived predicates the chat pipeline depends on.
//! ============================================================================

use serde::{Deserialize, Serialize};

/// A shop as stored by the directory service.
///
/// The identifier is a slug derived from the shop name at creation time and
/// immutable afterwards. All structured fields are free text and may be
/// empty. The embedding vector's dimensionality is set by the embedding
/// service; an empty vector means "not yet indexed".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hours: String,
    #[serde(default)]
    pub services: String,
    #[serde(default)]
    pub pricing: String,
    #[serde(default)]
    pub parking: String,
    #[serde(default)]
    pub payments: String,
    #[serde(default)]
    pub notes: String,
    /// Synthesized free-text blob stored at indexing time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<String>,
    /// Embedding of `raw_data`; empty until the shop has been indexed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl ShopRecord {
    /// Create a record with an id derived from the name and empty fields.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Self::derive_id(&name),
            name,
            ..Self::default()
        }
    }

    /// Attach a pre-computed embedding.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    /// Derive the immutable shop identifier from a display name:
    /// lowercase, whitespace runs collapsed to `-`, everything outside
    /// `[a-z0-9-]` stripped.
    pub fn derive_id(name: &str) -> String {
        name.to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
            .collect()
    }

    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }

    /// Whether there is anything to ground an answer in: the raw blob, or at
    /// least one of the hours/services/pricing fields.
    pub fn has_content(&self) -> bool {
        self.raw_data.as_deref().map_or(false, |s| !s.is_empty())
            || !self.hours.is_empty()
            || !self.services.is_empty()
            || !self.pricing.is_empty()
    }

    /// A shop is eligible for context resolution only when it has both
    /// content and an embedding. Derived, never stored.
    pub fn is_chat_ready(&self) -> bool {
        self.has_embedding() && self.has_content()
    }

    /// Canonical labeled block of the structured fields, one per line, in
    /// fixed order. Empty fields render as empty strings after the label.
    /// Byte-identical across repeated calls for the same record.
    pub fn synthesized_text(&self) -> String {
        format!(
            "Shop: {}\nHours: {}\nServices: {}\nPricing: {}\nParking: {}\nPayments: {}\nNotes: {}",
            self.name,
            self.hours,
            self.services,
            self.pricing,
            self.parking,
            self.payments,
            self.notes
        )
    }

    /// The grounding text fed to the generation service: the stored raw blob
    /// when present, else the synthesized block.
    pub fn grounding_text(&self) -> String {
        match self.raw_data.as_deref() {
            Some(raw) if !raw.is_empty() => raw.to_string(),
            _ => self.synthesized_text(),
        }
    }
}
