// ============================================================================
// In-memory shop directory - demo stand-in for the real directory service
// ============================================================================
// Seeded from a JSON file. The brute-force cosine scan below is fixture
// code for the demo; the chat core only ever consumes the ShopDirectory
// trait and delegates similarity search to whatever implements it.
// ============================================================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use shopdesk_core::{ShopDirectory, ShopRecord, SimilarityMatch};

/// JSON-backed shop directory for local demos.
pub struct InMemoryDirectory {
    path: PathBuf,
    shops: Mutex<Vec<ShopRecord>>,
    usage: Mutex<HashMap<String, u64>>,
}

impl InMemoryDirectory {
    /// Load the shop seed file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shop seed file {}", path.display()))?;
        let shops: Vec<ShopRecord> = serde_json::from_str(&data)
            .with_context(|| format!("invalid shop seed file {}", path.display()))?;
        debug!("Loaded {} shops from {}", shops.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            shops: Mutex::new(shops),
            usage: Mutex::new(HashMap::new()),
        })
    }

    #[cfg(test)]
    fn with_records(shops: Vec<ShopRecord>) -> Self {
        Self {
            path: PathBuf::new(),
            shops: Mutex::new(shops),
            usage: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of all seeded shops.
    pub fn shops(&self) -> Vec<ShopRecord> {
        self.lock_shops().clone()
    }

    pub fn seed_path(&self) -> &Path {
        &self.path
    }

    /// Store a freshly computed raw blob + embedding for a shop and persist
    /// the seed file.
    pub fn store_embedding(
        &self,
        shop_id: &str,
        raw_data: String,
        embedding: Vec<f32>,
    ) -> Result<()> {
        let mut shops = self.lock_shops();
        let shop = shops
            .iter_mut()
            .find(|s| s.id == shop_id)
            .ok_or_else(|| anyhow!("unknown shop: {}", shop_id))?;
        shop.raw_data = Some(raw_data);
        shop.embedding = embedding;

        let serialized = serde_json::to_string_pretty(&*shops)?;
        std::fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Usage counters accumulated this run (not persisted).
    pub fn usage_counts(&self) -> HashMap<String, u64> {
        self.lock_usage().clone()
    }

    fn lock_shops(&self) -> MutexGuard<'_, Vec<ShopRecord>> {
        self.shops.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_usage(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.usage.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ShopDirectory for InMemoryDirectory {
    async fn get_shop(&self, id: &str) -> Result<Option<ShopRecord>> {
        Ok(self.lock_shops().iter().find(|s| s.id == id).cloned())
    }

    async fn find_similar(
        &self,
        embedding: &[f32],
        top_n: u64,
        threshold: f32,
    ) -> Result<Vec<SimilarityMatch>> {
        let mut matches: Vec<SimilarityMatch> = self
            .lock_shops()
            .iter()
            .filter(|s| !s.embedding.is_empty())
            .map(|s| SimilarityMatch {
                shop_id: s.id.clone(),
                score: cosine_similarity(embedding, &s.embedding),
            })
            .filter(|m| m.score >= threshold)
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_n as usize);
        Ok(matches)
    }

    async fn record_usage(&self, shop_id: &str, count: u64) -> Result<()> {
        let mut usage = self.lock_usage();
        let total = usage.entry(shop_id.to_string()).or_insert(0);
        *total += count;
        debug!("Usage for shop {} now {}", shop_id, total);
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
