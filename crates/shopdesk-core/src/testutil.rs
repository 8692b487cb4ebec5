//! Shared fakes for resolver and session tests. The trait seams exist so
//! tests can substitute these without process-wide mutation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::ai::AiService;
use crate::directory::ShopDirectory;
use crate::error::AssistantError;
use crate::shop::ShopRecord;
use crate::types::{ChatMessage, SimilarityMatch};

/// In-process `AiService` double with call counters. Queued errors are
/// consumed one per call, so a fake can fail once and then recover.
pub struct FakeAi {
    pub embed_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    /// History length passed to the most recent `generate_reply`.
    pub last_history_len: AtomicUsize,
    embed_errors: Mutex<Vec<AssistantError>>,
    generate_errors: Mutex<Vec<AssistantError>>,
    reply: String,
}

impl Default for FakeAi {
    fn default() -> Self {
        Self {
            embed_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            last_history_len: AtomicUsize::new(0),
            embed_errors: Mutex::new(Vec::new()),
            generate_errors: Mutex::new(Vec::new()),
            reply: "fake reply".to_string(),
        }
    }
}

impl FakeAi {
    pub fn default_vector() -> Vec<f32> {
        vec![0.25; 8]
    }

    pub fn with_embed_error(self, err: AssistantError) -> Self {
        lock(&self.embed_errors).push(err);
        self
    }

    pub fn with_generate_error(self, err: AssistantError) -> Self {
        lock(&self.generate_errors).push(err);
        self
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }
}

#[async_trait]
impl AiService for FakeAi {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, AssistantError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        match lock(&self.embed_errors).pop() {
            Some(err) => Err(err),
            None => Ok(Self::default_vector()),
        }
    }

    async fn generate_reply(
        &self,
        _question: &str,
        _grounding_context: &str,
        history: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.last_history_len.store(history.len(), Ordering::SeqCst);
        match lock(&self.generate_errors).pop() {
            Some(err) => Err(err),
            None => Ok(self.reply.clone()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process `ShopDirectory` double.
#[derive(Default)]
pub struct FakeDirectory {
    shops: Vec<ShopRecord>,
    similar: Vec<SimilarityMatch>,
    fail_find: bool,
    fail_usage: bool,
    pub find_calls: AtomicUsize,
    pub usage_calls: AtomicUsize,
    usage_log: Mutex<Vec<(String, u64)>>,
}

impl FakeDirectory {
    pub fn with_similar(mut self, similar: Vec<SimilarityMatch>) -> Self {
        self.similar = similar;
        self
    }

    pub fn with_find_failure(mut self) -> Self {
        self.fail_find = true;
        self
    }

    pub fn with_usage_failure(mut self) -> Self {
        self.fail_usage = true;
        self
    }

    pub fn usage_log(&self) -> Vec<(String, u64)> {
        self.usage_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ShopDirectory for FakeDirectory {
    async fn get_shop(&self, id: &str) -> Result<Option<ShopRecord>> {
        Ok(self.shops.iter().find(|s| s.id == id).cloned())
    }

    async fn find_similar(
        &self,
        _embedding: &[f32],
        top_n: u64,
        _threshold: f32,
    ) -> Result<Vec<SimilarityMatch>> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_find {
            bail!("directory unreachable");
        }
        Ok(self.similar.iter().take(top_n as usize).cloned().collect())
    }

    async fn record_usage(&self, shop_id: &str, count: u64) -> Result<()> {
        self.usage_calls.fetch_add(1, Ordering::SeqCst);
        self.usage_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((shop_id.to_string(), count));
        if self.fail_usage {
            bail!("usage recording rejected");
        }
        Ok(())
    }
}
