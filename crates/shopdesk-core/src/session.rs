//! ============================================================================
//! Chat Session - Conversation state machine for one shop screen
//! ============================================================================
//! Owns the message history, the in-flight guard, and the error banner.
//! Every send either appends a user message and exactly one assistant
//! message (real reply or mapped error text) and returns to idle, or is
//! rejected by the entry guard without touching history. No failure ever
//! propagates to the surrounding UI as an uncaught fault.
//! ============================================================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::ai::AiService;
use crate::analytics::UsageRecorder;
use crate::context::ContextResolver;
use crate::directory::ShopDirectory;
use crate::error::AssistantError;
use crate::shop::ShopRecord;
use crate::types::ChatMessage;

/// Result of a `send_message` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// A reply was generated and appended.
    Replied,
    /// The turn failed; the mapped error text was appended instead.
    Failed,
    /// Rejected by the guard: a request is already in flight.
    Busy,
    /// Rejected: empty input after trimming.
    Ignored,
}

struct SessionState {
    shop: ShopRecord,
    messages: Vec<ChatMessage>,
    processing: bool,
    last_error: Option<String>,
    /// Bumped on every shop load; a turn whose epoch no longer matches is
    /// stale and must not touch the reseeded history.
    epoch: u64,
}

/// One customer chat session, scoped to one shop screen.
///
/// State lives behind a mutex that is only held between awaits; at most one
/// send cycle is in flight at a time, enforced by the `processing` flag.
pub struct ChatSession {
    id: Uuid,
    ai: Arc<dyn AiService>,
    resolver: ContextResolver,
    recorder: UsageRecorder,
    state: Mutex<SessionState>,
}

impl ChatSession {
    /// Create a session for `shop`, seeded with the assistant greeting.
    pub fn new(
        shop: ShopRecord,
        directory: Arc<dyn ShopDirectory>,
        ai: Arc<dyn AiService>,
    ) -> Self {
        let resolver = ContextResolver::new(Arc::clone(&directory), Arc::clone(&ai));
        let recorder = UsageRecorder::new(directory);
        let state = SessionState {
            messages: vec![greeting(&shop)],
            shop,
            processing: false,
            last_error: None,
            epoch: 0,
        };
        Self {
            id: Uuid::new_v4(),
            ai,
            resolver,
            recorder,
            state: Mutex::new(state),
        }
    }

    /// Replace the session's shop: history is reseeded with a fresh greeting
    /// and the error banner cleared. Any in-flight turn becomes stale and
    /// its late result is dropped.
    pub fn load_shop(&self, shop: ShopRecord) {
        let mut state = self.lock_state();
        state.messages = vec![greeting(&shop)];
        state.shop = shop;
        state.processing = false;
        state.last_error = None;
        state.epoch += 1;
    }

    /// Handle one user input.
    ///
    /// Empty trimmed input and sends while a cycle is in flight are rejected
    /// without touching history; re-entrant sends are never queued. All
    /// failures inside the cycle are converted to an appended assistant
    /// message plus the banner string, and the session always returns to
    /// idle.
    pub async fn send_message(&self, input: &str) -> SendOutcome {
        let question = input.trim().to_string();
        if question.is_empty() {
            return SendOutcome::Ignored;
        }

        // Entry guard: serialize to at most one in-flight cycle.
        let (shop, history, epoch) = {
            let mut state = self.lock_state();
            if state.processing {
                debug!("Session {}: send rejected, request already in flight", self.id);
                return SendOutcome::Busy;
            }
            let history = state.messages.clone();
            state.messages.push(ChatMessage::user(question.clone()));
            state.processing = true;
            state.last_error = None;
            (state.shop.clone(), history, state.epoch)
        };

        let result = self.run_cycle(&shop, &question, &history).await;

        let mut state = self.lock_state();
        if state.epoch != epoch {
            // The shop changed while this turn was in flight; the session it
            // would mutate is gone.
            debug!("Session {}: dropping late result for shop {}", self.id, shop.id);
            return match result {
                Ok(_) => SendOutcome::Replied,
                Err(_) => SendOutcome::Failed,
            };
        }
        state.processing = false;

        match result {
            Ok(reply) => {
                state.messages.push(ChatMessage::assistant(reply));
                drop(state);
                self.recorder.record(&shop.id);
                SendOutcome::Replied
            }
            Err(err) => {
                warn!("Session {}: chat cycle failed for shop {}: {}", self.id, shop.id, err);
                let text = err.user_message();
                state.messages.push(ChatMessage::assistant(text.clone()));
                state.last_error = Some(text);
                SendOutcome::Failed
            }
        }
    }

    /// Resolve grounding context, then generate. `history` is the snapshot
    /// taken before this turn's user message was appended.
    async fn run_cycle(
        &self,
        shop: &ShopRecord,
        question: &str,
        history: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        let context = self.resolver.resolve(shop, question).await?;
        self.ai.generate_reply(question, &context, history).await
    }

    // -- Read-only surface --

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn shop_id(&self) -> String {
        self.lock_state().shop.id.clone()
    }

    pub fn shop_name(&self) -> String {
        self.lock_state().shop.name.clone()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock_state().messages.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.lock_state().processing
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock_state().last_error.clone()
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn greeting(shop: &ShopRecord) -> ChatMessage {
    ChatMessage::assistant(format!(
        "Hello! I'm the AI assistant for {}. How can I help you today?",
        shop.name
    ))
}
