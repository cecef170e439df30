//! Persisted chat widget history.
use crate::assistant::{Assistant, AssistantReply};
use crate::client::ChatMessage;
use curalink_common::{CuralinkError, Result};
use curalink_store::{keys, JsonStore};
use tracing::debug;

pub const GREETING: &str = "Hi! I'm your CuraLink AI Assistant. I can help you find experts, clinical trials, publications, or answer questions about medical research. How can I help you today?";

/// History for one chat widget, saved in the session scope after each turn.
#[derive(Debug, Clone)]
pub struct Conversation {
    store: JsonStore,
    key: String,
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Load the default widget history.
    pub async fn load(store: JsonStore) -> Result<Self> {
        Self::load_keyed(store, keys::CHAT_MESSAGES).await
    }

    /// Load the history under `key`, seeding the greeting when nothing is
    /// stored yet. An unreadable history starts over.
    pub async fn load_keyed(store: JsonStore, key: &str) -> Result<Self> {
        let stored = match store.get_json::<Vec<ChatMessage>>(key).await {
            Ok(found) => found.unwrap_or_default(),
            Err(CuralinkError::Serialization(e)) => {
                tracing::warn!(key, error = %e, "conversation.unreadable_reset");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        let messages = if stored.is_empty() {
            vec![ChatMessage::assistant(GREETING)]
        } else {
            stored
        };
        Ok(Self {
            store,
            key: key.to_string(),
            messages,
        })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Run one turn. Blank input is rejected without touching the history.
    pub async fn send(&mut self, assistant: &Assistant, input: &str) -> Result<AssistantReply> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CuralinkError::InvalidInput("message must not be blank".into()));
        }

        let reply = assistant.respond(input, &self.messages).await;
        self.messages.push(ChatMessage::user(input));
        self.messages.push(ChatMessage::assistant(reply.text()));
        self.store.set_json(&self.key, &self.messages).await?;

        debug!(key = %self.key, turns = self.messages.len(), degraded = reply.is_degraded(), "conversation.turn");
        Ok(reply)
    }

    /// Forget the stored history and start again from the greeting.
    pub async fn reset(&mut self) -> Result<()> {
        self.store.remove(&self.key).await?;
        self.messages = vec![ChatMessage::assistant(GREETING)];
        Ok(())
    }
}
