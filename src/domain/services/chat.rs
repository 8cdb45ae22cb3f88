#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;

use super::BackendErrors;
use super::QueryCache;
use crate::domain::models::Actor;
use crate::domain::models::ChatMessage;
use crate::domain::models::CHAT_HISTORY_LIMIT;

pub struct ChatService {
    actor: Actor,
    cache: Arc<QueryCache>,
}

impl ChatService {
    pub fn new(actor: Actor, cache: Arc<QueryCache>) -> ChatService {
        return ChatService { actor, cache };
    }

    fn cache_key(provider: &str) -> String {
        return QueryCache::key(&["chatMessages", provider]);
    }

    pub async fn messages(&self, provider: &str) -> Result<Vec<ChatMessage>> {
        return self
            .cache
            .get_or_fetch(&ChatService::cache_key(provider), || {
                return self
                    .actor
                    .stream_chat_messages(provider, CHAT_HISTORY_LIMIT);
            })
            .await;
    }

    pub async fn send(&self, provider: &str, content: &str) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            bail!("Message cannot be empty");
        }

        if let Err(err) = self.actor.add_chat_message(provider, content).await {
            tracing::error!(
                provider,
                error = BackendErrors::sanitize_for_logging(&err),
                "Send chat message error"
            );
            bail!(BackendErrors::user_friendly_message(&err, true));
        }

        self.cache.invalidate(&ChatService::cache_key(provider));
        return Ok(());
    }
}
