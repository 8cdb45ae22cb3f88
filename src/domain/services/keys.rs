#[cfg(test)]
#[path = "keys_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;

use super::BackendErrors;
use super::QueryCache;
use crate::domain::models::Actor;
use crate::domain::models::ApiKey;
use crate::domain::models::MIN_API_KEY_LENGTH;

pub struct KeyService {
    actor: Actor,
    cache: Arc<QueryCache>,
}

impl KeyService {
    pub fn new(actor: Actor, cache: Arc<QueryCache>) -> KeyService {
        return KeyService { actor, cache };
    }

    fn cache_key(provider: &str) -> String {
        return QueryCache::key(&["providerKey", provider]);
    }

    pub async fn exists(&self, provider: &str) -> Result<bool> {
        return self
            .cache
            .get_or_fetch(&KeyService::cache_key(provider), || {
                return self.actor.provider_key_exists(provider);
            })
            .await;
    }

    /// Full key, read right before it is handed to a provider. Never cached.
    pub async fn get(&self, provider: &str) -> Result<Option<ApiKey>> {
        return self.actor.get_provider_key(provider).await;
    }

    pub async fn save(&self, provider: &str, key: &str) -> Result<()> {
        let key = key.trim();
        if key.chars().count() < MIN_API_KEY_LENGTH {
            bail!(format!(
                "API key must be at least {MIN_API_KEY_LENGTH} characters"
            ));
        }

        if let Err(err) = self.actor.add_or_update_api_key(provider, key).await {
            tracing::error!(
                provider,
                error = BackendErrors::sanitize_for_logging(&err),
                "Save API key error"
            );
            bail!(BackendErrors::user_friendly_message(&err, true));
        }

        self.cache.invalidate(&KeyService::cache_key(provider));
        tracing::info!(provider, "api key saved");

        return Ok(());
    }
}
