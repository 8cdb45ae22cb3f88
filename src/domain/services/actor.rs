#[cfg(test)]
#[path = "actor_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Actor;
use crate::domain::models::ActorError;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::ConnectionState;
use crate::domain::models::Identity;
use crate::infrastructure::backends::BackendManager;

pub type BackendFactory = Arc<dyn Fn(&Identity) -> Result<BackendBox> + Send + Sync>;

/// Hands out one backend handle per identity, building it on first use.
pub struct ActorService {
    factory: BackendFactory,
    actors: DashMap<String, Actor>,
    states: DashMap<String, ConnectionState>,
    admin_token: Mutex<Option<String>>,
}

impl Default for ActorService {
    fn default() -> ActorService {
        let factory: BackendFactory = Arc::new(|identity: &Identity| {
            let name = BackendName::parse(Config::get(ConfigKey::Backend))
                .unwrap_or(BackendName::Http);
            return BackendManager::get(name, identity);
        });

        return ActorService::with_factory(factory, &Config::get(ConfigKey::AdminToken));
    }
}

impl ActorService {
    /// Blank admin tokens are ignored.
    pub fn with_factory(factory: BackendFactory, admin_token: &str) -> ActorService {
        let admin_token = admin_token.trim();

        return ActorService {
            factory,
            actors: DashMap::new(),
            states: DashMap::new(),
            admin_token: Mutex::new(if admin_token.is_empty() {
                None
            } else {
                Some(admin_token.to_string())
            }),
        };
    }

    pub fn state(&self, identity: &Identity) -> ConnectionState {
        if let Some(state) = self.states.get(&identity.cache_key()) {
            return state.clone();
        }

        return ConnectionState::Idle;
    }

    /// Already constructed handle for the identity, without connecting.
    pub fn actor(&self, identity: &Identity) -> Result<Actor, ActorError> {
        if let Some(actor) = self.actors.get(&identity.cache_key()) {
            return Ok(actor.clone());
        }

        return Err(ActorError::NotReady);
    }

    pub async fn connect(&self, identity: &Identity) -> Result<Actor, ActorError> {
        let cache_key = identity.cache_key();
        if let Some(actor) = self.actors.get(&cache_key) {
            return Ok(actor.clone());
        }

        self.states
            .insert(cache_key.to_string(), ConnectionState::Connecting);

        let retries = Config::get_u64(ConfigKey::ConnectRetries);
        let delay = Duration::from_millis(Config::get_u64(ConfigKey::ConnectRetryDelay));

        let mut last_err = "".to_string();
        for attempt in 0..=retries {
            if attempt > 0 {
                tokio::time::sleep(delay).await;
            }

            match self.construct(identity).await {
                Ok(actor) => {
                    self.actors.insert(cache_key.to_string(), actor.clone());
                    self.states.insert(cache_key, ConnectionState::Ready);
                    return Ok(actor);
                }
                Err(err) => {
                    tracing::warn!(attempt, error = format!("{err:#}"), "backend connection failed");
                    last_err = format!("{err:#}");
                }
            }
        }

        let err = ActorError::Connection(last_err);
        self.states
            .insert(cache_key, ConnectionState::Error(err.clone()));

        return Err(err);
    }

    /// Drops whatever is known about the identity and connects again.
    pub async fn retry(&self, identity: &Identity) -> Result<Actor, ActorError> {
        let cache_key = identity.cache_key();
        self.actors.remove(&cache_key);
        self.states.remove(&cache_key);

        return self.connect(identity).await;
    }

    async fn construct(&self, identity: &Identity) -> Result<Actor> {
        let backend = (self.factory)(identity)?;
        backend.health_check().await?;

        if identity.is_authenticated() {
            // Consumed only once the backend accepted it, failed attempts keep
            // it for the next retry.
            let mut admin_token = self.admin_token.lock().await;
            if let Some(token) = admin_token.clone() {
                backend.initialize_access_control_with_secret(&token).await?;
                *admin_token = None;
                tracing::info!(backend = backend.name().to_string(), "admin access initialized");
            }
        }

        return Ok(Arc::from(backend));
    }
}
