#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use uuid::Uuid;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ApiKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatMessage;
use crate::domain::models::CustomProviderMetadata;
use crate::domain::models::Identity;
use crate::domain::models::ProviderInfo;
use crate::domain::models::UserProfile;
use crate::domain::models::UserRole;
use crate::domain::models::WorkflowRun;
use crate::domain::models::WorkflowStatus;
use crate::domain::models::ANONYMOUS_PRINCIPAL;

pub const CANCELLED_MESSAGE: &str = "Cancelled by user";

/// Lives as long as the process, so nothing carries over between CLI
/// invocations. The admin secret is the configured admin token.
static SHARED_STORE: Lazy<Arc<MemoryStore>> = Lazy::new(|| {
    return Arc::new(MemoryStore::seeded(&Config::get(ConfigKey::AdminToken)));
});

fn now_nanos() -> u64 {
    return Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
}

struct StoredRun {
    owner: String,
    seq: u64,
    run: WorkflowRun,
}

/// State of the in-process sandbox backend. Everything is scoped per
/// principal the same way the real backend scopes it per caller.
#[derive(Default)]
pub struct MemoryStore {
    admin_secret: Option<String>,
    roles: DashMap<String, UserRole>,
    api_keys: DashMap<(String, String), ApiKey>,
    chats: DashMap<(String, String), Vec<ChatMessage>>,
    providers: DashMap<String, ProviderInfo>,
    custom_metadata: DashMap<(String, String), CustomProviderMetadata>,
    runs: DashMap<String, StoredRun>,
    seq: AtomicU64,
}

impl MemoryStore {
    pub fn with_admin_secret(secret: &str) -> MemoryStore {
        return MemoryStore {
            admin_secret: Some(secret.to_string()),
            ..MemoryStore::default()
        };
    }

    /// Store accepting `secret` as the admin secret. A blank secret grants
    /// nobody admin.
    pub fn seeded(secret: &str) -> MemoryStore {
        let secret = secret.trim();
        if secret.is_empty() {
            return MemoryStore::default();
        }

        return MemoryStore::with_admin_secret(secret);
    }
}

pub struct MemoryBackend {
    store: Arc<MemoryStore>,
    principal: Option<String>,
}

impl MemoryBackend {
    /// Backend over the process wide store.
    pub fn new(identity: &Identity) -> MemoryBackend {
        return MemoryBackend::with_store(SHARED_STORE.clone(), identity);
    }

    pub fn with_store(store: Arc<MemoryStore>, identity: &Identity) -> MemoryBackend {
        return MemoryBackend {
            store,
            principal: identity.principal().map(|principal| return principal.to_string()),
        };
    }

    fn caller(&self) -> String {
        return self
            .principal
            .clone()
            .unwrap_or_else(|| return ANONYMOUS_PRINCIPAL.to_string());
    }

    fn role(&self) -> UserRole {
        if self.principal.is_none() {
            return UserRole::Guest;
        }

        if let Some(role) = self.store.roles.get(&self.caller()) {
            return *role;
        }

        return UserRole::User;
    }

    fn require_user(&self, action: &str) -> Result<String> {
        if self.role() == UserRole::Guest {
            bail!(format!("Unauthorized: Only users can {action}"));
        }

        return Ok(self.caller());
    }

    /// Applies `change` to a run owned by the caller. The entry stays locked
    /// until `change` returns.
    fn with_owned_run<T, F>(&self, run_id: &str, change: F) -> Result<T>
    where
        F: FnOnce(&mut WorkflowRun) -> Result<T>,
    {
        let caller = self.require_user("access workflow runs")?;
        let mut stored = match self.store.runs.get_mut(run_id) {
            Some(stored) => stored,
            None => bail!(format!("Workflow run not found: {run_id}")),
        };

        if stored.owner != caller {
            bail!("Unauthorized: Can only access your own workflow runs");
        }

        return change(&mut stored.run);
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> BackendName {
        return BackendName::Memory;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn initialize_access_control_with_secret(&self, token: &str) -> Result<()> {
        let caller = self.require_user("initialize access control")?;

        if self.store.admin_secret.as_deref() == Some(token) {
            self.store.roles.insert(caller, UserRole::Admin);
        } else {
            self.store.roles.entry(caller).or_insert(UserRole::User);
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_current_user(&self) -> Result<String> {
        return Ok(self.caller());
    }

    #[allow(clippy::implicit_return)]
    async fn get_caller_user_role(&self) -> Result<UserRole> {
        return Ok(self.role());
    }

    #[allow(clippy::implicit_return)]
    async fn is_caller_admin(&self) -> Result<bool> {
        return Ok(self.role() == UserRole::Admin);
    }

    #[allow(clippy::implicit_return)]
    async fn assign_caller_user_role(&self, user: &str, role: UserRole) -> Result<()> {
        if self.role() != UserRole::Admin {
            bail!("Unauthorized: Only admins can assign user roles");
        }

        self.store.roles.insert(user.to_string(), role);
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
        // Nothing in the RPC surface writes profiles.
        self.require_user("view profiles")?;
        return Ok(None);
    }

    #[allow(clippy::implicit_return)]
    async fn add_or_update_api_key(&self, provider: &str, key: &str) -> Result<()> {
        let caller = self.require_user("save API keys")?;
        let now = now_nanos();

        self.store
            .api_keys
            .entry((caller, provider.to_string()))
            .and_modify(|existing| {
                existing.key = key.to_string();
                existing.updated_at = now;
            })
            .or_insert_with(|| {
                return ApiKey {
                    key: key.to_string(),
                    provider: provider.to_string(),
                    created_at: now,
                    updated_at: now,
                };
            });

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_provider_key(&self, provider: &str) -> Result<Option<ApiKey>> {
        let caller = self.require_user("access API keys")?;
        return Ok(self
            .store
            .api_keys
            .get(&(caller, provider.to_string()))
            .map(|key| return key.clone()));
    }

    #[allow(clippy::implicit_return)]
    async fn provider_key_exists(&self, provider: &str) -> Result<bool> {
        let caller = self.require_user("access API keys")?;
        return Ok(self
            .store
            .api_keys
            .contains_key(&(caller, provider.to_string())));
    }

    #[allow(clippy::implicit_return)]
    async fn add_chat_message(&self, provider: &str, content: &str) -> Result<()> {
        let caller = self.require_user("send chat messages")?;
        self.store
            .chats
            .entry((caller, provider.to_string()))
            .or_default()
            .push(ChatMessage {
                content: content.to_string(),
                provider: provider.to_string(),
                from_system: false,
                timestamp: now_nanos(),
            });

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn stream_chat_messages(&self, provider: &str, limit: u64) -> Result<Vec<ChatMessage>> {
        let caller = self.require_user("read chat messages")?;
        let messages = match self.store.chats.get(&(caller, provider.to_string())) {
            Some(messages) => messages.clone(),
            None => return Ok(vec![]),
        };

        let skip = messages.len().saturating_sub(limit as usize);
        return Ok(messages.into_iter().skip(skip).collect());
    }

    #[allow(clippy::implicit_return)]
    async fn get_all_providers(&self) -> Result<Vec<ProviderInfo>> {
        let mut providers = self
            .store
            .providers
            .iter()
            .map(|entry| return entry.value().clone())
            .collect::<Vec<ProviderInfo>>();
        providers.sort_by(|a, b| return a.name.cmp(&b.name));

        return Ok(providers);
    }

    #[allow(clippy::implicit_return)]
    async fn initialize_providers(&self, providers: Vec<ProviderInfo>) -> Result<()> {
        self.require_user("initialize providers")?;
        for provider in providers {
            self.store.providers.insert(provider.name.to_string(), provider);
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_custom_provider_metadata(
        &self,
        provider_key: &str,
    ) -> Result<Option<CustomProviderMetadata>> {
        let caller = self.require_user("read provider metadata")?;
        return Ok(self
            .store
            .custom_metadata
            .get(&(caller, provider_key.to_string()))
            .map(|metadata| return metadata.clone()));
    }

    #[allow(clippy::implicit_return)]
    async fn set_custom_provider_metadata(
        &self,
        provider_key: &str,
        display_name: &str,
    ) -> Result<()> {
        let caller = self.require_user("rename providers")?;
        self.store.custom_metadata.insert(
            (caller, provider_key.to_string()),
            CustomProviderMetadata {
                display_name: display_name.to_string(),
            },
        );

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn execute_workflow(
        &self,
        provider: &str,
        workflow_type: &str,
        inputs_json: &str,
    ) -> Result<WorkflowRun> {
        let caller = self.require_user("execute workflows")?;
        let run = WorkflowRun {
            id: Uuid::new_v4().to_string(),
            provider: provider.to_string(),
            workflow_type: workflow_type.to_string(),
            inputs: inputs_json.to_string(),
            status: WorkflowStatus::Pending,
            output_blob_id: None,
            duration_nanos: None,
            created_at: now_nanos(),
        };

        self.store.runs.insert(
            run.id.to_string(),
            StoredRun {
                owner: caller,
                seq: self.store.seq.fetch_add(1, Ordering::SeqCst),
                run: run.clone(),
            },
        );

        return Ok(run);
    }

    #[allow(clippy::implicit_return)]
    async fn update_workflow_run(
        &self,
        run_id: &str,
        status: WorkflowStatus,
        output_blob_id: Option<String>,
        duration_nanos: Option<u64>,
    ) -> Result<WorkflowRun> {
        return self.with_owned_run(run_id, |run| {
            if !run.status.can_transition_to(&status) {
                bail!(format!(
                    "Invalid workflow run transition for {run_id}: {} -> {}",
                    run.status.label(),
                    status.label()
                ));
            }

            run.status = status;
            run.output_blob_id = output_blob_id;
            run.duration_nanos = duration_nanos;
            return Ok(run.clone());
        });
    }

    #[allow(clippy::implicit_return)]
    async fn get_workflow_runs(&self, provider: &str) -> Result<Vec<WorkflowRun>> {
        let caller = self.require_user("access workflow runs")?;
        let mut runs = self
            .store
            .runs
            .iter()
            .filter(|entry| return entry.owner == caller && entry.run.provider == provider)
            .map(|entry| return (entry.seq, entry.run.clone()))
            .collect::<Vec<(u64, WorkflowRun)>>();
        runs.sort_by(|a, b| return b.0.cmp(&a.0));

        return Ok(runs.into_iter().map(|(_, run)| return run).collect());
    }

    #[allow(clippy::implicit_return)]
    async fn cancel_workflow_run(&self, run_id: &str) -> Result<()> {
        return self.with_owned_run(run_id, |run| {
            if run.status.is_terminal() {
                bail!(format!("Workflow run {run_id} has already finished"));
            }

            run.status = WorkflowStatus::Failed(CANCELLED_MESSAGE.to_string());
            return Ok(());
        });
    }

    #[allow(clippy::implicit_return)]
    async fn cancel_pending_workflow_runs_for_provider(&self, provider: &str) -> Result<()> {
        let caller = self.require_user("cancel workflow runs")?;
        for mut entry in self.store.runs.iter_mut() {
            if entry.owner == caller
                && entry.run.provider == provider
                && entry.run.status == WorkflowStatus::Pending
            {
                entry.run.status = WorkflowStatus::Failed(CANCELLED_MESSAGE.to_string());
            }
        }

        return Ok(());
    }
}
