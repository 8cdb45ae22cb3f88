use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;

use super::ApiKey;
use super::ChatMessage;
use super::CustomProviderMetadata;
use super::ProviderInfo;
use super::UserProfile;
use super::UserRole;
use super::WorkflowRun;
use super::WorkflowStatus;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum BackendName {
    Http,
    Memory,
}

impl BackendName {
    pub fn parse(text: String) -> Option<BackendName> {
        return text.parse::<BackendName>().ok();
    }
}

/// Remote-callable interface of the backend actor. Every call is a single
/// request/response; the backend is the system of record for all of it.
#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used when constructing the actor to verify the backend is reachable.
    async fn health_check(&self) -> Result<()>;

    /// Promotes the caller to admin when the secret matches. Called at most
    /// once per actor construction.
    async fn initialize_access_control_with_secret(&self, token: &str) -> Result<()>;

    async fn get_current_user(&self) -> Result<String>;

    async fn get_caller_user_role(&self) -> Result<UserRole>;

    async fn is_caller_admin(&self) -> Result<bool>;

    async fn assign_caller_user_role(&self, user: &str, role: UserRole) -> Result<()>;

    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>>;

    async fn add_or_update_api_key(&self, provider: &str, key: &str) -> Result<()>;

    async fn get_provider_key(&self, provider: &str) -> Result<Option<ApiKey>>;

    async fn provider_key_exists(&self, provider: &str) -> Result<bool>;

    async fn add_chat_message(&self, provider: &str, content: &str) -> Result<()>;

    /// Most recent `limit` messages for a provider, oldest first.
    async fn stream_chat_messages(&self, provider: &str, limit: u64) -> Result<Vec<ChatMessage>>;

    async fn get_all_providers(&self) -> Result<Vec<ProviderInfo>>;

    async fn initialize_providers(&self, providers: Vec<ProviderInfo>) -> Result<()>;

    async fn get_custom_provider_metadata(
        &self,
        provider_key: &str,
    ) -> Result<Option<CustomProviderMetadata>>;

    async fn set_custom_provider_metadata(
        &self,
        provider_key: &str,
        display_name: &str,
    ) -> Result<()>;

    /// Records a new run in `pending`.
    async fn execute_workflow(
        &self,
        provider: &str,
        workflow_type: &str,
        inputs_json: &str,
    ) -> Result<WorkflowRun>;

    async fn update_workflow_run(
        &self,
        run_id: &str,
        status: WorkflowStatus,
        output_blob_id: Option<String>,
        duration_nanos: Option<u64>,
    ) -> Result<WorkflowRun>;

    /// Runs for a provider, newest first.
    async fn get_workflow_runs(&self, provider: &str) -> Result<Vec<WorkflowRun>>;

    async fn cancel_workflow_run(&self, run_id: &str) -> Result<()>;

    async fn cancel_pending_workflow_runs_for_provider(&self, provider: &str) -> Result<()>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;

/// Shared handle to a constructed backend, reused by every service.
pub type Actor = Arc<dyn Backend + Send + Sync>;
