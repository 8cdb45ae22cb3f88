#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

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

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    ok: serde_json::Value,
    err: Option<String>,
}

/// Talks to the backend actor through its JSON gateway. Every method is a
/// `POST /api/{method}` with named arguments.
pub struct HttpBackend {
    url: String,
    timeout: u64,
    principal: Option<String>,
}

impl HttpBackend {
    pub fn new(identity: &Identity) -> HttpBackend {
        return HttpBackend::with_url(&Config::get(ConfigKey::BackendURL), identity);
    }

    pub fn with_url(url: &str, identity: &Identity) -> HttpBackend {
        return HttpBackend {
            url: url.trim_end_matches('/').to_string(),
            timeout: Config::get_u64(ConfigKey::BackendTimeout),
            principal: identity.principal().map(|principal| return principal.to_string()),
        };
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, args: serde_json::Value) -> Result<T> {
        let mut req = reqwest::Client::new()
            .post(format!("{url}/api/{method}", url = self.url))
            .json(&args);

        if let Some(principal) = &self.principal {
            req = req.header("X-Principal", principal);
        }

        let res = req.send().await?;
        let status = res.status();
        let body = res.text().await?;
        let rpc = serde_json::from_str::<RpcResponse>(&body).unwrap_or_default();

        if !status.is_success() || rpc.err.is_some() {
            tracing::error!(method, status = status.as_u16(), "Backend call failed");
            if let Some(reject) = rpc.err {
                bail!(reject);
            }
            bail!(format!("Backend call {method} failed with status {status}"));
        }

        return Ok(serde_json::from_value(rpc.ok)?);
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> BackendName {
        return BackendName::Http;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let res = reqwest::Client::new()
            .get(format!("{url}/health", url = self.url))
            .timeout(Duration::from_millis(self.timeout))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Backend is not reachable");
                bail!(format!("Backend is not reachable: {err}"));
            }
        };

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Backend health check failed");
            bail!("Backend health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn initialize_access_control_with_secret(&self, token: &str) -> Result<()> {
        return self
            .call("initializeAccessControlWithSecret", json!({ "secret": token }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_current_user(&self) -> Result<String> {
        return self.call("getCurrentUser", json!({})).await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_caller_user_role(&self) -> Result<UserRole> {
        return self.call("getCallerUserRole", json!({})).await;
    }

    #[allow(clippy::implicit_return)]
    async fn is_caller_admin(&self) -> Result<bool> {
        return self.call("isCallerAdmin", json!({})).await;
    }

    #[allow(clippy::implicit_return)]
    async fn assign_caller_user_role(&self, user: &str, role: UserRole) -> Result<()> {
        return self
            .call("assignCallerUserRole", json!({ "user": user, "role": role }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
        return self.call("getCallerUserProfile", json!({})).await;
    }

    #[allow(clippy::implicit_return)]
    async fn add_or_update_api_key(&self, provider: &str, key: &str) -> Result<()> {
        return self
            .call(
                "addOrUpdateAPIKey",
                json!({ "provider": provider, "key": key }),
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_provider_key(&self, provider: &str) -> Result<Option<ApiKey>> {
        return self
            .call("getProviderKey", json!({ "provider": provider }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn provider_key_exists(&self, provider: &str) -> Result<bool> {
        return self
            .call("providerKeyExists", json!({ "provider": provider }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn add_chat_message(&self, provider: &str, content: &str) -> Result<()> {
        return self
            .call(
                "addChatMessage",
                json!({ "provider": provider, "content": content }),
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn stream_chat_messages(&self, provider: &str, limit: u64) -> Result<Vec<ChatMessage>> {
        return self
            .call(
                "streamChatMessages",
                json!({ "provider": provider, "limit": limit }),
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_all_providers(&self) -> Result<Vec<ProviderInfo>> {
        return self.call("getAllProviders", json!({})).await;
    }

    #[allow(clippy::implicit_return)]
    async fn initialize_providers(&self, providers: Vec<ProviderInfo>) -> Result<()> {
        return self
            .call("initializeProviders", json!({ "providers": providers }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_custom_provider_metadata(
        &self,
        provider_key: &str,
    ) -> Result<Option<CustomProviderMetadata>> {
        return self
            .call(
                "getCustomProviderMetadata",
                json!({ "providerKey": provider_key }),
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn set_custom_provider_metadata(
        &self,
        provider_key: &str,
        display_name: &str,
    ) -> Result<()> {
        return self
            .call(
                "setCustomProviderMetadata",
                json!({ "providerKey": provider_key, "displayName": display_name }),
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn execute_workflow(
        &self,
        provider: &str,
        workflow_type: &str,
        inputs_json: &str,
    ) -> Result<WorkflowRun> {
        return self
            .call(
                "executeWorkflow",
                json!({
                    "provider": provider,
                    "workflowType": workflow_type,
                    "inputs": inputs_json,
                }),
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn update_workflow_run(
        &self,
        run_id: &str,
        status: WorkflowStatus,
        output_blob_id: Option<String>,
        duration_nanos: Option<u64>,
    ) -> Result<WorkflowRun> {
        return self
            .call(
                "updateWorkflowRun",
                json!({
                    "runId": run_id,
                    "status": status,
                    "outputBlobId": output_blob_id,
                    "durationNanos": duration_nanos,
                }),
            )
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_workflow_runs(&self, provider: &str) -> Result<Vec<WorkflowRun>> {
        return self
            .call("getWorkflowRuns", json!({ "provider": provider }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn cancel_workflow_run(&self, run_id: &str) -> Result<()> {
        return self
            .call("cancelWorkflowRun", json!({ "runId": run_id }))
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn cancel_pending_workflow_runs_for_provider(&self, provider: &str) -> Result<()> {
        return self
            .call(
                "cancelPendingWorkflowRunsForProvider",
                json!({ "provider": provider }),
            )
            .await;
    }
}
