#[cfg(test)]
#[path = "workflows_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;

use super::BackendErrors;
use super::Catalog;
use super::QueryCache;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Actor;
use crate::domain::models::ProviderConfig;
use crate::domain::models::WorkflowRun;
use crate::domain::models::WorkflowStatus;
use crate::domain::models::WorkflowType;
use crate::infrastructure::generators::GeneratorManager;

/// Whether the client has an execution path for this provider and workflow.
/// Only image generation through a registered generator does today.
pub fn is_integrated(provider: &ProviderConfig, workflow_type: WorkflowType) -> bool {
    return workflow_type == WorkflowType::ImageGeneration
        && GeneratorManager::supports(provider.id);
}

pub struct WorkflowService {
    actor: Actor,
    cache: Arc<QueryCache>,
    poll_interval: Duration,
}

impl WorkflowService {
    pub fn new(actor: Actor, cache: Arc<QueryCache>) -> WorkflowService {
        return WorkflowService {
            actor,
            cache,
            poll_interval: Duration::from_millis(Config::get_u64(ConfigKey::PollInterval)),
        };
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> WorkflowService {
        self.poll_interval = poll_interval;
        return self;
    }

    fn cache_key(provider: &str) -> String {
        return QueryCache::key(&["workflowRuns", provider]);
    }

    fn log_failure(action: &str, err: &anyhow::Error) {
        tracing::error!(
            action,
            error = BackendErrors::sanitize_for_logging(err),
            "workflow call failed"
        );
    }

    /// Records a new `pending` run. Providers without an execution path are
    /// refused before anything reaches the backend.
    pub async fn execute(
        &self,
        provider_id: &str,
        workflow_type: WorkflowType,
        inputs: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<WorkflowRun> {
        let provider = match Catalog::by_id(provider_id) {
            Some(provider) => provider,
            None => bail!(format!("Provider not found: {provider_id}")),
        };

        if !is_integrated(provider, workflow_type) {
            bail!(format!(
                "{} - Not Integrated Yet: {} workflows are not available for {}",
                workflow_type.label(),
                workflow_type.label(),
                provider.display_name
            ));
        }

        let inputs_json = serde_json::to_string(inputs)?;
        let run = self
            .actor
            .execute_workflow(provider_id, &workflow_type.to_string(), &inputs_json)
            .await
            .map_err(|err| {
                WorkflowService::log_failure("execute", &err);
                return err;
            })?;

        self.cache.invalidate(&WorkflowService::cache_key(provider_id));
        tracing::info!(run_id = run.id.as_str(), provider = provider_id, "workflow run created");

        return Ok(run);
    }

    pub async fn update(
        &self,
        run_id: &str,
        provider: &str,
        status: WorkflowStatus,
        output_blob_id: Option<String>,
        duration_nanos: Option<u64>,
    ) -> Result<WorkflowRun> {
        let res = self
            .actor
            .update_workflow_run(run_id, status, output_blob_id, duration_nanos)
            .await;
        self.cache.invalidate(&WorkflowService::cache_key(provider));

        return res.map_err(|err| {
            WorkflowService::log_failure("update", &err);
            return err;
        });
    }

    pub async fn list(&self, provider: &str) -> Result<Vec<WorkflowRun>> {
        return self
            .cache
            .get_or_fetch(&WorkflowService::cache_key(provider), || {
                return self.actor.get_workflow_runs(provider);
            })
            .await;
    }

    /// Fresh copy of a single run, bypassing the cache.
    pub async fn refetch(&self, run_id: &str, provider: &str) -> Result<Option<WorkflowRun>> {
        self.cache.invalidate(&WorkflowService::cache_key(provider));
        let runs = self.list(provider).await?;

        return Ok(runs.into_iter().find(|run| return run.id == run_id));
    }

    pub async fn cancel(&self, run_id: &str, provider: &str) -> Result<()> {
        self.actor.cancel_workflow_run(run_id).await.map_err(|err| {
            WorkflowService::log_failure("cancel", &err);
            return err;
        })?;
        self.cache.invalidate(&WorkflowService::cache_key(provider));

        return Ok(());
    }

    pub async fn clear_pending(&self, provider: &str) -> Result<()> {
        self.actor
            .cancel_pending_workflow_runs_for_provider(provider)
            .await
            .map_err(|err| {
                WorkflowService::log_failure("clear_pending", &err);
                return err;
            })?;
        self.cache.invalidate(&WorkflowService::cache_key(provider));

        return Ok(());
    }

    /// How long to wait before refetching, or `None` once every run has
    /// settled.
    pub fn refetch_interval(&self, runs: &[WorkflowRun]) -> Option<Duration> {
        if runs.iter().any(|run| return run.status.is_active()) {
            return Some(self.poll_interval);
        }

        return None;
    }

    /// Refetches runs for a provider until none are pending or running,
    /// handing every snapshot to `on_update`.
    pub async fn watch<F>(&self, provider: &str, mut on_update: F) -> Result<Vec<WorkflowRun>>
    where
        F: FnMut(&[WorkflowRun]),
    {
        loop {
            self.cache.invalidate(&WorkflowService::cache_key(provider));
            let runs = self.list(provider).await?;
            on_update(&runs);

            match self.refetch_interval(&runs) {
                Some(interval) => tokio::time::sleep(interval).await,
                None => return Ok(runs),
            }
        }
    }
}
