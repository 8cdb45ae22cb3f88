#[cfg(test)]
#[path = "image_generation_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Instant;

use anyhow::bail;
use anyhow::Result;

use super::Artifacts;
use super::KeyService;
use super::QueryCache;
use super::WorkflowService;
use crate::domain::models::Actor;
use crate::domain::models::ImageGenerationParams;
use crate::domain::models::ImageGenerationResult;
use crate::domain::models::ImageGeneratorBox;
use crate::domain::models::WorkflowRun;
use crate::domain::models::WorkflowStatus;
use crate::domain::models::WorkflowType;
use crate::infrastructure::generators;
use crate::infrastructure::generators::GeneratorManager;

pub type GeneratorFactory = Arc<dyn Fn(&str) -> Result<ImageGeneratorBox> + Send + Sync>;

const DEFAULT_FAILURE_MESSAGE: &str = "Image generation failed";

fn is_remote(url: &str) -> bool {
    return url.starts_with("http://") || url.starts_with("https://");
}

/// Drives a workflow run through generation: pending -> running -> success or
/// failed. The client drives every transition, the backend refuses the ones
/// that would leave a terminal state.
pub struct ImageGenerationService {
    workflows: WorkflowService,
    keys: KeyService,
    artifacts: Artifacts,
    generators: GeneratorFactory,
}

impl ImageGenerationService {
    pub fn new(actor: Actor, cache: Arc<QueryCache>) -> ImageGenerationService {
        return ImageGenerationService {
            workflows: WorkflowService::new(actor.clone(), cache.clone()),
            keys: KeyService::new(actor, cache),
            artifacts: Artifacts::default(),
            generators: Arc::new(GeneratorManager::get),
        };
    }

    pub fn with_generators(mut self, generators: GeneratorFactory) -> ImageGenerationService {
        self.generators = generators;
        return self;
    }

    pub fn with_artifacts(mut self, artifacts: Artifacts) -> ImageGenerationService {
        self.artifacts = artifacts;
        return self;
    }

    pub fn workflows(&self) -> &WorkflowService {
        return &self.workflows;
    }

    /// Creates a run for the provider and generates it straight away.
    pub async fn generate(
        &self,
        provider: &str,
        inputs: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<WorkflowRun> {
        let run = self
            .workflows
            .execute(provider, WorkflowType::ImageGeneration, inputs)
            .await?;

        return self.generate_for_run(&run, inputs).await;
    }

    /// Runs the generation for an existing run. On failure the run is marked
    /// failed and the same message is returned as the error. If the run gets
    /// cancelled while the provider is working, the result is dropped and the
    /// cancelled run is returned.
    pub async fn generate_for_run(
        &self,
        run: &WorkflowRun,
        inputs: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<WorkflowRun> {
        if let Some(current) = self.cancelled(run).await? {
            return Ok(current);
        }

        let started_run = self
            .record(run, WorkflowStatus::Running, None, None)
            .await?;
        if started_run.status.is_terminal() {
            return Ok(started_run);
        }
        tracing::info!(run_id = run.id.as_str(), provider = run.provider.as_str(), "generation started");

        let started = Instant::now();
        let res = self.dispatch(&run.provider, inputs).await;
        let duration_nanos = started.elapsed().as_nanos() as u64;

        if let Some(current) = self.cancelled(run).await? {
            tracing::info!(run_id = run.id.as_str(), "run cancelled during generation");
            return Ok(current);
        }

        let result = match res {
            Ok(result) => result,
            Err(err) => {
                let mut message = err.to_string();
                if message.trim().is_empty() {
                    message = DEFAULT_FAILURE_MESSAGE.to_string();
                }

                tracing::error!(
                    run_id = run.id.as_str(),
                    provider = run.provider.as_str(),
                    error = message.as_str(),
                    "generation failed"
                );
                let failed = WorkflowStatus::Failed(message.to_string());
                let current = self.record(run, failed.clone(), None, None).await?;
                if current.status != failed {
                    return Ok(current);
                }
                bail!(message);
            }
        };

        let output = self.store_output(run, result).await;
        tracing::info!(
            run_id = run.id.as_str(),
            duration_nanos,
            output = output.as_str(),
            "generation finished"
        );

        return self
            .record(run, WorkflowStatus::Success, Some(output), Some(duration_nanos))
            .await;
    }

    /// Writes the next status. When the backend refuses it because the run
    /// was cancelled in the meantime, the cancelled run is returned instead.
    async fn record(
        &self,
        run: &WorkflowRun,
        status: WorkflowStatus,
        output_blob_id: Option<String>,
        duration_nanos: Option<u64>,
    ) -> Result<WorkflowRun> {
        let err = match self
            .workflows
            .update(&run.id, &run.provider, status, output_blob_id, duration_nanos)
            .await
        {
            Ok(updated) => return Ok(updated),
            Err(err) => err,
        };

        if let Some(current) = self.cancelled(run).await? {
            tracing::info!(run_id = run.id.as_str(), "run cancelled before its status was recorded");
            return Ok(current);
        }

        return Err(err);
    }

    async fn dispatch(
        &self,
        provider: &str,
        inputs: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ImageGenerationResult> {
        let api_key = match self.keys.get(provider).await? {
            Some(api_key) => api_key,
            None => bail!(format!(
                "No API key found for {provider}. Please add your API key in the Key Vault."
            )),
        };

        let params = ImageGenerationParams::from_inputs(provider, inputs);
        if params.prompt.trim().is_empty() {
            bail!("Prompt is required for image generation");
        }

        let generator = (self.generators)(provider)?;
        return generator.generate(&api_key.key, &params).await;
    }

    /// Latest copy of the run when it has already reached a terminal state.
    async fn cancelled(&self, run: &WorkflowRun) -> Result<Option<WorkflowRun>> {
        let current = self.workflows.refetch(&run.id, &run.provider).await?;
        return Ok(current.filter(|current| return current.status.is_terminal()));
    }

    /// Saves the image bytes as an artifact and picks the reference recorded
    /// on the run: the remote URL when there is one, else the saved file.
    async fn store_output(&self, run: &WorkflowRun, result: ImageGenerationResult) -> String {
        let bytes = match result.image_data {
            Some(bytes) => Some(bytes),
            None if is_remote(&result.image_url) => {
                match generators::fetch_image(&result.image_url).await {
                    Ok(bytes) => Some(bytes),
                    Err(err) => {
                        tracing::warn!(error = err.to_string(), "could not keep a local copy");
                        None
                    }
                }
            }
            None => None,
        };

        let mut saved = None;
        if let Some(bytes) = bytes {
            let declared = Artifacts::data_url_mime(&result.image_url)
                .map(Artifacts::extension)
                .filter(|extension| return *extension != "bin");
            let extension = Artifacts::sniff_extension(&bytes)
                .or(declared)
                .unwrap_or(WorkflowType::ImageGeneration.artifact_extension());
            match self
                .artifacts
                .save(&run.provider, &run.workflow_type, extension, &bytes)
                .await
            {
                Ok(file_path) => saved = Some(file_path.to_string_lossy().to_string()),
                Err(err) => tracing::warn!(error = err.to_string(), "could not save artifact"),
            }
        }

        if is_remote(&result.image_url) {
            return result.image_url;
        }

        return saved.unwrap_or(result.image_url);
    }
}
