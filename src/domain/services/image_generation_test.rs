use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use tempdir::TempDir;
use test_utils::png_fixture;

use super::GeneratorFactory;
use super::ImageGenerationService;
use crate::domain::models::Actor;
use crate::domain::models::ApiKey;
use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::ChatMessage;
use crate::domain::models::CustomProviderMetadata;
use crate::domain::models::GeneratorName;
use crate::domain::models::Identity;
use crate::domain::models::ImageGenerationParams;
use crate::domain::models::ImageGenerationResult;
use crate::domain::models::ImageGenerator;
use crate::domain::models::ImageGeneratorBox;
use crate::domain::models::ProviderInfo;
use crate::domain::models::UserProfile;
use crate::domain::models::UserRole;
use crate::domain::models::WorkflowRun;
use crate::domain::models::WorkflowStatus;
use crate::domain::models::WorkflowType;
use crate::domain::services::Artifacts;
use crate::domain::services::QueryCache;
use crate::infrastructure::backends::memory::MemoryBackend;
use crate::infrastructure::backends::memory::MemoryStore;
use crate::infrastructure::backends::memory::CANCELLED_MESSAGE;

#[derive(Clone)]
enum Outcome {
    Remote,
    Bytes,
    Fail(&'static str),
}

#[derive(Clone)]
struct FakeGenerator {
    outcome: Outcome,
    delay: Duration,
}

#[async_trait]
impl ImageGenerator for FakeGenerator {
    fn name(&self) -> GeneratorName {
        return GeneratorName::FalAi;
    }

    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        api_key: &str,
        params: &ImageGenerationParams,
    ) -> Result<ImageGenerationResult> {
        assert_eq!(api_key, "fal-key-1234567");
        tokio::time::sleep(self.delay).await;

        match self.outcome {
            Outcome::Remote => {
                return Ok(ImageGenerationResult {
                    image_url: format!("https://cdn.example.com/{}.png", params.prompt.replace(' ', "-")),
                    image_data: Some(png_fixture().to_vec()),
                });
            }
            Outcome::Bytes => {
                return Ok(ImageGenerationResult {
                    image_url: "data:image/png;base64,AAAA".to_string(),
                    image_data: Some(png_fixture().to_vec()),
                });
            }
            Outcome::Fail(message) => bail!(message),
        }
    }
}

struct Harness {
    actor: Actor,
    service: ImageGenerationService,
    tmp_dir: TempDir,
}

fn alice() -> MemoryBackend {
    return MemoryBackend::with_store(Arc::new(MemoryStore::default()), &Identity::new("alice"));
}

fn generators_for<G: ImageGenerator + Clone + Send + Sync + 'static>(
    generator: G,
) -> GeneratorFactory {
    return Arc::new(move |_provider: &str| {
        let boxed: ImageGeneratorBox = Box::new(generator.clone());
        return Ok(boxed);
    });
}

async fn harness(outcome: Outcome, delay: Duration, with_key: bool) -> Result<Harness> {
    let actor: Actor = Arc::new(alice());
    if with_key {
        actor.add_or_update_api_key("fal-ai", "fal-key-1234567").await?;
    }

    return harness_with(actor, generators_for(FakeGenerator { outcome, delay }));
}

fn harness_with(actor: Actor, generators: GeneratorFactory) -> Result<Harness> {
    let tmp_dir = TempDir::new("empire-generation")?;
    let service = ImageGenerationService::new(actor.clone(), Arc::new(QueryCache::default()))
        .with_generators(generators)
        .with_artifacts(Artifacts::new(tmp_dir.path().to_path_buf()));

    return Ok(Harness {
        actor,
        service,
        tmp_dir,
    });
}

fn inputs(prompt: &str) -> serde_json::Map<String, serde_json::Value> {
    let mut inputs = serde_json::Map::new();
    inputs.insert("prompt".to_string(), serde_json::json!(prompt));
    return inputs;
}

async fn pending_run(harness: &Harness, prompt: &str) -> Result<WorkflowRun> {
    let run = harness
        .service
        .workflows()
        .execute("fal-ai", WorkflowType::ImageGeneration, &inputs(prompt))
        .await?;
    assert_eq!(run.status, WorkflowStatus::Pending);
    return Ok(run);
}

fn saved_files(harness: &Harness) -> Result<usize> {
    return Ok(std::fs::read_dir(harness.tmp_dir.path())?.count());
}

#[tokio::test]
async fn it_generates_a_red_fox() -> Result<()> {
    let harness = harness(Outcome::Remote, Duration::ZERO, true).await?;
    let run = pending_run(&harness, "a red fox").await?;

    let done = harness
        .service
        .generate_for_run(&run, &inputs("a red fox"))
        .await?;

    assert_eq!(done.status, WorkflowStatus::Success);
    assert_eq!(
        done.output_blob_id,
        Some("https://cdn.example.com/a-red-fox.png".to_string())
    );
    assert!(done.duration_nanos.is_some());
    assert_eq!(saved_files(&harness)?, 1);
    return Ok(());
}

#[tokio::test]
async fn it_points_at_the_saved_artifact_without_a_remote_url() -> Result<()> {
    let harness = harness(Outcome::Bytes, Duration::ZERO, true).await?;
    let done = harness
        .service
        .generate("fal-ai", &inputs("a red fox"))
        .await?;

    let output = done.output_blob_id.unwrap();
    assert!(output.starts_with(&harness.tmp_dir.path().to_string_lossy().to_string()));
    assert!(output.ends_with(".png"));
    assert_eq!(std::fs::read(&output)?, png_fixture());
    return Ok(());
}

#[tokio::test]
async fn it_marks_provider_failures() -> Result<()> {
    let harness = harness(Outcome::Fail("Insufficient credits"), Duration::ZERO, true).await?;
    let run = pending_run(&harness, "a red fox").await?;

    let res = harness
        .service
        .generate_for_run(&run, &inputs("a red fox"))
        .await;
    assert_eq!(res.unwrap_err().to_string(), "Insufficient credits");

    let runs = harness.actor.get_workflow_runs("fal-ai").await?;
    assert_eq!(
        runs[0].status,
        WorkflowStatus::Failed("Insufficient credits".to_string())
    );
    assert_eq!(runs[0].output_blob_id, None);
    assert_eq!(runs[0].duration_nanos, None);
    return Ok(());
}

#[tokio::test]
async fn it_falls_back_to_a_default_failure_message() -> Result<()> {
    let harness = harness(Outcome::Fail(""), Duration::ZERO, true).await?;
    let run = pending_run(&harness, "a red fox").await?;

    let res = harness
        .service
        .generate_for_run(&run, &inputs("a red fox"))
        .await;
    assert_eq!(res.unwrap_err().to_string(), "Image generation failed");
    return Ok(());
}

#[tokio::test]
async fn it_fails_runs_without_a_key() -> Result<()> {
    let harness = harness(Outcome::Remote, Duration::ZERO, false).await?;
    let run = pending_run(&harness, "a red fox").await?;

    let res = harness
        .service
        .generate_for_run(&run, &inputs("a red fox"))
        .await;

    let message = "No API key found for fal-ai. Please add your API key in the Key Vault.";
    assert_eq!(res.unwrap_err().to_string(), message);

    let runs = harness.actor.get_workflow_runs("fal-ai").await?;
    assert_eq!(runs[0].status, WorkflowStatus::Failed(message.to_string()));
    return Ok(());
}

#[tokio::test]
async fn it_fails_runs_without_a_prompt() -> Result<()> {
    let harness = harness(Outcome::Remote, Duration::ZERO, true).await?;
    let run = pending_run(&harness, "   ").await?;

    let res = harness.service.generate_for_run(&run, &inputs("   ")).await;
    assert_eq!(
        res.unwrap_err().to_string(),
        "Prompt is required for image generation"
    );
    assert_eq!(saved_files(&harness)?, 0);
    return Ok(());
}

#[tokio::test]
async fn it_drops_results_for_runs_cancelled_mid_flight() -> Result<()> {
    let harness = harness(Outcome::Remote, Duration::from_millis(100), true).await?;
    let run = pending_run(&harness, "a red fox").await?;

    let prompt = inputs("a red fox");
    let (res, cancelled) = tokio::join!(
        harness.service.generate_for_run(&run, &prompt),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            return harness.actor.cancel_workflow_run(&run.id).await;
        }
    );
    cancelled?;

    let done = res?;
    assert_eq!(
        done.status,
        WorkflowStatus::Failed(CANCELLED_MESSAGE.to_string())
    );
    assert_eq!(done.output_blob_id, None);
    assert_eq!(saved_files(&harness)?, 0);
    return Ok(());
}

#[tokio::test]
async fn it_leaves_runs_cancelled_before_start_alone() -> Result<()> {
    let harness = harness(Outcome::Remote, Duration::ZERO, true).await?;
    let run = pending_run(&harness, "a red fox").await?;
    harness.actor.cancel_workflow_run(&run.id).await?;

    let done = harness
        .service
        .generate_for_run(&run, &inputs("a red fox"))
        .await?;

    assert_eq!(
        done.status,
        WorkflowStatus::Failed(CANCELLED_MESSAGE.to_string())
    );
    return Ok(());
}

/// Reads the run back from the backend while the provider is working.
#[derive(Clone)]
struct ObservingGenerator {
    actor: Actor,
    seen: Arc<Mutex<Vec<WorkflowRun>>>,
}

#[async_trait]
impl ImageGenerator for ObservingGenerator {
    fn name(&self) -> GeneratorName {
        return GeneratorName::FalAi;
    }

    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        _api_key: &str,
        _params: &ImageGenerationParams,
    ) -> Result<ImageGenerationResult> {
        let runs = self.actor.get_workflow_runs("fal-ai").await?;
        self.seen.lock().unwrap().extend(runs);

        return Ok(ImageGenerationResult {
            image_url: "https://cdn.example.com/fox.png".to_string(),
            image_data: Some(png_fixture().to_vec()),
        });
    }
}

#[tokio::test]
async fn it_marks_runs_running_before_any_output() -> Result<()> {
    let actor: Actor = Arc::new(alice());
    actor.add_or_update_api_key("fal-ai", "fal-key-1234567").await?;

    let seen = Arc::new(Mutex::new(vec![]));
    let generator = ObservingGenerator {
        actor: actor.clone(),
        seen: seen.clone(),
    };
    let harness = harness_with(actor, generators_for(generator))?;
    let run = pending_run(&harness, "a red fox").await?;

    let done = harness
        .service
        .generate_for_run(&run, &inputs("a red fox"))
        .await?;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].id, run.id);
    assert_eq!(seen[0].status, WorkflowStatus::Running);
    assert_eq!(seen[0].output_blob_id, None);
    assert_eq!(done.status, WorkflowStatus::Success);
    return Ok(());
}

/// Memory backend that cancels every active run right after answering the
/// `cancel_on`-th run listing, as if another client cancelled in between.
struct CancellingBackend {
    inner: MemoryBackend,
    listings: AtomicUsize,
    cancel_on: usize,
}

#[async_trait]
impl Backend for CancellingBackend {
    fn name(&self) -> BackendName {
        return BackendName::Memory;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return self.inner.health_check().await;
    }

    #[allow(clippy::implicit_return)]
    async fn initialize_access_control_with_secret(&self, token: &str) -> Result<()> {
        return self.inner.initialize_access_control_with_secret(token).await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_current_user(&self) -> Result<String> {
        return self.inner.get_current_user().await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_caller_user_role(&self) -> Result<UserRole> {
        return self.inner.get_caller_user_role().await;
    }

    #[allow(clippy::implicit_return)]
    async fn is_caller_admin(&self) -> Result<bool> {
        return self.inner.is_caller_admin().await;
    }

    #[allow(clippy::implicit_return)]
    async fn assign_caller_user_role(&self, user: &str, role: UserRole) -> Result<()> {
        return self.inner.assign_caller_user_role(user, role).await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_caller_user_profile(&self) -> Result<Option<UserProfile>> {
        return self.inner.get_caller_user_profile().await;
    }

    #[allow(clippy::implicit_return)]
    async fn add_or_update_api_key(&self, provider: &str, key: &str) -> Result<()> {
        return self.inner.add_or_update_api_key(provider, key).await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_provider_key(&self, provider: &str) -> Result<Option<ApiKey>> {
        return self.inner.get_provider_key(provider).await;
    }

    #[allow(clippy::implicit_return)]
    async fn provider_key_exists(&self, provider: &str) -> Result<bool> {
        return self.inner.provider_key_exists(provider).await;
    }

    #[allow(clippy::implicit_return)]
    async fn add_chat_message(&self, provider: &str, content: &str) -> Result<()> {
        return self.inner.add_chat_message(provider, content).await;
    }

    #[allow(clippy::implicit_return)]
    async fn stream_chat_messages(&self, provider: &str, limit: u64) -> Result<Vec<ChatMessage>> {
        return self.inner.stream_chat_messages(provider, limit).await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_all_providers(&self) -> Result<Vec<ProviderInfo>> {
        return self.inner.get_all_providers().await;
    }

    #[allow(clippy::implicit_return)]
    async fn initialize_providers(&self, providers: Vec<ProviderInfo>) -> Result<()> {
        return self.inner.initialize_providers(providers).await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_custom_provider_metadata(
        &self,
        provider_key: &str,
    ) -> Result<Option<CustomProviderMetadata>> {
        return self.inner.get_custom_provider_metadata(provider_key).await;
    }

    #[allow(clippy::implicit_return)]
    async fn set_custom_provider_metadata(
        &self,
        provider_key: &str,
        display_name: &str,
    ) -> Result<()> {
        return self
            .inner
            .set_custom_provider_metadata(provider_key, display_name)
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
            .inner
            .execute_workflow(provider, workflow_type, inputs_json)
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
            .inner
            .update_workflow_run(run_id, status, output_blob_id, duration_nanos)
            .await;
    }

    #[allow(clippy::implicit_return)]
    async fn get_workflow_runs(&self, provider: &str) -> Result<Vec<WorkflowRun>> {
        let runs = self.inner.get_workflow_runs(provider).await?;
        if self.listings.fetch_add(1, Ordering::SeqCst) + 1 == self.cancel_on {
            for run in runs.iter().filter(|run| return run.status.is_active()) {
                self.inner.cancel_workflow_run(&run.id).await?;
            }
        }

        return Ok(runs);
    }

    #[allow(clippy::implicit_return)]
    async fn cancel_workflow_run(&self, run_id: &str) -> Result<()> {
        return self.inner.cancel_workflow_run(run_id).await;
    }

    #[allow(clippy::implicit_return)]
    async fn cancel_pending_workflow_runs_for_provider(&self, provider: &str) -> Result<()> {
        return self
            .inner
            .cancel_pending_workflow_runs_for_provider(provider)
            .await;
    }
}

async fn cancelling_harness(outcome: Outcome, cancel_on: usize) -> Result<Harness> {
    let actor: Actor = Arc::new(CancellingBackend {
        inner: alice(),
        listings: AtomicUsize::new(0),
        cancel_on,
    });
    actor.add_or_update_api_key("fal-ai", "fal-key-1234567").await?;

    return harness_with(actor, generators_for(FakeGenerator { outcome, delay: Duration::ZERO }));
}

#[tokio::test]
async fn it_keeps_a_cancellation_that_lands_after_the_last_check() -> Result<()> {
    // The second listing is the check right after generation.
    let harness = cancelling_harness(Outcome::Remote, 2).await?;
    let run = pending_run(&harness, "a red fox").await?;

    let done = harness
        .service
        .generate_for_run(&run, &inputs("a red fox"))
        .await?;

    let cancelled = WorkflowStatus::Failed(CANCELLED_MESSAGE.to_string());
    assert_eq!(done.status, cancelled);
    assert_eq!(done.output_blob_id, None);

    let runs = harness.actor.get_workflow_runs("fal-ai").await?;
    assert_eq!(runs[0].status, cancelled);
    assert_eq!(runs[0].output_blob_id, None);
    return Ok(());
}

#[tokio::test]
async fn it_keeps_a_cancellation_over_a_provider_failure() -> Result<()> {
    let harness = cancelling_harness(Outcome::Fail("Insufficient credits"), 2).await?;
    let run = pending_run(&harness, "a red fox").await?;

    let done = harness
        .service
        .generate_for_run(&run, &inputs("a red fox"))
        .await?;

    assert_eq!(
        done.status,
        WorkflowStatus::Failed(CANCELLED_MESSAGE.to_string())
    );
    return Ok(());
}
