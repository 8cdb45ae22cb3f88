#[cfg(test)]
#[path = "replicate_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use super::error_message;
use super::fetch_image;
use crate::domain::models::GeneratorName;
use crate::domain::models::ImageGenerationParams;
use crate::domain::models::ImageGenerationResult;
use crate::domain::models::ImageGenerator;

pub const FLUX_SCHNELL_VERSION: &str = "black-forest-labs/flux-schnell";
pub const SDXL_VERSION: &str =
    "stability-ai/sdxl:39ed52f2a78e934b3ba6e2a89f5b1c712de7dfea535525255b1aa35c5565e08b";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PredictionInput {
    prompt: String,
    negative_prompt: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PredictionRequest {
    version: String,
    input: PredictionInput,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Prediction {
    id: String,
    status: String,
    #[serde(default)]
    output: serde_json::Value,
    error: Option<String>,
}

impl Prediction {
    fn is_running(&self) -> bool {
        return self.status == "starting" || self.status == "processing";
    }

    /// Output is either a list of URLs or a single URL depending on the model.
    fn image_url(&self) -> Option<String> {
        let url = match &self.output {
            serde_json::Value::Array(items) => items.first().and_then(|item| return item.as_str()),
            serde_json::Value::String(url) => Some(url.as_str()),
            _ => None,
        };

        return url
            .filter(|url| return !url.is_empty())
            .map(|url| return url.to_string());
    }
}

pub fn model_version(model: Option<&str>) -> &'static str {
    if model.unwrap_or_default().contains("flux-schnell") {
        return FLUX_SCHNELL_VERSION;
    }

    return SDXL_VERSION;
}

/// Predictions API. Polls until the prediction leaves `starting` or
/// `processing`, with no upper bound.
pub struct Replicate {
    url: String,
    poll_interval: Duration,
}

impl Default for Replicate {
    fn default() -> Replicate {
        return Replicate {
            url: "https://api.replicate.com".to_string(),
            poll_interval: Duration::from_secs(1),
        };
    }
}

#[async_trait]
impl ImageGenerator for Replicate {
    fn name(&self) -> GeneratorName {
        return GeneratorName::Replicate;
    }

    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        api_key: &str,
        params: &ImageGenerationParams,
    ) -> Result<ImageGenerationResult> {
        let req = PredictionRequest {
            version: model_version(params.model.as_deref()).to_string(),
            input: PredictionInput {
                prompt: params.prompt.to_string(),
                negative_prompt: params.negative_prompt.clone().unwrap_or_default(),
            },
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/predictions", url = self.url))
            .header("Authorization", format!("Token {api_key}"))
            .json(&req)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.json::<serde_json::Value>().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "Replicate prediction failed to start");
            if let Some(message) = error_message(&body, &["/detail"]) {
                bail!(message);
            }
            bail!(format!("Replicate API error: {}", status.as_u16()));
        }

        let mut prediction = res.json::<Prediction>().await?;
        while prediction.is_running() {
            tokio::time::sleep(self.poll_interval).await;

            let poll_res = reqwest::Client::new()
                .get(format!(
                    "{url}/v1/predictions/{id}",
                    url = self.url,
                    id = prediction.id
                ))
                .header("Authorization", format!("Token {api_key}"))
                .send()
                .await?;

            if !poll_res.status().is_success() {
                tracing::error!(status = poll_res.status().as_u16(), "Replicate polling failed");
                bail!(format!(
                    "Replicate polling error: {}",
                    poll_res.status().as_u16()
                ));
            }

            prediction = poll_res.json::<Prediction>().await?;
            tracing::debug!(
                id = prediction.id.as_str(),
                status = prediction.status.as_str(),
                "replicate poll"
            );
        }

        if prediction.status == "failed" {
            bail!(prediction
                .error
                .filter(|err| return !err.is_empty())
                .unwrap_or_else(|| return "Image generation failed".to_string()));
        }

        let image_url = match prediction.image_url() {
            Some(image_url) => image_url,
            None => bail!("No image URL returned from Replicate"),
        };

        let image_data = fetch_image(&image_url).await?;
        return Ok(ImageGenerationResult {
            image_url,
            image_data: Some(image_data),
        });
    }
}
