#[cfg(test)]
#[path = "fal_ai_test.rs"]
mod tests;

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

pub const DEFAULT_MODEL: &str = "fal-ai/flux-pro";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerationRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_prompt: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    images: Vec<GeneratedImage>,
    image: Option<GeneratedImage>,
}

impl GenerationResponse {
    fn image_url(self) -> Option<String> {
        if let Some(url) = self.images.into_iter().find_map(|image| return image.url) {
            return Some(url);
        }

        return self.image.and_then(|image| return image.url);
    }
}

/// Flux models served by fal.run.
pub struct FalAi {
    url: String,
}

impl Default for FalAi {
    fn default() -> FalAi {
        return FalAi {
            url: "https://fal.run".to_string(),
        };
    }
}

fn full_prompt(params: &ImageGenerationParams) -> String {
    if let Some(positive_prompt) = &params.positive_prompt {
        return format!("{} {positive_prompt}", params.prompt)
            .trim()
            .to_string();
    }

    return params.prompt.to_string();
}

#[async_trait]
impl ImageGenerator for FalAi {
    fn name(&self) -> GeneratorName {
        return GeneratorName::FalAi;
    }

    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        api_key: &str,
        params: &ImageGenerationParams,
    ) -> Result<ImageGenerationResult> {
        let model = params.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let req = GenerationRequest {
            prompt: full_prompt(params),
            negative_prompt: params.negative_prompt.clone(),
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/{model}", url = self.url))
            .header("Authorization", format!("Key {api_key}"))
            .json(&req)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.json::<serde_json::Value>().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), model, "Fal.ai image generation failed");
            if let Some(message) = error_message(&body, &["/error", "/detail"]) {
                bail!(message);
            }
            bail!(format!("Fal.ai API error: {}", status.as_u16()));
        }

        let image_url = match res.json::<GenerationResponse>().await?.image_url() {
            Some(image_url) => image_url,
            None => bail!("No image URL returned from Fal.ai"),
        };

        let image_data = fetch_image(&image_url).await?;
        return Ok(ImageGenerationResult {
            image_url,
            image_data: Some(image_data),
        });
    }
}
