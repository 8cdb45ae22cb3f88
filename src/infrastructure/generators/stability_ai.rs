#[cfg(test)]
#[path = "stability_ai_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::multipart::Form;
use serde::Deserialize;
use serde::Serialize;

use super::error_message;
use crate::domain::models::GeneratorName;
use crate::domain::models::ImageGenerationParams;
use crate::domain::models::ImageGenerationResult;
use crate::domain::models::ImageGenerator;

pub const DEFAULT_MODEL: &str = "stable-diffusion-xl-1024-v1-0";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Artifact {
    base64: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

/// Width and height for an aspect ratio, square when unknown.
pub fn dimensions(aspect_ratio: Option<&str>) -> (u32, u32) {
    match aspect_ratio.unwrap_or("1:1") {
        "16:9" => return (1344, 768),
        "9:16" => return (768, 1344),
        "4:3" => return (1152, 896),
        _ => return (1024, 1024),
    }
}

pub struct StabilityAi {
    url: String,
}

impl Default for StabilityAi {
    fn default() -> StabilityAi {
        return StabilityAi {
            url: "https://api.stability.ai".to_string(),
        };
    }
}

#[async_trait]
impl ImageGenerator for StabilityAi {
    fn name(&self) -> GeneratorName {
        return GeneratorName::StabilityAi;
    }

    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        api_key: &str,
        params: &ImageGenerationParams,
    ) -> Result<ImageGenerationResult> {
        let model = params.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let (width, height) = dimensions(params.aspect_ratio.as_deref());

        let mut form = Form::new().text("prompt", params.prompt.to_string());
        if let Some(negative_prompt) = &params.negative_prompt {
            form = form.text("negative_prompt", negative_prompt.to_string());
        }
        form = form
            .text("width", width.to_string())
            .text("height", height.to_string())
            .text("samples", "1");

        let res = reqwest::Client::new()
            .post(format!(
                "{url}/v1/generation/{model}/text-to-image",
                url = self.url
            ))
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Accept", "application/json")
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.json::<serde_json::Value>().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), model, "Stability AI image generation failed");
            if let Some(message) = error_message(&body, &["/message"]) {
                bail!(message);
            }
            bail!(format!("Stability AI API error: {}", status.as_u16()));
        }

        let encoded = res
            .json::<GenerationResponse>()
            .await?
            .artifacts
            .into_iter()
            .find_map(|artifact| return artifact.base64);

        let encoded = match encoded {
            Some(encoded) => encoded,
            None => bail!("No image data returned from Stability AI"),
        };

        let image_data = STANDARD.decode(&encoded)?;
        return Ok(ImageGenerationResult {
            image_url: format!("data:image/png;base64,{encoded}"),
            image_data: Some(image_data),
        });
    }
}
