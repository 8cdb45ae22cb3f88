#[cfg(test)]
#[path = "openai_test.rs"]
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

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerationRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
    quality: String,
    response_format: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GeneratedImage {
    url: Option<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

/// DALL-E 3 through the images API.
pub struct OpenAi {
    url: String,
}

impl Default for OpenAi {
    fn default() -> OpenAi {
        return OpenAi {
            url: "https://api.openai.com".to_string(),
        };
    }
}

#[async_trait]
impl ImageGenerator for OpenAi {
    fn name(&self) -> GeneratorName {
        return GeneratorName::OpenAi;
    }

    #[allow(clippy::implicit_return)]
    async fn generate(
        &self,
        api_key: &str,
        params: &ImageGenerationParams,
    ) -> Result<ImageGenerationResult> {
        let req = GenerationRequest {
            model: "dall-e-3".to_string(),
            prompt: params.prompt.to_string(),
            n: 1,
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            response_format: "url".to_string(),
        };

        let res = reqwest::Client::new()
            .post(format!("{url}/v1/images/generations", url = self.url))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&req)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.json::<serde_json::Value>().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), "OpenAI image generation failed");
            if let Some(message) = error_message(&body, &["/error/message"]) {
                bail!(message);
            }
            bail!(format!("OpenAI API error: {}", status.as_u16()));
        }

        let image_url = res
            .json::<GenerationResponse>()
            .await?
            .data
            .into_iter()
            .find_map(|image| return image.url);

        let image_url = match image_url {
            Some(image_url) => image_url,
            None => bail!("No image URL returned from OpenAI"),
        };

        let image_data = fetch_image(&image_url).await?;
        return Ok(ImageGenerationResult {
            image_url,
            image_data: Some(image_data),
        });
    }
}
