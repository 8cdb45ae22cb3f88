pub mod fal_ai;
pub mod leonardo_ai;
pub mod openai;
pub mod replicate;
pub mod stability_ai;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::GeneratorName;
use crate::domain::models::ImageGeneratorBox;

pub struct GeneratorManager {}

impl GeneratorManager {
    pub fn get(provider: &str) -> Result<ImageGeneratorBox> {
        let name = match provider.parse::<GeneratorName>() {
            Ok(name) => name,
            Err(_) => bail!(format!(
                "Image generation not supported for provider: {provider}"
            )),
        };

        match name {
            GeneratorName::OpenAi => return Ok(Box::<openai::OpenAi>::default()),
            GeneratorName::FalAi => return Ok(Box::<fal_ai::FalAi>::default()),
            GeneratorName::StabilityAi => return Ok(Box::<stability_ai::StabilityAi>::default()),
            GeneratorName::Replicate => return Ok(Box::<replicate::Replicate>::default()),
            GeneratorName::LeonardoAi => return Ok(Box::<leonardo_ai::LeonardoAi>::default()),
        }
    }

    pub fn supports(provider: &str) -> bool {
        return provider.parse::<GeneratorName>().is_ok();
    }
}

/// Downloads the finished image so it can be kept as a local artifact.
pub async fn fetch_image(url: &str) -> Result<Vec<u8>> {
    let res = reqwest::Client::new().get(url).send().await?;
    if !res.status().is_success() {
        tracing::error!(status = res.status().as_u16(), "Failed to download generated image");
        bail!(format!("Failed to download generated image: {}", res.status()));
    }

    return Ok(res.bytes().await?.to_vec());
}

/// First string found at any of the JSON pointers, used to lift provider
/// error messages out of failed responses.
pub fn error_message(body: &serde_json::Value, pointers: &[&str]) -> Option<String> {
    return pointers
        .iter()
        .filter_map(|pointer| return body.pointer(pointer))
        .filter_map(|val| return val.as_str())
        .find(|val| return !val.is_empty())
        .map(|val| return val.to_string());
}
