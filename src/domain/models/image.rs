use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use strum::EnumIter;
use strum::EnumVariantNames;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    EnumVariantNames,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
pub enum GeneratorName {
    #[strum(serialize = "openai")]
    OpenAi,
    FalAi,
    StabilityAi,
    Replicate,
    LeonardoAi,
}

/// Parameters for a single image generation. Anything the provider form
/// submits beyond the well known fields is kept in `extra`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageGenerationParams {
    pub provider: String,
    pub prompt: String,
    pub model: Option<String>,
    pub positive_prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub aspect_ratio: Option<String>,
    pub style: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn take_string(
    inputs: &mut serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<String> {
    return match inputs.remove(key) {
        Some(serde_json::Value::String(val)) if !val.trim().is_empty() => Some(val),
        Some(serde_json::Value::Number(num)) => Some(num.to_string()),
        _ => None,
    };
}

impl ImageGenerationParams {
    pub fn from_inputs(
        provider: &str,
        inputs: &serde_json::Map<String, serde_json::Value>,
    ) -> ImageGenerationParams {
        let mut rest = inputs.clone();
        let prompt = take_string(&mut rest, "prompt").unwrap_or_default();

        return ImageGenerationParams {
            provider: provider.to_string(),
            prompt,
            model: take_string(&mut rest, "model"),
            positive_prompt: take_string(&mut rest, "positivePrompt"),
            negative_prompt: take_string(&mut rest, "negativePrompt"),
            aspect_ratio: take_string(&mut rest, "aspectRatio"),
            style: take_string(&mut rest, "style"),
            extra: rest,
        };
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageGenerationResult {
    /// Remote URL, or a `data:` URL when the provider only returned bytes.
    pub image_url: String,
    pub image_data: Option<Vec<u8>>,
}

#[async_trait]
pub trait ImageGenerator {
    fn name(&self) -> GeneratorName;

    /// Runs a generation to completion, including any polling the provider
    /// requires. Errors carry the provider's own message when it sent one.
    async fn generate(
        &self,
        api_key: &str,
        params: &ImageGenerationParams,
    ) -> Result<ImageGenerationResult>;
}

pub type ImageGeneratorBox = Box<dyn ImageGenerator + Send + Sync>;
