#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;

use once_cell::sync::Lazy;

use crate::domain::models::FieldType;
use crate::domain::models::OptionField;
use crate::domain::models::ProviderConfig;
use crate::domain::models::ProviderInfo;
use crate::domain::models::WorkflowType;

struct Entry {
    id: &'static str,
    display_name: &'static str,
    description: &'static str,
    capabilities: &'static [&'static str],
    workflow_type: Option<WorkflowType>,
    option_fields: Vec<OptionField>,
    recommended_prompts: &'static [&'static str],
}

impl Entry {
    fn into_config(self) -> ProviderConfig {
        return ProviderConfig {
            id: self.id,
            name: self.id,
            display_name: self.display_name,
            description: self.description,
            capabilities: self.capabilities.to_vec(),
            route: format!("/providers/{}", self.id),
            is_custom_slot: false,
            credential_label: None,
            credential_placeholder: None,
            workflow_type: self.workflow_type,
            option_fields: self.option_fields,
            recommended_prompts: self.recommended_prompts.to_vec(),
        };
    }
}

fn prompt_field(label: &'static str, placeholder: &'static str) -> OptionField {
    return OptionField::new("prompt", label, FieldType::Textarea).placeholder(placeholder);
}

fn custom_slot(id: &'static str, display_name: &'static str) -> ProviderConfig {
    let mut config = Entry {
        id,
        display_name,
        description: "Configure your own custom provider integration",
        capabilities: &["Custom Integration", "Flexible Configuration"],
        workflow_type: Some(WorkflowType::Custom),
        option_fields: vec![],
        recommended_prompts: &["Execute custom workflow", "Run specialized task"],
    }
    .into_config();
    config.is_custom_slot = true;

    return config;
}

#[rustfmt::skip]
static PROVIDERS: Lazy<Vec<ProviderConfig>> = Lazy::new(|| {
    let mut shop_url = Entry {
        id: "shopify-shop-url",
        display_name: "Shopify Shop URL",
        description: "Configure your Shopify store URL",
        capabilities: &["Store Configuration", "URL Management"],
        workflow_type: Some(WorkflowType::Integration),
        option_fields: vec![],
        recommended_prompts: &[],
    }
    .into_config();
    shop_url.credential_label = Some("Shop URL");
    shop_url.credential_placeholder = Some("https://your-store.myshopify.com");

    return vec![
        Entry {
            id: "openai",
            display_name: "OpenAI",
            description: "GPT-4, DALL-E 3, and advanced language models",
            capabilities: &["Chat", "Image Generation", "Text Analysis"],
            workflow_type: Some(WorkflowType::Chat),
            option_fields: vec![
                OptionField::new("model", "Model", FieldType::Select)
                    .options(&["gpt-4", "gpt-4-turbo", "gpt-3.5-turbo"])
                    .default_text("gpt-4"),
                OptionField::new("temperature", "Temperature", FieldType::Number).default_number(0.7),
            ],
            recommended_prompts: &[
                "Explain quantum computing in simple terms",
                "Write a Python function to sort a list of dictionaries by a specific key",
                "Create a marketing email for a new product launch",
                "Summarize the key points of machine learning",
            ],
        }
        .into_config(),
        Entry {
            id: "replicate",
            display_name: "Replicate",
            description: "Run open-source ML models in the cloud",
            capabilities: &["Image Generation", "Video Generation", "Model Polling"],
            workflow_type: Some(WorkflowType::ImageGeneration),
            option_fields: vec![
                OptionField::new("model", "Model", FieldType::Select)
                    .options(&["stability-ai/sdxl", "black-forest-labs/flux-schnell"])
                    .default_text("stability-ai/sdxl"),
                prompt_field("Prompt", "Describe what you want to generate..."),
            ],
            recommended_prompts: &[
                "A futuristic cityscape at sunset with flying cars",
                "Portrait of a cyberpunk character with neon lights",
                "Abstract art with vibrant colors and geometric shapes",
            ],
        }
        .into_config(),
        Entry {
            id: "runpod",
            display_name: "RunPod",
            description: "Custom GPU endpoints and serverless inference",
            capabilities: &["Custom Endpoints", "GPU Compute"],
            workflow_type: Some(WorkflowType::Custom),
            option_fields: vec![
                OptionField::new("endpoint", "Endpoint URL", FieldType::Text)
                    .placeholder("https://api.runpod.ai/v2/..."),
                OptionField::new("input", "Input JSON", FieldType::Textarea)
                    .placeholder("{\"prompt\": \"...\"}"),
            ],
            recommended_prompts: &[
                "Run inference on custom trained model",
                "Execute batch processing job",
            ],
        }
        .into_config(),
        Entry {
            id: "gemini",
            display_name: "Gemini",
            description: "Google's multimodal AI models for text and vision",
            capabilities: &["Chat", "Vision", "Multimodal Understanding"],
            workflow_type: Some(WorkflowType::Chat),
            option_fields: vec![
                OptionField::new("model", "Model", FieldType::Select)
                    .options(&["gemini-pro", "gemini-pro-vision"])
                    .default_text("gemini-pro"),
            ],
            recommended_prompts: &[
                "Analyze this image and describe what you see",
                "Compare and contrast two different approaches to solving this problem",
                "Generate a creative story about space exploration",
            ],
        }
        .into_config(),
        Entry {
            id: "ltx",
            display_name: "LTX",
            description: "Video generation and transformation models",
            capabilities: &["Text-to-Video", "Video Enhancement"],
            workflow_type: Some(WorkflowType::VideoGeneration),
            option_fields: vec![
                prompt_field("Video Prompt", "Describe the video you want to create..."),
                OptionField::new("duration", "Duration (seconds)", FieldType::Number).default_number(5.0),
                OptionField::new("aspectRatio", "Aspect Ratio", FieldType::Select)
                    .options(&["16:9", "9:16", "1:1"])
                    .default_text("16:9"),
            ],
            recommended_prompts: &[
                "A serene ocean wave crashing on a beach at golden hour",
                "Time-lapse of a flower blooming in a garden",
                "Drone footage flying through a mountain valley",
                "Abstract particles forming into a logo",
            ],
        }
        .into_config(),
        Entry {
            id: "runway",
            display_name: "Runway",
            description: "Advanced video generation and editing tools",
            capabilities: &["Video Generation", "Video Editing", "Motion Tracking"],
            workflow_type: Some(WorkflowType::VideoGeneration),
            option_fields: vec![
                prompt_field("Video Prompt", "Describe the video scene..."),
                OptionField::new("duration", "Duration (seconds)", FieldType::Number).default_number(4.0),
                OptionField::new("style", "Style", FieldType::Select)
                    .options(&["Cinematic", "Realistic", "Animated", "Abstract"])
                    .default_text("Cinematic"),
            ],
            recommended_prompts: &[
                "A person walking through a neon-lit cyberpunk street",
                "Camera slowly zooming into a mysterious forest",
                "Product showcase with smooth camera movements",
            ],
        }
        .into_config(),
        Entry {
            id: "pika",
            display_name: "Pika",
            description: "AI-powered video creation and animation",
            capabilities: &["Text-to-Video", "Image-to-Video", "Video Effects"],
            workflow_type: Some(WorkflowType::VideoGeneration),
            option_fields: vec![
                prompt_field("Video Prompt", "Describe your video..."),
                OptionField::new("duration", "Duration (seconds)", FieldType::Number).default_number(3.0),
                OptionField::new("motion", "Motion Intensity", FieldType::Select)
                    .options(&["Low", "Medium", "High"])
                    .default_text("Medium"),
            ],
            recommended_prompts: &[
                "A cat playing with a ball of yarn in slow motion",
                "Fireworks exploding over a city skyline",
                "Waterfall cascading down mossy rocks",
            ],
        }
        .into_config(),
        Entry {
            id: "luma",
            display_name: "Luma",
            description: "3D capture and video generation technology",
            capabilities: &["3D Capture", "Video Generation", "Scene Reconstruction"],
            workflow_type: Some(WorkflowType::VideoGeneration),
            option_fields: vec![
                prompt_field("Scene Prompt", "Describe the 3D scene..."),
                OptionField::new("cameraMovement", "Camera Movement", FieldType::Select)
                    .options(&["Static", "Orbit", "Fly-through", "Dolly"])
                    .default_text("Orbit"),
            ],
            recommended_prompts: &[
                "A 3D model of a futuristic car rotating on a platform",
                "Camera orbiting around a detailed architectural structure",
                "Fly-through of a virtual museum gallery",
            ],
        }
        .into_config(),
        Entry {
            id: "kling",
            display_name: "Kling",
            description: "High-quality video generation from text and images",
            capabilities: &["Text-to-Video", "Image-to-Video", "Long-form Video"],
            workflow_type: Some(WorkflowType::VideoGeneration),
            option_fields: vec![
                prompt_field("Video Prompt", "Describe your video in detail..."),
                OptionField::new("duration", "Duration (seconds)", FieldType::Number).default_number(5.0),
                OptionField::new("quality", "Quality", FieldType::Select)
                    .options(&["Standard", "High", "Ultra"])
                    .default_text("High"),
            ],
            recommended_prompts: &[
                "A majestic eagle soaring over snow-capped mountains",
                "Time-lapse of clouds moving across a blue sky",
                "A chef preparing a gourmet dish in a professional kitchen",
            ],
        }
        .into_config(),
        Entry {
            id: "hailuo",
            display_name: "Hailuo",
            description: "AI video generation and creative tools",
            capabilities: &["Video Generation", "Creative Effects", "Style Transfer"],
            workflow_type: Some(WorkflowType::VideoGeneration),
            option_fields: vec![
                prompt_field("Video Prompt", "Describe the video..."),
                OptionField::new("style", "Visual Style", FieldType::Select)
                    .options(&["Realistic", "Artistic", "Anime", "Sketch"])
                    .default_text("Realistic"),
            ],
            recommended_prompts: &[
                "A magical forest with glowing mushrooms and fireflies",
                "Urban street scene in the rain with reflections",
                "Underwater scene with colorful coral and fish",
            ],
        }
        .into_config(),
        Entry {
            id: "stability-ai",
            display_name: "Stability AI",
            description: "Stable Diffusion and image generation models",
            capabilities: &["Image Generation", "Image Editing", "Upscaling"],
            workflow_type: Some(WorkflowType::ImageGeneration),
            option_fields: vec![
                OptionField::new("model", "Model", FieldType::Select)
                    .options(&["stable-diffusion-xl-1024-v1-0", "stable-diffusion-v1-6"])
                    .default_text("stable-diffusion-xl-1024-v1-0"),
                prompt_field("Image Prompt", "Describe the image..."),
                OptionField::new("negativePrompt", "Negative Prompt", FieldType::Textarea)
                    .placeholder("What to avoid..."),
                OptionField::new("aspectRatio", "Aspect Ratio", FieldType::Select)
                    .options(&["1:1", "16:9", "9:16", "4:3"])
                    .default_text("1:1"),
            ],
            recommended_prompts: &[
                "A photorealistic portrait of a person in natural lighting",
                "Fantasy landscape with castles and dragons",
                "Product photography of a luxury watch on marble surface",
                "Minimalist logo design with geometric shapes",
            ],
        }
        .into_config(),
        Entry {
            id: "fal-ai",
            display_name: "Fal.ai",
            description: "Fast AI model inference and deployment",
            capabilities: &["Fast Inference", "Model Deployment", "API Access"],
            workflow_type: Some(WorkflowType::ImageGeneration),
            option_fields: vec![
                OptionField::new("model", "Model", FieldType::Select)
                    .options(&["fal-ai/flux-pro", "fal-ai/flux-dev", "fal-ai/flux-schnell"])
                    .default_text("fal-ai/flux-pro"),
                prompt_field("Prompt", "Your main prompt..."),
                OptionField::new("positivePrompt", "Positive prompt", FieldType::Textarea)
                    .placeholder("Elements to emphasize..."),
                OptionField::new("negativePrompt", "Negative prompt", FieldType::Textarea)
                    .placeholder("Elements to avoid..."),
            ],
            recommended_prompts: &[
                "High-resolution architectural rendering of a modern building",
                "Character concept art for a video game",
                "Photorealistic product shot with studio lighting",
                "Abstract digital art with vibrant colors",
            ],
        }
        .into_config(),
        Entry {
            id: "modelscope",
            display_name: "ModelScope",
            description: "Open-source AI models and tools",
            capabilities: &["Model Library", "Text-to-Video", "Multi-task Models"],
            workflow_type: Some(WorkflowType::VideoGeneration),
            option_fields: vec![
                OptionField::new("task", "Task", FieldType::Select)
                    .options(&["Text-to-Video", "Image-to-Video", "Video Enhancement"])
                    .default_text("Text-to-Video"),
                prompt_field("Prompt", "Describe what you want..."),
            ],
            recommended_prompts: &[
                "A robot walking through a futuristic city",
                "Nature documentary style footage of wildlife",
            ],
        }
        .into_config(),
        Entry {
            id: "leonardo-ai",
            display_name: "Leonardo AI",
            description: "AI-powered creative content generation",
            capabilities: &["Image Generation", "Asset Creation", "Style Control"],
            workflow_type: Some(WorkflowType::ImageGeneration),
            option_fields: vec![
                OptionField::new("model", "Model", FieldType::Select)
                    .options(&["Leonardo Diffusion XL", "Leonardo Vision XL", "Leonardo Anime XL"])
                    .default_text("Leonardo Diffusion XL"),
                prompt_field("Image Prompt", "Describe your image..."),
                OptionField::new("style", "Style Preset", FieldType::Select)
                    .options(&["Leonardo Style", "Anime", "Photorealistic", "Digital Art"])
                    .default_text("Leonardo Style"),
            ],
            recommended_prompts: &[
                "Fantasy character design with detailed armor",
                "Isometric game asset of a medieval village",
                "Concept art for a sci-fi spaceship interior",
            ],
        }
        .into_config(),
        Entry {
            id: "synthesia",
            display_name: "Synthesia",
            description: "AI video generation with virtual avatars",
            capabilities: &["Avatar Videos", "Text-to-Speech", "Multilingual"],
            workflow_type: Some(WorkflowType::VideoGeneration),
            option_fields: vec![
                OptionField::new("script", "Video Script", FieldType::Textarea)
                    .placeholder("Enter the script for your avatar to speak..."),
                OptionField::new("avatar", "Avatar", FieldType::Select)
                    .options(&["Professional Male", "Professional Female", "Casual Male", "Casual Female"])
                    .default_text("Professional Female"),
                OptionField::new("language", "Language", FieldType::Select)
                    .options(&["English", "Spanish", "French", "German", "Chinese"])
                    .default_text("English"),
            ],
            recommended_prompts: &[
                "Welcome message for new employees joining the company",
                "Product demonstration explaining key features",
                "Educational content about climate change",
                "Marketing pitch for a new software product",
            ],
        }
        .into_config(),
        Entry {
            id: "slack",
            display_name: "Slack",
            description: "Team communication and workflow automation",
            capabilities: &["Messaging", "Notifications", "Webhooks"],
            workflow_type: Some(WorkflowType::Integration),
            option_fields: vec![
                OptionField::new("channel", "Channel", FieldType::Text).placeholder("#general"),
                OptionField::new("message", "Message", FieldType::Textarea).placeholder("Your message..."),
            ],
            recommended_prompts: &[
                "Send a daily standup reminder to the team",
                "Post a deployment notification to the dev channel",
                "Share weekly metrics summary with stakeholders",
            ],
        }
        .into_config(),
        Entry {
            id: "tiktok",
            display_name: "TikTok",
            description: "Social media integration and content publishing",
            capabilities: &["Content Publishing", "Analytics", "API Integration"],
            workflow_type: Some(WorkflowType::Integration),
            option_fields: vec![
                OptionField::new("caption", "Caption", FieldType::Textarea)
                    .placeholder("Video caption with hashtags..."),
                OptionField::new("privacy", "Privacy", FieldType::Select)
                    .options(&["Public", "Friends", "Private"])
                    .default_text("Public"),
            ],
            recommended_prompts: &[
                "Post a product showcase video with trending hashtags",
                "Share behind-the-scenes content from our studio",
            ],
        }
        .into_config(),
        Entry {
            id: "shopify",
            display_name: "Shopify",
            description: "E-commerce platform integration",
            capabilities: &["Store Management", "Product Sync", "Order Processing"],
            workflow_type: Some(WorkflowType::Integration),
            option_fields: vec![
                OptionField::new("action", "Action", FieldType::Select)
                    .options(&["Add Product", "Update Inventory", "Process Order"])
                    .default_text("Add Product"),
                OptionField::new("data", "Data", FieldType::Textarea)
                    .placeholder("JSON data for the action..."),
            ],
            recommended_prompts: &[
                "Add a new product with images and description",
                "Update inventory levels for multiple SKUs",
            ],
        }
        .into_config(),
        shop_url,
        custom_slot("custom-slot-1", "Custom Slot 1"),
        custom_slot("custom-slot-2", "Custom Slot 2"),
    ];
});

/// Read-only table of every provider the app knows about.
pub struct Catalog {}

impl Catalog {
    pub fn list() -> &'static [ProviderConfig] {
        return PROVIDERS.as_slice();
    }

    pub fn by_id(id: &str) -> Option<&'static ProviderConfig> {
        return PROVIDERS.iter().find(|provider| return provider.id == id);
    }

    pub fn by_name(name: &str) -> Option<&'static ProviderConfig> {
        return PROVIDERS.iter().find(|provider| return provider.name == name);
    }

    pub fn custom_slots() -> Vec<&'static ProviderConfig> {
        return PROVIDERS
            .iter()
            .filter(|provider| return provider.is_custom_slot)
            .collect();
    }

    /// Form values a provider starts with, taken from its option field
    /// defaults.
    pub fn default_inputs(
        provider: &ProviderConfig,
    ) -> serde_json::Map<String, serde_json::Value> {
        let mut inputs = serde_json::Map::new();
        for field in provider.option_fields.iter() {
            if let Some(default_value) = &field.default_value {
                inputs.insert(field.id.to_string(), default_value.to_json());
            }
        }

        return inputs;
    }

    /// Backend registry record for a catalog entry.
    pub fn to_provider_info(provider: &ProviderConfig) -> ProviderInfo {
        return ProviderInfo {
            name: provider.name.to_string(),
            author: "Empire Command".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            api_endpoint: provider.route.to_string(),
            documentation_link: "".to_string(),
        };
    }
}
