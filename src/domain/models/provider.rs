#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Serialize;
use strum::EnumIter;
use strum::EnumString;
use strum::EnumVariantNames;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    EnumVariantNames,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WorkflowType {
    Chat,
    VideoGeneration,
    ImageGeneration,
    AppBuilder,
    Integration,
    Custom,
}

impl WorkflowType {
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowType::Chat => return "Chat",
            WorkflowType::VideoGeneration => return "Video Generation",
            WorkflowType::ImageGeneration => return "Image Generation",
            WorkflowType::AppBuilder => return "App Builder",
            WorkflowType::Integration => return "Integration",
            WorkflowType::Custom => return "Custom Workflow",
        }
    }

    /// File extension used for artifacts produced by this workflow.
    pub fn artifact_extension(&self) -> &'static str {
        match self {
            WorkflowType::VideoGeneration => return "mp4",
            WorkflowType::ImageGeneration => return "png",
            _ => return "json",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Select,
    Number,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(&'static str),
    Number(f64),
}

impl FieldValue {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(text) => return serde_json::Value::String(text.to_string()),
            FieldValue::Number(num) => return serde_json::json!(num),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(text) => return write!(f, "{text}"),
            FieldValue::Number(num) => return write!(f, "{num}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionField {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub placeholder: Option<&'static str>,
    pub options: Vec<&'static str>,
    pub default_value: Option<FieldValue>,
}

impl OptionField {
    pub fn new(id: &'static str, label: &'static str, field_type: FieldType) -> OptionField {
        return OptionField {
            id,
            label,
            field_type,
            placeholder: None,
            options: vec![],
            default_value: None,
        };
    }

    pub fn placeholder(mut self, placeholder: &'static str) -> OptionField {
        self.placeholder = Some(placeholder);
        return self;
    }

    pub fn options(mut self, options: &[&'static str]) -> OptionField {
        self.options = options.to_vec();
        return self;
    }

    pub fn default_text(mut self, value: &'static str) -> OptionField {
        self.default_value = Some(FieldValue::Text(value));
        return self;
    }

    pub fn default_number(mut self, value: f64) -> OptionField {
        self.default_value = Some(FieldValue::Number(value));
        return self;
    }
}

/// Static description of a provider integration. Compiled in, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub capabilities: Vec<&'static str>,
    pub route: String,
    pub is_custom_slot: bool,
    pub credential_label: Option<&'static str>,
    pub credential_placeholder: Option<&'static str>,
    pub workflow_type: Option<WorkflowType>,
    pub option_fields: Vec<OptionField>,
    pub recommended_prompts: Vec<&'static str>,
}

impl ProviderConfig {
    pub fn credential_label(&self) -> &'static str {
        return self.credential_label.unwrap_or("API Key");
    }

    pub fn has_chat(&self) -> bool {
        return self.workflow_type == Some(WorkflowType::Chat);
    }

    pub fn has_workflow(&self) -> bool {
        if let Some(workflow_type) = self.workflow_type {
            return workflow_type != WorkflowType::Chat;
        }

        return false;
    }
}

/// Provider registry record kept by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub name: String,
    pub author: String,
    pub version: String,
    pub api_endpoint: String,
    pub documentation_link: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomProviderMetadata {
    pub display_name: String,
}
