#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use futures::future::try_join_all;

use crate::domain::models::Actor;
use crate::domain::models::ChatMessage;
use crate::domain::models::Navigation;
use crate::domain::models::Page;
use crate::domain::models::ProviderConfig;
use crate::domain::models::UserRole;
use crate::domain::models::WorkflowRun;
use crate::domain::models::WorkflowStatus;
use crate::domain::models::WorkflowType;
use crate::domain::services::is_integrated;
use crate::domain::services::Catalog;
use crate::domain::services::ChatService;
use crate::domain::services::KeyService;
use crate::domain::services::ProviderMetadataService;
use crate::domain::services::QueryCache;
use crate::domain::services::WorkflowService;

const DEFAULT_CALLOUT: &str = "This feature is planned but not yet implemented. Check back soon!";

/// A catalog entry together with what the current caller has configured for
/// it.
#[derive(Clone, Debug)]
pub struct ProviderCard {
    pub provider: &'static ProviderConfig,
    pub display_name: String,
    pub has_key: bool,
}

impl ProviderCard {
    fn key_status(&self) -> String {
        if self.has_key {
            return format!("{} is configured", self.provider.credential_label());
        }

        return format!("No {} configured", self.provider.credential_label());
    }
}

fn heading(title: &str, subtitle: &str) -> Vec<String> {
    return vec![
        title.to_string(),
        "=".repeat(title.chars().count()),
        subtitle.to_string(),
    ];
}

fn section(title: &str) -> Vec<String> {
    return vec![
        "".to_string(),
        title.to_string(),
        "-".repeat(title.chars().count()),
    ];
}

pub struct Pages {}

impl Pages {
    pub fn run_line(run: &WorkflowRun) -> String {
        let prompt = run.prompt().unwrap_or_else(|| return "No prompt".to_string());
        let mut line = format!(
            "- [{}] {} \"{prompt}\"",
            run.status.label(),
            run.created_at_rfc3339()
        );

        if let Some(secs) = run.duration_secs() {
            line = format!("{line} ({secs:.1}s)");
        }

        match &run.status {
            WorkflowStatus::Success => {
                if let Some(output) = &run.output_blob_id {
                    line = format!("{line}\n    {output}");
                }
            }
            WorkflowStatus::Failed(message) => line = format!("{line}\n    {message}"),
            _ => {}
        }

        return line;
    }

    pub fn not_integrated(feature: &str, description: Option<&str>) -> String {
        return format!(
            "! {feature} - Not Integrated Yet\n  {}",
            description.unwrap_or(DEFAULT_CALLOUT)
        );
    }

    /// Callout shown on provider pages whose workflow has no execution path.
    pub fn workflow_callout(workflow_type: WorkflowType, display_name: &str) -> String {
        match workflow_type {
            WorkflowType::VideoGeneration => return Pages::not_integrated(
                "Video Generation",
                Some("Video generation, download, and sharing features require client-side API integration which will be implemented in a future release."),
            ),
            WorkflowType::ImageGeneration => return Pages::not_integrated(
                "Image Generation",
                Some("Image generation, download, and sharing features require client-side API integration which will be implemented in a future release."),
            ),
            WorkflowType::Integration => return Pages::not_integrated(
                &format!("{display_name} Integration"),
                Some("Integration features require client-side API calls which will be implemented in a future release."),
            ),
            WorkflowType::AppBuilder => return Pages::not_integrated(
                "App Builder",
                Some("App building features require client-side API integration which will be implemented in a future release."),
            ),
            WorkflowType::Custom => return Pages::not_integrated(
                "Custom Workflow",
                Some("Custom workflow execution requires client-side API integration which will be implemented in a future release."),
            ),
            WorkflowType::Chat => return Pages::not_integrated("Chat", None),
        }
    }

    /// Pages that render without talking to the backend.
    pub fn without_backend(navigation: &Navigation) -> Option<String> {
        match navigation {
            Navigation::Initializing => return Some(Pages::initializing()),
            Navigation::LoginRequired(_) => return Some(Pages::authentication_required()),
            Navigation::Render(Page::Terms) => return Some(Pages::terms()),
            Navigation::Render(Page::NotFound(path)) => return Some(Pages::not_found(path)),
            Navigation::Render(Page::StudioTools) => return Some(Pages::studio()),
            Navigation::Render(Page::MemoryBrain) => return Some(Pages::memory()),
            Navigation::Render(Page::LinksDashboard) => return Some(Pages::links()),
            Navigation::Render(_) => return None,
        }
    }

    pub fn initializing() -> String {
        return "Initializing...".to_string();
    }

    pub fn authentication_required() -> String {
        return [
            "Authentication Required",
            "Please log in to access Empire Command and manage your AI providers.",
            "Pass --identity or set EMPIRE_IDENTITY to continue.",
        ]
        .join("\n");
    }

    pub fn not_found(path: &str) -> String {
        return format!("Page Not Found\nNothing lives at {path}.");
    }

    pub fn provider_not_found(provider_id: &str) -> String {
        return format!("Provider Not Found\nThe provider \"{provider_id}\" could not be found.");
    }

    pub fn hub(cards: &[ProviderCard]) -> String {
        let mut lines = heading(
            "AI Provider Command Center",
            "Select a provider to access its dedicated command center, manage API keys, and interact with AI models.",
        );
        lines.push("".to_string());

        for card in cards {
            let status = if card.has_key { "ready" } else { "no key" };
            lines.push(format!(
                "{} ({}) [{status}]",
                card.display_name, card.provider.route
            ));
            lines.push(format!("  {}", card.provider.description));
        }

        return lines.join("\n");
    }

    pub fn vault(cards: &[ProviderCard]) -> String {
        let mut lines = heading(
            "Empire Vault",
            "Manage your API keys securely across all providers",
        );
        lines.push("".to_string());

        for card in cards {
            lines.push(format!("{} ({})", card.display_name, card.provider.id));
            lines.push(format!("  {}", card.key_status()));
        }

        return lines.join("\n");
    }

    pub fn provider(card: &ProviderCard, runs: &[WorkflowRun], messages: &[ChatMessage]) -> String {
        let provider = card.provider;
        let mut lines = heading(&card.display_name, provider.description);
        lines.push(format!("Capabilities: {}", provider.capabilities.join(", ")));
        lines.push(format!("Credential: {}", card.key_status()));

        let workflow_type = match provider.workflow_type {
            Some(workflow_type) => workflow_type,
            None => return lines.join("\n"),
        };

        if !provider.recommended_prompts.is_empty() {
            lines.extend(section("Recommended Prompts"));
            for prompt in provider.recommended_prompts.iter() {
                lines.push(format!("- {prompt}"));
            }
        }

        if !card.has_key {
            lines.extend(section("API Key Required"));
            lines.push(format!(
                "Please add your {} API key in the Key Vault to use this feature.",
                card.display_name
            ));
            return lines.join("\n");
        }

        if provider.has_chat() {
            lines.extend(section("Chat"));
            if messages.is_empty() {
                lines.push("No messages yet.".to_string());
            }
            for message in messages {
                lines.push(format!("{}: {}", message.author(), message.content));
            }
            return lines.join("\n");
        }

        lines.extend(section("Tools & Options"));
        if !is_integrated(provider, workflow_type) {
            lines.push(Pages::workflow_callout(workflow_type, &card.display_name));
            return lines.join("\n");
        }

        for field in provider.option_fields.iter() {
            let mut line = format!("- {} ({}, {})", field.label, field.id, field.field_type);
            if !field.options.is_empty() {
                line = format!("{line} options: {}", field.options.join(" | "));
            }
            if let Some(default_value) = &field.default_value {
                line = format!("{line} default: {default_value}");
            }
            lines.push(line);
        }

        lines.extend(section("Generation History"));
        if runs.is_empty() {
            lines.push("No runs yet.".to_string());
        }
        for run in runs {
            lines.push(Pages::run_line(run));
        }

        return lines.join("\n");
    }

    pub fn admin(is_admin: bool, role: UserRole) -> String {
        if !is_admin {
            return "Access Denied\nYou do not have administrator privileges to access this page."
                .to_string();
        }

        let mut lines = heading("Admin Panel", "System administration and management tools");
        lines.push(format!("Role: {role}"));

        let tools = [
            ("Provider Management", "Admin tools for provider initialization are planned for a future release."),
            ("User Management", "User administration tools are planned for a future release."),
            ("Discount Codes", "Promotional code management is planned for a future release."),
            ("Memory Injection", "Manual memory management tools are planned for a future release."),
        ];
        for (feature, description) in tools {
            lines.push("".to_string());
            lines.push(Pages::not_integrated(feature, Some(description)));
        }

        return lines.join("\n");
    }

    pub fn studio() -> String {
        let mut lines = heading(
            "Studio Tools",
            "Advanced tools for content creation and management",
        );

        let tools = [
            ("Motion Brush", "Interactive motion brush tool for video generation is planned for a future release."),
            ("Magic Script", "AI-powered script enhancement tool is planned for a future release."),
            ("Generation History", "Asset history gallery with filtering is planned for a future release."),
        ];
        for (feature, description) in tools {
            lines.push("".to_string());
            lines.push(Pages::not_integrated(feature, Some(description)));
        }

        return lines.join("\n");
    }

    pub fn memory() -> String {
        let mut lines = heading(
            "Empire Brain",
            "Retrieval-augmented generation system for brand consistency",
        );
        lines.push("".to_string());
        lines.push(Pages::not_integrated(
            "Empire Brain",
            Some("The RAG system with embeddings and memory storage is planned for a future release."),
        ));

        return lines.join("\n");
    }

    pub fn links() -> String {
        let mut lines = heading(
            "Links Dashboard",
            "Manage your external links and integrations",
        );
        lines.push("".to_string());
        lines.push(Pages::not_integrated(
            "Links Dashboard",
            Some("CRUD operations for link management are planned for a future release."),
        ));

        return lines.join("\n");
    }

    pub fn terms() -> String {
        let mut lines = heading("Terms & Conditions", "Last updated: February 9, 2026");
        let sections = [
            ("1. Acceptance of Terms", "By accessing and using Empire Command, you accept and agree to be bound by the terms and provisions of this agreement."),
            ("2. Use License", "Permission is granted to temporarily use Empire Command for personal, non-commercial purposes."),
            ("3. API Keys and Third-Party Services", "You are solely responsible for the security of your API keys, all activity under them, and any charges incurred with third-party providers."),
            ("4. Privacy and Data Storage", "Your API keys, chat history, and workflow runs are stored by the backend service. No method of transmission over the internet is 100% secure."),
            ("5. Disclaimer", "The materials within Empire Command are provided on an 'as is' basis, without warranties of any kind."),
            ("6. Limitations", "In no event shall the authors be liable for any damages arising out of the use or inability to use Empire Command."),
            ("7. Modifications", "These terms may be revised at any time without notice."),
        ];
        for (title, body) in sections {
            lines.push("".to_string());
            lines.push(title.to_string());
            lines.push(format!("  {body}"));
        }

        return lines.join("\n");
    }
}

/// Gathers what a page needs from the backend and renders it.
pub struct PageLoader {
    actor: Actor,
    cache: Arc<QueryCache>,
}

impl PageLoader {
    pub fn new(actor: Actor, cache: Arc<QueryCache>) -> PageLoader {
        return PageLoader { actor, cache };
    }

    async fn card(&self, provider: &'static ProviderConfig) -> Result<ProviderCard> {
        let metadata = ProviderMetadataService::new(self.actor.clone(), self.cache.clone());
        let keys = KeyService::new(self.actor.clone(), self.cache.clone());

        return Ok(ProviderCard {
            provider,
            display_name: metadata.resolve_display_name(provider.id).await?,
            has_key: keys.exists(provider.id).await?,
        });
    }

    async fn cards(&self) -> Result<Vec<ProviderCard>> {
        let cards = Catalog::list().iter().map(|provider| return self.card(provider));
        return try_join_all(cards).await;
    }

    async fn provider(&self, provider_id: &str) -> Result<String> {
        let provider = match Catalog::by_id(provider_id) {
            Some(provider) => provider,
            None => return Ok(Pages::provider_not_found(provider_id)),
        };

        let card = self.card(provider).await?;
        let mut runs = vec![];
        let mut messages = vec![];

        if card.has_key && provider.has_chat() {
            messages = ChatService::new(self.actor.clone(), self.cache.clone())
                .messages(provider.id)
                .await?;
        }
        if let Some(workflow_type) = provider.workflow_type {
            if card.has_key && is_integrated(provider, workflow_type) {
                runs = WorkflowService::new(self.actor.clone(), self.cache.clone())
                    .list(provider.id)
                    .await?;
            }
        }

        return Ok(Pages::provider(&card, &runs, &messages));
    }

    pub async fn render(&self, navigation: &Navigation) -> Result<String> {
        if let Some(res) = Pages::without_backend(navigation) {
            return Ok(res);
        }

        let page = match navigation {
            Navigation::Render(page) => page,
            _ => return Ok(Pages::initializing()),
        };

        match page {
            Page::ProviderHub => return Ok(Pages::hub(&self.cards().await?)),
            Page::Provider(provider_id) | Page::CustomSlot(provider_id) => {
                return self.provider(provider_id).await;
            }
            Page::KeyVault => return Ok(Pages::vault(&self.cards().await?)),
            Page::AdminPanel => {
                let is_admin = self.actor.is_caller_admin().await?;
                let role = self.actor.get_caller_user_role().await?;
                return Ok(Pages::admin(is_admin, role));
            }
            _ => return Ok(Pages::initializing()),
        }
    }
}
