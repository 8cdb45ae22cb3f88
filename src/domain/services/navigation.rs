#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;

use crate::domain::models::AuthState;
use crate::domain::models::Navigation;
use crate::domain::models::Page;

const PROVIDER_ALIASES: [(&str, &str); 1] = [("fal", "fal-ai")];

pub struct Navigator {}

impl Navigator {
    /// Maps a path onto a page, ignoring any query string and trailing slash.
    pub fn resolve(path: &str) -> Page {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments = trimmed
            .split('/')
            .filter(|segment| return !segment.is_empty())
            .collect::<Vec<&str>>();

        match segments.as_slice() {
            [] => return Page::ProviderHub,
            ["vault"] => return Page::KeyVault,
            ["studio"] => return Page::StudioTools,
            ["memory"] => return Page::MemoryBrain,
            ["links"] => return Page::LinksDashboard,
            ["admin"] => return Page::AdminPanel,
            ["terms"] => return Page::Terms,
            ["providers", provider_id] => {
                let provider_id = PROVIDER_ALIASES
                    .iter()
                    .find(|(alias, _)| return alias == provider_id)
                    .map(|(_, id)| return *id)
                    .unwrap_or(*provider_id);

                if provider_id.starts_with("custom-slot-") {
                    return Page::CustomSlot(provider_id.to_string());
                }
                return Page::Provider(provider_id.to_string());
            }
            _ => return Page::NotFound(path.to_string()),
        }
    }

    /// Applies the authentication gate to the page behind `path`.
    pub fn navigate(path: &str, auth: AuthState) -> Navigation {
        let page = Navigator::resolve(path);
        if !page.is_protected() {
            return Navigation::Render(page);
        }

        match auth {
            AuthState::Initializing => return Navigation::Initializing,
            AuthState::Authenticated => return Navigation::Render(page),
            AuthState::Unauthenticated => return Navigation::LoginRequired(page),
        }
    }
}
