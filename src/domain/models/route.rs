/// Every page reachable through the route tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Page {
    ProviderHub,
    Provider(String),
    CustomSlot(String),
    KeyVault,
    StudioTools,
    MemoryBrain,
    LinksDashboard,
    AdminPanel,
    Terms,
    NotFound(String),
}

impl Page {
    /// Whether the page sits behind the authentication gate.
    pub fn is_protected(&self) -> bool {
        return !matches!(self, Page::Terms | Page::NotFound(_));
    }

    pub fn title(&self) -> String {
        match self {
            Page::ProviderHub => return "Provider Hub".to_string(),
            Page::Provider(id) | Page::CustomSlot(id) => return format!("Provider: {id}"),
            Page::KeyVault => return "Key Vault".to_string(),
            Page::StudioTools => return "Studio Tools".to_string(),
            Page::MemoryBrain => return "Memory Brain".to_string(),
            Page::LinksDashboard => return "Links Dashboard".to_string(),
            Page::AdminPanel => return "Admin Panel".to_string(),
            Page::Terms => return "Terms of Service".to_string(),
            Page::NotFound(path) => return format!("Not Found: {path}"),
        }
    }
}

/// Outcome of navigating to a path with a given authentication state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Page),
    Initializing,
    LoginRequired(Page),
}
