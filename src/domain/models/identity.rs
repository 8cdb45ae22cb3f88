use serde::Deserialize;
use serde::Serialize;

pub const ANONYMOUS_PRINCIPAL: &str = "anonymous";

/// Caller identity handed over by the external identity provider. An empty
/// principal means the caller is anonymous.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Identity {
    principal: Option<String>,
}

impl Identity {
    pub fn new(principal: &str) -> Identity {
        let trimmed = principal.trim();
        if trimmed.is_empty() || trimmed == ANONYMOUS_PRINCIPAL {
            return Identity::anonymous();
        }

        return Identity {
            principal: Some(trimmed.to_string()),
        };
    }

    pub fn anonymous() -> Identity {
        return Identity { principal: None };
    }

    pub fn is_authenticated(&self) -> bool {
        return self.principal.is_some();
    }

    pub fn principal(&self) -> Option<&str> {
        return self.principal.as_deref();
    }

    /// Key used to scope cached handles and local storage to this identity.
    pub fn cache_key(&self) -> String {
        return self
            .principal
            .clone()
            .unwrap_or_else(|| return ANONYMOUS_PRINCIPAL.to_string());
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
}

/// Gate state for protected pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthState {
    Initializing,
    Authenticated,
    Unauthenticated,
}

impl AuthState {
    pub fn from_identity(identity: Option<&Identity>) -> AuthState {
        match identity {
            None => return AuthState::Initializing,
            Some(identity) if identity.is_authenticated() => return AuthState::Authenticated,
            Some(_) => return AuthState::Unauthenticated,
        }
    }
}

/// Display name kept on this machine for callers the backend has no profile
/// for.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProfile {
    pub principal: String,
    pub name: String,
    pub updated_at: String,
}
