use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActorError {
    #[error("Backend is not ready. Please wait a moment and try again.")]
    NotReady,
    #[error("Failed to connect to the backend: {0}")]
    Connection(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Idle,
    Connecting,
    Ready,
    Error(ActorError),
}

impl ConnectionState {
    pub fn is_connecting(&self) -> bool {
        return *self == ConnectionState::Connecting;
    }

    pub fn is_ready(&self) -> bool {
        return *self == ConnectionState::Ready;
    }

    pub fn error(&self) -> Option<&ActorError> {
        if let ConnectionState::Error(err) = self {
            return Some(err);
        }

        return None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum BackendErrorKind {
    StoppedBackend,
    Network,
    Auth,
    Timeout,
    NotReady,
    Unknown,
}

/// User facing description of a failure, with suggested next actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendErrorInfo {
    pub kind: BackendErrorKind,
    pub user_message: String,
    pub action_steps: Vec<String>,
    pub is_stopped_canister: bool,
    pub is_network_error: bool,
    pub is_auth_error: bool,
}
