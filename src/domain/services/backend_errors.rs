#[cfg(test)]
#[path = "backend_errors_test.rs"]
mod tests;

use crate::domain::models::BackendErrorInfo;
use crate::domain::models::BackendErrorKind;

const LOG_MESSAGE_LIMIT: usize = 500;

fn steps(items: &[&str]) -> Vec<String> {
    return items.iter().map(|item| return item.to_string()).collect();
}

fn contains_any(message: &str, needles: &[&str]) -> bool {
    return needles.iter().any(|needle| return message.contains(needle));
}

fn info(kind: BackendErrorKind, user_message: &str, action_steps: &[&str]) -> BackendErrorInfo {
    return BackendErrorInfo {
        kind,
        user_message: user_message.to_string(),
        action_steps: steps(action_steps),
        is_stopped_canister: kind == BackendErrorKind::StoppedBackend,
        is_network_error: kind == BackendErrorKind::Network || kind == BackendErrorKind::Timeout,
        is_auth_error: kind == BackendErrorKind::Auth,
    };
}

/// Turns raw backend and transport failures into something a user can act on.
pub struct BackendErrors {}

impl BackendErrors {
    /// Reject code 5 / IC0508 style failures, raised when the backend has
    /// been stopped.
    pub fn is_stopped_canister(message: &str) -> bool {
        let lower = message.to_lowercase();
        return lower.contains("ic0508")
            || (lower.contains("reject code") && lower.contains('5'))
            || (lower.contains("canister") && lower.contains("stopped"));
    }

    pub fn classify(err: &anyhow::Error, is_authenticated: bool) -> BackendErrorInfo {
        return BackendErrors::classify_message(Some(&format!("{err:#}")), is_authenticated);
    }

    pub fn classify_message(message: Option<&str>, is_authenticated: bool) -> BackendErrorInfo {
        let message = match message {
            Some(message) => message,
            None => {
                return info(
                    BackendErrorKind::Unknown,
                    "An unknown error occurred.",
                    &["Please try again"],
                );
            }
        };
        let lower = message.to_lowercase();

        if BackendErrors::is_stopped_canister(message) {
            return info(
                BackendErrorKind::StoppedBackend,
                "The backend canister is currently stopped or unavailable.",
                &[
                    "Wait a moment and try again",
                    "Click \"Retry Connection\" if available",
                    "Reload the page if the issue persists",
                ],
            );
        }

        // reqwest reports its own timeouts as "error sending request".
        let timed_out = contains_any(&lower, &["timeout", "timed out"]);
        if contains_any(&lower, &["network", "fetch"])
            || (!timed_out && contains_any(&lower, &["connection refused", "error sending request"]))
        {
            return info(
                BackendErrorKind::Network,
                "Network connection failed. Please check your internet connection.",
                &[
                    "Check your internet connection",
                    "Try again in a moment",
                    "Reload the page if needed",
                ],
            );
        }

        if contains_any(&lower, &["unauthorized", "permission", "not authenticated"]) {
            let action_steps: &[&str] = if is_authenticated {
                &["Try logging out and back in", "Reload the page"]
            } else {
                &["Log in to continue", "Reload the page if needed"]
            };

            return info(
                BackendErrorKind::Auth,
                "Authentication failed. Please verify your login status.",
                action_steps,
            );
        }

        if timed_out {
            return info(
                BackendErrorKind::Timeout,
                "Connection timed out. The backend may be temporarily unavailable.",
                &[
                    "Wait a moment and try again",
                    "Check your internet connection",
                    "Reload the page if the issue persists",
                ],
            );
        }

        if contains_any(&lower, &["not ready", "still connecting"]) {
            return info(
                BackendErrorKind::NotReady,
                "Still connecting to the backend. Please wait a moment.",
                &[
                    "Wait for the connection to complete",
                    "Try again in a few seconds",
                ],
            );
        }

        return info(
            BackendErrorKind::Unknown,
            "Could not connect to the backend. Please try again.",
            &[
                "Wait a moment and try again",
                "Reload the page if needed",
                "Check your internet connection",
            ],
        );
    }

    pub fn user_friendly_message(err: &anyhow::Error, is_authenticated: bool) -> String {
        return BackendErrors::classify(err, is_authenticated).user_message;
    }

    /// Error text safe to write to logs, trimmed so full reject payloads never
    /// end up there.
    pub fn sanitize_for_logging(err: &anyhow::Error) -> String {
        return format!("{err:#}").chars().take(LOG_MESSAGE_LIMIT).collect();
    }
}
