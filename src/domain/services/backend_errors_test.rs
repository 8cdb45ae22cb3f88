use anyhow::anyhow;

use super::BackendErrors;
use crate::domain::models::BackendErrorKind;

#[test]
fn it_detects_stopped_canisters() {
    assert!(BackendErrors::is_stopped_canister(
        "Call failed: IC0508: Canister abc is stopped"
    ));
    assert!(BackendErrors::is_stopped_canister("Reject code: 5"));
    assert!(BackendErrors::is_stopped_canister("the canister has been STOPPED"));
    assert!(!BackendErrors::is_stopped_canister("Reject code: 4"));
    assert!(!BackendErrors::is_stopped_canister("canister is running"));
}

#[test]
fn it_classifies_stopped_canister_regardless_of_auth() {
    let err = anyhow!("IC0508: canister stopped");
    for is_authenticated in [true, false] {
        let info = BackendErrors::classify(&err, is_authenticated);
        assert_eq!(info.kind, BackendErrorKind::StoppedBackend);
        assert!(info.is_stopped_canister);
        assert!(!info.is_network_error);
        assert_eq!(
            info.user_message,
            "The backend canister is currently stopped or unavailable."
        );
        assert_eq!(info.action_steps.len(), 3);
    }
}

#[test]
fn it_classifies_network_errors() {
    let info = BackendErrors::classify(&anyhow!("TypeError: Failed to fetch"), true);
    assert_eq!(info.kind, BackendErrorKind::Network);
    assert!(info.is_network_error);

    let info = BackendErrors::classify(
        &anyhow!("error sending request for url (http://localhost:4943/health)"),
        true,
    );
    assert_eq!(info.kind, BackendErrorKind::Network);
}

#[test]
fn it_picks_auth_steps_by_login_state() {
    let err = anyhow!("Unauthorized: Only users can save keys");

    let info = BackendErrors::classify(&err, true);
    assert_eq!(info.kind, BackendErrorKind::Auth);
    assert!(info.is_auth_error);
    assert_eq!(
        info.action_steps,
        vec!["Try logging out and back in", "Reload the page"]
    );

    let info = BackendErrors::classify(&err, false);
    assert_eq!(
        info.action_steps,
        vec!["Log in to continue", "Reload the page if needed"]
    );
}

#[test]
fn it_flags_timeouts_as_network() {
    let info = BackendErrors::classify(&anyhow!("Request timed out"), true);
    assert_eq!(info.kind, BackendErrorKind::Timeout);
    assert!(info.is_network_error);
    assert_eq!(
        info.user_message,
        "Connection timed out. The backend may be temporarily unavailable."
    );
}

#[test]
fn it_classifies_reqwest_timeouts_as_timeouts() {
    let info = BackendErrors::classify(
        &anyhow!(
            "Backend is not reachable: error sending request for url (http://localhost:4943/health): operation timed out"
        ),
        true,
    );
    assert_eq!(info.kind, BackendErrorKind::Timeout);
    assert!(info.is_network_error);
}

#[test]
fn it_classifies_not_ready() {
    let info = BackendErrors::classify(
        &anyhow!("Backend is not ready. Please wait a moment and try again."),
        true,
    );
    assert_eq!(info.kind, BackendErrorKind::NotReady);
}

#[test]
fn it_falls_back_to_generic_and_unknown() {
    let info = BackendErrors::classify(&anyhow!("something odd"), true);
    assert_eq!(info.kind, BackendErrorKind::Unknown);
    assert_eq!(
        info.user_message,
        "Could not connect to the backend. Please try again."
    );

    let info = BackendErrors::classify_message(None, true);
    assert_eq!(info.user_message, "An unknown error occurred.");
    assert_eq!(info.action_steps, vec!["Please try again"]);
}

#[test]
fn it_sanitizes_long_messages() {
    let err = anyhow!("x".repeat(800));
    assert_eq!(BackendErrors::sanitize_for_logging(&err).len(), 500);

    let err = anyhow!("short");
    assert_eq!(BackendErrors::sanitize_for_logging(&err), "short");
}
