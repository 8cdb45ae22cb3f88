use anyhow::Result;
use mockito::Matcher;

use super::HttpBackend;
use crate::domain::models::Backend;
use crate::domain::models::Identity;
use crate::domain::models::WorkflowStatus;

#[tokio::test]
async fn it_successfully_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(200)
        .create_async()
        .await;

    let backend = HttpBackend::with_url(&server.url(), &Identity::anonymous());
    let res = backend.health_check().await;

    assert!(res.is_ok());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_fails_health_checks() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/health")
        .with_status(500)
        .create_async()
        .await;

    let backend = HttpBackend::with_url(&server.url(), &Identity::anonymous());
    let res = backend.health_check().await;

    assert!(res.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn it_sends_the_principal_and_named_arguments() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/providerKeyExists")
        .match_header("X-Principal", "user-1")
        .match_body(Matcher::Json(serde_json::json!({ "provider": "fal-ai" })))
        .with_status(200)
        .with_body(r#"{"ok": true}"#)
        .create_async()
        .await;

    let backend = HttpBackend::with_url(&server.url(), &Identity::new("user-1"));
    let exists = backend.provider_key_exists("fal-ai").await?;

    assert!(exists);
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_omits_the_principal_when_anonymous() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/getCurrentUser")
        .match_header("X-Principal", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"ok": "anonymous"}"#)
        .create_async()
        .await;

    let backend = HttpBackend::with_url(&server.url(), &Identity::anonymous());
    assert_eq!(backend.get_current_user().await?, "anonymous");

    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_surfaces_reject_messages() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/addOrUpdateAPIKey")
        .with_status(400)
        .with_body(r#"{"err": "Unauthorized: Only users can save API keys"}"#)
        .create_async()
        .await;

    let backend = HttpBackend::with_url(&server.url(), &Identity::anonymous());
    let res = backend
        .add_or_update_api_key("openai", "sk-1234567890")
        .await;

    assert_eq!(
        res.unwrap_err().to_string(),
        "Unauthorized: Only users can save API keys"
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn it_reports_status_without_reject_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/getAllProviders")
        .with_status(503)
        .create_async()
        .await;

    let backend = HttpBackend::with_url(&server.url(), &Identity::anonymous());
    let res = backend.get_all_providers().await;

    assert!(res
        .unwrap_err()
        .to_string()
        .starts_with("Backend call getAllProviders failed with status 503"));
    mock.assert_async().await;
}

#[tokio::test]
async fn it_decodes_workflow_runs() -> Result<()> {
    let body = r#"{"ok": [{
        "id": "run-1",
        "provider": "fal-ai",
        "workflowType": "image-generation",
        "inputs": "{\"prompt\":\"a red fox\"}",
        "status": {"kind": "failed", "message": "Cancelled by user"},
        "outputBlobId": null,
        "durationNanos": null,
        "createdAt": 1700000000000000000
    }]}"#;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/getWorkflowRuns")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let backend = HttpBackend::with_url(&server.url(), &Identity::new("user-1"));
    let runs = backend.get_workflow_runs("fal-ai").await?;

    assert_eq!(runs.len(), 1);
    assert_eq!(
        runs[0].status,
        WorkflowStatus::Failed("Cancelled by user".to_string())
    );
    assert_eq!(runs[0].prompt(), Some("a red fox".to_string()));
    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_decodes_missing_keys_as_none() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/getProviderKey")
        .with_status(200)
        .with_body(r#"{"ok": null}"#)
        .create_async()
        .await;

    let backend = HttpBackend::with_url(&server.url(), &Identity::new("user-1"));
    assert!(backend.get_provider_key("openai").await?.is_none());

    mock.assert_async().await;
    return Ok(());
}

#[tokio::test]
async fn it_ignores_trailing_slashes_in_the_backend_url() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/isCallerAdmin")
        .with_status(200)
        .with_body(r#"{"ok": false}"#)
        .create_async()
        .await;

    let url = format!("{}/", server.url());
    let backend = HttpBackend::with_url(&url, &Identity::new("user-1"));
    assert!(!backend.is_caller_admin().await?);

    mock.assert_async().await;
    return Ok(());
}
