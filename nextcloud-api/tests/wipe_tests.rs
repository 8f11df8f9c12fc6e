//! Remote wipe against a scripted server.

use std::sync::Arc;

use serde_json::json;

use nextcloud_api::RemoteWipe;
use nextcloud_fetch::{ApiResponse, FetchError, NextcloudClient, ScriptedRequester};

fn client(requester: &Arc<ScriptedRequester>) -> NextcloudClient {
    NextcloudClient::builder("https://cloud.example.com")
        .credentials("alice", "app-password")
        .requester(requester.clone())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_check_flagged() {
    let requester = Arc::new(ScriptedRequester::new().then_json(200, &json!({"wipe": true})));
    let client = client(&requester);

    assert!(RemoteWipe::new(&client).check().await.unwrap());

    let call = &requester.calls()[0];
    assert_eq!(call.url, "https://cloud.example.com/index.php/core/wipe/check");
    assert_eq!(call.form_value("token"), Some("app-password"));
    assert!(call.basic_auth.is_none());
}

#[tokio::test]
async fn test_check_not_flagged() {
    let requester = Arc::new(
        ScriptedRequester::new()
            .then_status(404)
            .then_json(200, &json!({})),
    );
    let client = client(&requester);
    let wipe = RemoteWipe::new(&client);

    assert!(!wipe.check().await.unwrap());
    assert!(!wipe.check().await.unwrap());
}

#[tokio::test]
async fn test_check_errors() {
    let requester = Arc::new(
        ScriptedRequester::new()
            .then(ApiResponse::new(200, "<html>"))
            .then_status(500),
    );
    let client = client(&requester);
    let wipe = RemoteWipe::new(&client);

    assert!(wipe.check().await.unwrap_err().api_error().is_some());
    let err = wipe.check().await.unwrap_err();
    assert_eq!(err.api_error().and_then(|e| e.status_code()), Some(500));
}

#[tokio::test]
async fn test_requires_app_password() {
    let requester = Arc::new(ScriptedRequester::new());
    let client = NextcloudClient::builder("https://cloud.example.com")
        .requester(requester.clone())
        .build()
        .unwrap();

    let err = RemoteWipe::new(&client).notify_wiped().await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidConfig(_)));
    assert_eq!(requester.call_count(), 0);
}

#[tokio::test]
async fn test_notify_wiped() {
    let requester = Arc::new(ScriptedRequester::new().then_status(200));
    let client = client(&requester);

    RemoteWipe::new(&client).notify_wiped().await.unwrap();

    let call = &requester.calls()[0];
    assert_eq!(call.url, "https://cloud.example.com/index.php/core/wipe/success");
    assert_eq!(call.form_value("token"), Some("app-password"));
}
