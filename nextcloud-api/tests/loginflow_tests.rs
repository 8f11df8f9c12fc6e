//! Login flow against a scripted server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use nextcloud_api::{LoginFlow, LoginFlowError};
use nextcloud_core::{LoginPoll, NextcloudError};
use nextcloud_fetch::{
    ApiResponse, CancellationToken, FetchError, Method, NextcloudClient, Payload,
    ScriptedRequester, TransportError,
};

const SERVER: &str = "https://cloud.example.com";

fn client(requester: &Arc<ScriptedRequester>) -> NextcloudClient {
    NextcloudClient::builder(SERVER)
        .user_agent("ncctl-tests")
        .requester(requester.clone())
        .build()
        .unwrap()
}

fn credentials_body() -> serde_json::Value {
    json!({
        "server": SERVER,
        "loginName": "alice",
        "appPassword": "yKTVA4zgxjfivy52WqD8kW3M2pKGQr6srmUXMipRdunxjPFripJn0GMfmtNOqOolYSuJ6sCN"
    })
}

#[tokio::test]
async fn test_initiate() {
    let requester = Arc::new(ScriptedRequester::new().then_json(
        200,
        &json!({
            "poll": {"token": "mQUYQdffOSAMJYtm8pVpkOsVqXt5hglnuSpO5EMbgJMNEPFGaiDe8OUjvrJ2WcYcBSLgqynu9jaPFvZHMl83ybMvp6aDIDARjTFIBpRWod6p32fL9LIpIStvc6k8Wrs1", "endpoint": "https://cloud.example.com/login/v2/poll"},
            "login": "https://cloud.example.com/login/v2/flow/guyjGtcKPTKCi4epIRIupIexgJ8wNInMFSfHabACRPZUkmEaWZSM54bFkFuzWksbps7jmTFQjeskLpyJXyhpHlgK8sZBn9HXLXjohIx5iXgJKdOkkZTYCzUWHlsg3YFg"
        }),
    ));
    let client = client(&requester);

    let start = LoginFlow::new(&client).initiate(None).await.unwrap();

    assert_eq!(start.poll.endpoint, "https://cloud.example.com/login/v2/poll");
    assert!(start.login.contains("/login/v2/flow/"));

    let call = &requester.calls()[0];
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.url, "https://cloud.example.com/index.php/login/v2");
    assert_eq!(call.header_value("User-Agent"), Some("ncctl-tests"));
    assert!(call.basic_auth.is_none());
}

#[tokio::test]
async fn test_initiate_custom_user_agent_and_bad_body() {
    let requester = Arc::new(ScriptedRequester::new().then_json(200, &json!({"nope": true})));
    let client = client(&requester);

    let err = LoginFlow::new(&client)
        .initiate(Some("My Desktop"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoginFlowError::Fetch(FetchError::Transport(TransportError::Decode(_)))
    ));
    assert_eq!(requester.calls()[0].header_value("user-agent"), Some("My Desktop"));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_confirmation() {
    let requester = Arc::new(
        ScriptedRequester::new()
            .then_status(404)
            .then_status(404)
            .then_json(200, &credentials_body()),
    );
    let client = client(&requester);
    let poll = LoginPoll::for_server(SERVER, "tok");

    let creds = LoginFlow::new(&client)
        .wait_for_confirmation(&poll, Duration::from_secs(60), Duration::from_secs(1))
        .await
        .unwrap();

    assert_eq!(creds.login_name, "alice");
    assert_eq!(creds.server, SERVER);

    let calls = requester.calls();
    assert_eq!(calls.len(), 3);
    for call in &calls {
        assert_eq!(call.url, "https://cloud.example.com/login/v2/poll");
        assert_eq!(call.payload, Payload::Form(vec![("token".into(), "tok".into())]));
    }
}

#[tokio::test(start_paused = true)]
async fn test_wait_times_out_and_can_resume() {
    let requester = Arc::new(
        ScriptedRequester::new()
            .then_status(404)
            .then_status(404)
            .then_status(404)
            .then_json(200, &credentials_body()),
    );
    let client = client(&requester);
    let poll = LoginPoll::for_server(SERVER, "tok");
    let flow = LoginFlow::new(&client);

    let err = flow
        .wait_for_confirmation(&poll, Duration::from_secs(2), Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, LoginFlowError::Timeout { attempts: 3, .. }));
    assert!(err.is_retryable());

    let creds = flow
        .wait_for_confirmation(&poll, Duration::from_secs(2), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(creds.login_name, "alice");
}

#[tokio::test(start_paused = true)]
async fn test_wait_rejected() {
    let requester = Arc::new(ScriptedRequester::new().then(ApiResponse::new(403, "")));
    let client = client(&requester);
    let poll = LoginPoll::for_server(SERVER, "tok");

    let err = LoginFlow::new(&client)
        .wait_for_confirmation(&poll, Duration::from_secs(60), Duration::from_secs(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoginFlowError::Rejected(NextcloudError::Forbidden(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_wait_with_defaults_uses_client_settings() {
    let requester = Arc::new(ScriptedRequester::new().repeat(ApiResponse::empty(404)));
    let client = NextcloudClient::builder(SERVER)
        .login_timeout(Duration::from_secs(4))
        .poll_interval(Duration::from_secs(2))
        .requester(requester.clone())
        .build()
        .unwrap();

    let err = LoginFlow::new(&client)
        .wait_with_defaults(&LoginPoll::for_server(SERVER, "tok"))
        .await
        .unwrap_err();

    // Attempts at 0s, 2s and 4s
    assert!(matches!(err, LoginFlowError::Timeout { attempts: 3, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_wait_cancelled() {
    let requester = Arc::new(ScriptedRequester::new().repeat(ApiResponse::empty(404)));
    let client = client(&requester);
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        trigger.cancel();
    });

    let err = LoginFlow::new(&client)
        .wait_for_confirmation_until_cancelled(
            &LoginPoll::for_server(SERVER, "tok"),
            Duration::from_secs(60),
            Duration::from_secs(1),
            &token,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, LoginFlowError::Cancelled { attempts: 3 }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_destroy_app_password() {
    let requester = Arc::new(ScriptedRequester::new().then_json(
        200,
        &json!({"ocs": {"meta": {"status": "ok", "statuscode": 200, "message": "OK"}, "data": []}}),
    ));
    let client = NextcloudClient::builder(SERVER)
        .credentials("alice", "app-password")
        .requester(requester.clone())
        .build()
        .unwrap();

    LoginFlow::new(&client).destroy_app_password().await.unwrap();

    let call = &requester.calls()[0];
    assert_eq!(call.method, Method::DELETE);
    assert_eq!(call.url, "https://cloud.example.com/ocs/v2.php/core/apppassword");
    assert_eq!(call.header_value("OCS-APIRequest"), Some("true"));
    assert_eq!(
        call.basic_auth,
        Some(("alice".to_string(), "app-password".to_string()))
    );
}

#[tokio::test]
async fn test_destroy_app_password_unauthorized() {
    let requester = Arc::new(ScriptedRequester::new().then_status(401));
    let client = client(&requester);

    let err = LoginFlow::new(&client)
        .destroy_app_password()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LoginFlowError::Fetch(FetchError::Api(NextcloudError::Unauthorized(_)))
    ));
}
