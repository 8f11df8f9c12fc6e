//! Serde tests for core types against real server payloads.

use crate::{AvatarColor, FeatureSet, LoginCredentials, LoginFlowStart, LoginPoll, TalkFeature};

// ============================================================================
// Login Flow
// ============================================================================

#[test]
fn test_login_flow_start_from_server_payload() {
    let json = r#"{
        "poll": {
            "token": "mQUYQdffOSAMJYtm8pVpkOsVqXt5hglnuSpO5EMbgJMNEPFGaiDe8OUjvrJ2WcYcBSLgqynu9jaPFvZHMl83ybMvp6aDIDARjTFIBpRWod6p32fL9LIpIStvc6k8Wrs1",
            "endpoint": "https://cloud.example.com/login/v2/poll"
        },
        "login": "https://cloud.example.com/login/v2/flow/guyjGtcKPTKCi4epIRIupIexgJ8wNInMFSfHabACRPZUkmEaWZSM54bFkFuzWksbps7jmTFQjeskLpyJXyhpHlgK8sZBn9HXLXjohIx5iXgJKdOkkZTYCzUWHlsg3YFg"
    }"#;

    let start: LoginFlowStart = serde_json::from_str(json).unwrap();
    assert_eq!(start.poll.endpoint, "https://cloud.example.com/login/v2/poll");
    assert!(start.poll.token.starts_with("mQUYQdff"));
    assert!(start.login.contains("/login/v2/flow/"));
}

#[test]
fn test_login_credentials_camel_case() {
    let json = r#"{
        "server": "https://cloud.example.com",
        "loginName": "username",
        "appPassword": "yKTVA4zgxjfivy52WqD8kW3M2pKGQr6srmUXMipRdunxjPFripJn0GMfmtNOqOolYSuJ6sCN"
    }"#;

    let creds: LoginCredentials = serde_json::from_str(json).unwrap();
    assert_eq!(creds.login_name, "username");
    assert_eq!(creds.server, "https://cloud.example.com");

    let back = serde_json::to_value(&creds).unwrap();
    assert!(back.get("appPassword").is_some());
    assert!(back.get("app_password").is_none());
}

#[test]
fn test_debug_redacts_secrets() {
    let creds = LoginCredentials {
        server: "https://cloud.example.com".to_string(),
        login_name: "alice".to_string(),
        app_password: "s3cr3t".to_string(),
    };
    let poll = LoginPoll::for_server("https://cloud.example.com/", "tok3n");

    assert!(!format!("{creds:?}").contains("s3cr3t"));
    assert!(!format!("{poll:?}").contains("tok3n"));
    assert_eq!(poll.endpoint, "https://cloud.example.com/login/v2/poll");
}

// ============================================================================
// Capabilities & Avatars
// ============================================================================

#[test]
fn test_talk_feature_identifiers() {
    assert_eq!(serde_json::to_string(&TalkFeature::Avatar).unwrap(), r#""avatar""#);
    assert_eq!(
        serde_json::from_str::<TalkFeature>(r#""federation-v1""#).unwrap(),
        TalkFeature::FederationV1
    );
}

#[test]
fn test_feature_set_is_transparent() {
    let set: FeatureSet = serde_json::from_str(r#"["avatar", "chat-v2"]"#).unwrap();
    assert!(set.supports(TalkFeature::Avatar));
    assert!(set.contains("chat-v2"));
}

#[test]
fn test_avatar_color_rejects_invalid_json() {
    assert!(serde_json::from_str::<AvatarColor>(r#""12345G""#).is_err());
    let color: AvatarColor = serde_json::from_str(r#""abcdef""#).unwrap();
    assert_eq!(serde_json::to_string(&color).unwrap(), r#""ABCDEF""#);
}
