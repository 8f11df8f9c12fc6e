//! Independent confirmation sessions sharing one poller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;

use nextcloud_fetch::{
    ApiRequest, ApiResponse, PollError, PollRequest, PollingConfirmation, Requester,
    TransportError,
};

/// Confirms each token after a per-token number of pending answers.
struct PerTokenServer {
    remaining: Mutex<HashMap<String, u32>>,
}

impl PerTokenServer {
    fn new(pending: &[(&str, u32)]) -> Self {
        Self {
            remaining: Mutex::new(
                pending
                    .iter()
                    .map(|(token, n)| ((*token).to_string(), *n))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl Requester for PerTokenServer {
    async fn call(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        tokio::time::sleep(Duration::from_millis(50)).await;

        let token = request.form_value("token").unwrap_or_default().to_string();
        let mut remaining = self.remaining.lock().unwrap();
        let Some(left) = remaining.get_mut(&token) else {
            return Ok(ApiResponse::new(400, "unknown token"));
        };

        if *left == 0 {
            let body = serde_json::json!({ "loginName": token });
            Ok(ApiResponse::json_body(200, &body))
        } else {
            *left -= 1;
            Ok(ApiResponse::empty(404))
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Confirmed {
    login_name: String,
}

fn request_for(token: &str) -> PollRequest {
    PollRequest::new(
        token,
        ApiRequest::post("https://cloud.example.com/login/v2/poll").form([("token", token)]),
    )
}

#[tokio::test(start_paused = true)]
async fn test_sessions_do_not_share_state() {
    let server = Arc::new(PerTokenServer::new(&[("alice", 0), ("bob", 2), ("carol", 100)]));
    let poller = PollingConfirmation::new(server);

    let tokens = ["alice", "bob", "carol", "mallory"];
    let requests: Vec<PollRequest> = tokens.iter().map(|t| request_for(t)).collect();
    let sessions = requests.iter().map(|request| {
        poller.wait_for_confirmation::<Confirmed>(
            request,
            Duration::from_secs(5),
            Duration::from_secs(1),
        )
    });

    let results = join_all(sessions).await;

    assert_eq!(results[0].as_ref().unwrap().login_name, "alice");
    assert_eq!(results[1].as_ref().unwrap().login_name, "bob");
    assert!(matches!(results[2], Err(PollError::Timeout { .. })));
    assert!(matches!(
        results[3],
        Err(PollError::UnexpectedStatus { status: 400, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_spawned_sessions() {
    let server = Arc::new(PerTokenServer::new(&[("dave", 1), ("erin", 3)]));
    let poller = PollingConfirmation::new(server);

    let handles: Vec<_> = ["dave", "erin"]
        .into_iter()
        .map(|token| {
            let poller = poller.clone();
            tokio::spawn(async move {
                poller
                    .wait_for_confirmation::<Confirmed>(
                        &request_for(token),
                        Duration::from_secs(30),
                        Duration::from_secs(1),
                    )
                    .await
            })
        })
        .collect();

    for (handle, token) in join_all(handles).await.into_iter().zip(["dave", "erin"]) {
        assert_eq!(handle.unwrap().unwrap().login_name, token);
    }
}
