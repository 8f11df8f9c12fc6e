//! Server capabilities and the feature guard.
//!
//! Capabilities are fetched once per client from
//! `/ocs/v1.php/cloud/capabilities` and cached. Operations that depend on an
//! optional server feature call [`require_talk_features`] before sending
//! anything.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use nextcloud_core::{FeatureSet, NextcloudError, TalkFeature};

use crate::client::NextcloudClient;
use crate::error::FetchError;
use crate::transport::Method;

/// OCS route of the capabilities document.
pub const CAPABILITIES_PATH: &str = "/ocs/v1.php/cloud/capabilities";

// ============================================================================
// Capability Lookup
// ============================================================================

/// Source of the Talk features a server advertises.
#[async_trait]
pub trait CapabilityLookup: Send + Sync {
    /// Returns the advertised Talk features.
    async fn talk_features(&self) -> Result<FeatureSet, FetchError>;
}

/// A fixed feature set, for callers that already know what the server supports.
#[async_trait]
impl CapabilityLookup for FeatureSet {
    async fn talk_features(&self) -> Result<FeatureSet, FetchError> {
        Ok(self.clone())
    }
}

/// Fails with [`NextcloudError::NotCapable`] naming the first missing feature.
///
/// # Errors
///
/// Lookup errors, or `NotCapable` if a feature is missing.
pub async fn require_talk_features(
    lookup: &dyn CapabilityLookup,
    required: &[TalkFeature],
) -> Result<(), FetchError> {
    let available = lookup.talk_features().await?;
    if let Some(missing) = required.iter().find(|f| !available.supports(**f)) {
        debug!(feature = %missing, "Required Talk feature missing");
        return Err(NextcloudError::NotCapable(missing.to_string()).into());
    }
    Ok(())
}

/// Walks a dotted path (`"spreed.config.chat"`) through a capabilities tree.
///
/// An empty path returns the root.
///
/// # Errors
///
/// [`NextcloudError::NotFound`] naming the first segment that does not resolve.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Result<&'a Value, NextcloudError> {
    if path.is_empty() {
        return Ok(root);
    }

    path.split('.').try_fold(root, |node, segment| {
        node.get(segment)
            .ok_or_else(|| NextcloudError::NotFound(format!("Capability not found: {segment}")))
    })
}

/// Union of `spreed.features` and `spreed.features-local`.
pub fn talk_features_from(capabilities: &Value) -> FeatureSet {
    let mut features = FeatureSet::new();
    for key in ["features", "features-local"] {
        if let Some(items) = capabilities
            .get("spreed")
            .and_then(|spreed| spreed.get(key))
            .and_then(Value::as_array)
        {
            features.extend(items.iter().filter_map(Value::as_str));
        }
    }
    features
}

// ============================================================================
// Client Integration
// ============================================================================

impl NextcloudClient {
    /// Returns the capabilities tree, fetching it on first use.
    ///
    /// # Errors
    ///
    /// Request errors, or [`NextcloudError::InvalidResponse`] if the document
    /// has no `capabilities` object. Failures are not cached.
    pub async fn capabilities(&self) -> Result<&Value, FetchError> {
        self.capabilities
            .get_or_try_init(|| async {
                let data = self.ocs(Method::GET, CAPABILITIES_PATH, Value::Null).await?;
                let capabilities = match data {
                    Value::Object(mut map) => map.remove("capabilities"),
                    _ => None,
                };
                capabilities.ok_or_else(|| {
                    FetchError::from(NextcloudError::InvalidResponse(
                        "missing capabilities object".into(),
                    ))
                })
            })
            .await
    }

    /// Returns the capability at a dotted path.
    ///
    /// # Errors
    ///
    /// As [`capabilities`](Self::capabilities), or `NotFound` for a missing path.
    pub async fn capability(&self, path: &str) -> Result<Value, FetchError> {
        let root = self.capabilities().await?;
        Ok(lookup_path(root, path)?.clone())
    }

    /// Returns true if the dotted path exists.
    ///
    /// # Errors
    ///
    /// As [`capabilities`](Self::capabilities).
    pub async fn has_capability(&self, path: &str) -> Result<bool, FetchError> {
        let root = self.capabilities().await?;
        Ok(lookup_path(root, path).is_ok())
    }
}

#[async_trait]
impl CapabilityLookup for NextcloudClient {
    async fn talk_features(&self) -> Result<FeatureSet, FetchError> {
        Ok(talk_features_from(self.capabilities().await?))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::host::scripted::ScriptedRequester;

    fn capabilities_body() -> Value {
        json!({"ocs": {
            "meta": {"status": "ok", "statuscode": 100, "message": "OK"},
            "data": {
                "version": {"major": 28},
                "capabilities": {
                    "core": {"pollinterval": 60},
                    "spreed": {
                        "features": ["audio", "avatar"],
                        "features-local": ["federation-v1"],
                        "config": {"chat": {"max-length": 32000}}
                    }
                }
            }
        }})
    }

    #[test]
    fn test_lookup_path() {
        let root = json!({"spreed": {"config": {"chat": {"max-length": 32000}}}});
        assert_eq!(
            lookup_path(&root, "spreed.config.chat.max-length").unwrap(),
            &json!(32000)
        );
        assert_eq!(lookup_path(&root, "").unwrap(), &root);

        match lookup_path(&root, "spreed.nope.chat").unwrap_err() {
            NextcloudError::NotFound(reason) => assert!(reason.ends_with("nope")),
            other => panic!("unexpected error: {other:?}"),
        }
        // Descending into a scalar fails too
        assert!(lookup_path(&root, "spreed.config.chat.max-length.x").is_err());
    }

    #[test]
    fn test_talk_features_union() {
        let caps = json!({"spreed": {"features": ["avatar"], "features-local": ["federation-v1"]}});
        let features = talk_features_from(&caps);
        assert!(features.supports(TalkFeature::Avatar));
        assert!(features.supports(TalkFeature::FederationV1));
        assert!(talk_features_from(&json!({})).is_empty());
    }

    #[tokio::test]
    async fn test_require_talk_features() {
        let features: FeatureSet = ["avatar"].into_iter().collect();
        assert!(require_talk_features(&features, &[TalkFeature::Avatar]).await.is_ok());

        let err = require_talk_features(&features, &[TalkFeature::Avatar, TalkFeature::FederationV1])
            .await
            .unwrap_err();
        assert!(err.is_not_capable());
        assert!(err.to_string().contains("federation-v1"));
    }

    #[tokio::test]
    async fn test_capabilities_fetched_once() {
        let requester = Arc::new(ScriptedRequester::new().then_json(200, &capabilities_body()));
        let client = NextcloudClient::builder("https://cloud.example.com")
            .requester(requester.clone())
            .build()
            .unwrap();

        assert_eq!(client.capability("core.pollinterval").await.unwrap(), json!(60));
        assert!(client.has_capability("spreed.config.chat").await.unwrap());
        assert!(!client.has_capability("files_sharing").await.unwrap());
        let features = client.talk_features().await.unwrap();
        assert_eq!(features.sorted(), vec!["audio", "avatar", "federation-v1"]);

        assert_eq!(requester.call_count(), 1);
        assert!(requester.calls()[0].url.ends_with(CAPABILITIES_PATH));
    }

    #[tokio::test]
    async fn test_capabilities_failure_not_cached() {
        let requester = Arc::new(
            ScriptedRequester::new()
                .then_status(503)
                .then_json(200, &capabilities_body()),
        );
        let client = NextcloudClient::builder("https://cloud.example.com")
            .requester(requester.clone())
            .build()
            .unwrap();

        assert!(client.capabilities().await.is_err());
        assert!(client.capabilities().await.is_ok());
        assert_eq!(requester.call_count(), 2);
    }
}
