//! Capability and feature-flag types.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Talk Feature
// ============================================================================

/// Talk (spreed) features that gate operations in this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TalkFeature {
    /// Conversation avatars.
    #[serde(rename = "avatar")]
    Avatar,
    /// Federation, first revision.
    #[serde(rename = "federation-v1")]
    FederationV1,
}

impl TalkFeature {
    /// Returns the identifier the server advertises for this feature.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::FederationV1 => "federation-v1",
        }
    }
}

impl fmt::Display for TalkFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Feature Set
// ============================================================================

/// Feature identifiers advertised by a server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(HashSet<String>);

impl FeatureSet {
    /// Creates an empty feature set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the Talk feature is advertised.
    pub fn supports(&self, feature: TalkFeature) -> bool {
        self.0.contains(feature.as_str())
    }

    /// Returns true if the raw identifier is advertised.
    pub fn contains(&self, identifier: &str) -> bool {
        self.0.contains(identifier)
    }

    /// Number of advertised identifiers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if nothing is advertised.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over identifiers in sorted order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut items: Vec<&str> = self.0.iter().map(String::as_str).collect();
        items.sort_unstable();
        items
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for FeatureSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}
