//! Talk conversation avatars.
//!
//! Every operation requires the server to advertise the `avatar` Talk
//! feature; federated avatars also require `federation-v1`. The check runs
//! before any avatar request is sent.

use serde_json::{json, Value};
use tracing::{debug, instrument};

use nextcloud_core::{AvatarColor, AvatarSize, NextcloudError, TalkFeature};
use nextcloud_fetch::{
    require_talk_features, CapabilityLookup, FetchError, Method, NextcloudClient, Payload,
};

/// Talk API version used unless configured otherwise.
pub const DEFAULT_API_VERSION: u8 = 1;

/// Operations on the avatar of a Talk conversation.
#[derive(Clone, Copy)]
pub struct ConversationAvatars<'a> {
    client: &'a NextcloudClient,
    capabilities: &'a dyn CapabilityLookup,
    api_version: u8,
}

impl<'a> ConversationAvatars<'a> {
    /// Uses the client's own capabilities for feature checks.
    pub fn new(client: &'a NextcloudClient) -> Self {
        Self {
            client,
            capabilities: client,
            api_version: DEFAULT_API_VERSION,
        }
    }

    /// Uses a different capability source for feature checks.
    pub fn with_capabilities(mut self, capabilities: &'a dyn CapabilityLookup) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Targets a different Talk API version.
    pub fn with_api_version(mut self, api_version: u8) -> Self {
        self.api_version = api_version;
        self
    }

    fn path(&self, route: &str) -> String {
        format!("/ocs/v2.php/apps/spreed/api/v{}{route}", self.api_version)
    }

    async fn require(&self, features: &[TalkFeature]) -> Result<(), FetchError> {
        require_talk_features(self.capabilities, features).await
    }

    /// Uploads an image as the conversation avatar. Returns the updated room.
    ///
    /// # Errors
    ///
    /// `NotCapable` without the `avatar` feature, or request errors.
    #[instrument(skip(self, image), fields(bytes = image.len()))]
    pub async fn set_image(
        &self,
        room_token: &str,
        image: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<Value, FetchError> {
        check_token(room_token)?;
        self.require(&[TalkFeature::Avatar]).await?;

        let payload = Payload::File {
            field: "file".to_string(),
            file_name: "avatar".to_string(),
            content_type: content_type.map(str::to_string),
            bytes: image,
        };
        let room = self
            .client
            .ocs_payload(Method::POST, &self.path(&format!("/room/{room_token}/avatar")), payload)
            .await?;
        debug!("Avatar image set");
        Ok(room)
    }

    /// Sets an emoji avatar, optionally on a colored background.
    ///
    /// Without a color the server picks its default background.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an empty emoji, `NotCapable` without the
    /// `avatar` feature, or request errors.
    #[instrument(skip(self))]
    pub async fn set_emoji(
        &self,
        room_token: &str,
        emoji: &str,
        color: Option<&AvatarColor>,
    ) -> Result<Value, FetchError> {
        check_token(room_token)?;
        if emoji.trim().is_empty() {
            return Err(NextcloudError::InvalidArgument("emoji must not be empty".into()).into());
        }
        self.require(&[TalkFeature::Avatar]).await?;

        let mut params = json!({ "emoji": emoji });
        if let Some(color) = color {
            params["color"] = Value::from(color.as_str());
        }

        let room = self
            .client
            .ocs(Method::POST, &self.path(&format!("/room/{room_token}/avatar/emoji")), params)
            .await?;
        debug!("Emoji avatar set");
        Ok(room)
    }

    /// Removes the custom avatar. Returns the updated room.
    ///
    /// # Errors
    ///
    /// `NotCapable` without the `avatar` feature, or request errors.
    #[instrument(skip(self))]
    pub async fn delete(&self, room_token: &str) -> Result<Value, FetchError> {
        check_token(room_token)?;
        self.require(&[TalkFeature::Avatar]).await?;

        self.client
            .ocs(Method::DELETE, &self.path(&format!("/room/{room_token}/avatar")), Value::Null)
            .await
    }

    /// Downloads the conversation avatar image.
    ///
    /// # Errors
    ///
    /// `NotCapable` without the `avatar` feature, or request errors.
    #[instrument(skip(self))]
    pub async fn get(&self, room_token: &str, dark_mode: bool) -> Result<Vec<u8>, FetchError> {
        check_token(room_token)?;
        self.require(&[TalkFeature::Avatar]).await?;

        let mut route = format!("/room/{room_token}/avatar");
        if dark_mode {
            route.push_str("/dark");
        }
        self.client.ocs_bytes(&self.path(&route), Value::Null).await
    }

    /// Downloads the avatar of a federated user through the room's proxy.
    ///
    /// # Errors
    ///
    /// `NotCapable` without both `avatar` and `federation-v1`, or request
    /// errors.
    #[instrument(skip(self))]
    pub async fn get_federated(
        &self,
        room_token: &str,
        cloud_id: &str,
        size: AvatarSize,
        dark_mode: bool,
    ) -> Result<Vec<u8>, FetchError> {
        check_token(room_token)?;
        if cloud_id.trim().is_empty() {
            return Err(NextcloudError::InvalidArgument("cloud ID must not be empty".into()).into());
        }
        self.require(&[TalkFeature::Avatar, TalkFeature::FederationV1])
            .await?;

        let mut route = format!("/proxy/{room_token}/user-avatar/{size}");
        if dark_mode {
            route.push_str("/dark");
        }
        self.client
            .ocs_bytes(&self.path(&route), json!({ "cloudId": cloud_id }))
            .await
    }
}

impl std::fmt::Debug for ConversationAvatars<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationAvatars")
            .field("endpoint", &self.client.endpoint())
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

/// Room tokens are path segments; reject anything that would change the route.
fn check_token(room_token: &str) -> Result<(), FetchError> {
    if room_token.is_empty() || !room_token.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(NextcloudError::InvalidArgument(format!(
            "invalid conversation token: {room_token:?}"
        ))
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_token() {
        assert!(check_token("abc123xy").is_ok());
        assert!(check_token("").is_err());
        assert!(check_token("abc/../x").is_err());
        assert!(check_token("a b").is_err());
    }
}
