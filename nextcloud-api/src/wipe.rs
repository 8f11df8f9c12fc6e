//! Remote wipe.
//!
//! A user can flag a device for wiping in their security settings. Clients
//! authenticated with an app password ask the server whether to wipe, delete
//! their local data if so, and then confirm.
//!
//! Both calls authenticate with the app password as a form token, not with
//! basic auth.

use serde::Deserialize;
use tracing::{info, instrument, warn};

use nextcloud_core::NextcloudError;
use nextcloud_fetch::{ApiRequest, FetchError, NextcloudClient};

const CHECK_PATH: &str = "/index.php/core/wipe/check";
const SUCCESS_PATH: &str = "/index.php/core/wipe/success";

#[derive(Debug, Deserialize)]
struct WipeStatus {
    #[serde(default)]
    wipe: bool,
}

/// Remote wipe client.
#[derive(Debug, Clone, Copy)]
pub struct RemoteWipe<'a> {
    client: &'a NextcloudClient,
}

impl<'a> RemoteWipe<'a> {
    /// Creates a remote wipe client.
    pub fn new(client: &'a NextcloudClient) -> Self {
        Self { client }
    }

    fn app_password(&self) -> Result<&'a str, FetchError> {
        self.client
            .credentials()
            .map(|creds| creds.password.as_str())
            .ok_or_else(|| FetchError::InvalidConfig("remote wipe requires an app password".into()))
    }

    /// Returns true if this device has been flagged for wiping.
    ///
    /// A 404 means the app password is unknown or not flagged, and yields
    /// `false`.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` without credentials, request errors, or
    /// `InvalidResponse` if the body is not JSON.
    #[instrument(skip(self))]
    pub async fn check(&self) -> Result<bool, FetchError> {
        let request =
            ApiRequest::post(self.client.url(CHECK_PATH)).form([("token", self.app_password()?)]);

        let response = self.client.send(&request).await?;
        if response.status == 404 {
            return Ok(false);
        }
        nextcloud_fetch::ocs::check_status(&response)?;

        let status: WipeStatus = response
            .json()
            .map_err(|e| NextcloudError::InvalidResponse(e.to_string()))?;

        if status.wipe {
            warn!("Device flagged for remote wipe");
        }
        Ok(status.wipe)
    }

    /// Tells the server that local data has been wiped. The app password is
    /// revoked by the server afterwards.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` without credentials, or request errors.
    #[instrument(skip(self))]
    pub async fn notify_wiped(&self) -> Result<(), FetchError> {
        let request =
            ApiRequest::post(self.client.url(SUCCESS_PATH)).form([("token", self.app_password()?)]);

        self.client.send_checked(&request).await?;
        info!("Remote wipe confirmed");
        Ok(())
    }
}
