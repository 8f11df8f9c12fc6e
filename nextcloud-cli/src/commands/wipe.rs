//! Wipe command - remote wipe status.

use anyhow::Result;
use clap::{Args, Subcommand};
use nextcloud_api::RemoteWipe;
use nextcloud_store::SettingsStore;

use super::{client, print, Auth};
use crate::Cli;

/// Arguments for the wipe command.
#[derive(Args)]
pub struct WipeArgs {
    #[command(subcommand)]
    pub action: WipeAction,
}

/// Wipe subcommands.
#[derive(Subcommand)]
pub enum WipeAction {
    /// Ask whether this app password is flagged for wiping.
    Check,

    /// Confirm that local data was wiped. The server then revokes the app
    /// password.
    Notify,
}

/// Runs the wipe command.
pub async fn run(args: &WipeArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let client = client(cli, store, Auth::Required).await?;
    let wipe = RemoteWipe::new(&client);

    match args.action {
        WipeAction::Check => {
            let flagged = wipe.check().await?;
            print(cli, &serde_json::json!({ "wipe": flagged }), |text| {
                if flagged {
                    text.warning("Remote wipe requested for this device")
                } else {
                    text.success("No remote wipe requested")
                }
            })
        }
        WipeAction::Notify => {
            wipe.notify_wiped().await?;
            store.clear_login().await;
            store.save().await?;
            print(cli, &serde_json::json!({ "wiped": true }), |text| {
                text.success("Wipe confirmed")
            })
        }
    }
}
