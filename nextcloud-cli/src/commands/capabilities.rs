//! Capabilities command - query server capabilities.

use anyhow::Result;
use clap::Args;
use nextcloud_fetch::CapabilityLookup;
use nextcloud_store::SettingsStore;

use super::{client, print, Auth};
use crate::Cli;

/// Arguments for the capabilities command.
#[derive(Args)]
pub struct CapabilitiesArgs {
    /// Dotted path into the capabilities, e.g. `spreed.features`.
    pub path: Option<String>,

    /// Only report whether the path exists.
    #[arg(long, requires = "path")]
    pub check: bool,

    /// List Talk features (`spreed.features` and `spreed.features-local`).
    #[arg(long, conflicts_with = "path")]
    pub talk: bool,
}

/// Runs the capabilities command.
pub async fn run(args: &CapabilitiesArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let client = client(cli, store, Auth::Required).await?;

    if args.talk {
        let features = client.talk_features().await?;
        let sorted = features.sorted();
        return print(cli, &sorted, |text| {
            text.format_value(&serde_json::json!(sorted))
        });
    }

    match (&args.path, args.check) {
        (Some(path), true) => {
            let present = client.has_capability(path).await?;
            print(cli, &serde_json::json!({ "path": path, "present": present }), |text| {
                if present {
                    text.success(path)
                } else {
                    text.failure(path)
                }
            })
        }
        (Some(path), false) => {
            let value = client.capability(path).await?;
            print(cli, &value, |text| text.format_value(&value))
        }
        (None, _) => {
            let value = client.capabilities().await?;
            print(cli, value, |text| text.format_value(value))
        }
    }
}
