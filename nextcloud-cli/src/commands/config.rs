//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use nextcloud_store::{default_config_dir, Settings, SettingsStore};
use tracing::info;

use super::print;
use crate::Cli;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Set a value. An empty value clears optional keys.
    Set {
        /// One of the keys listed by `ncctl config keys`.
        key: String,
        /// New value.
        value: String,
    },

    /// List settable keys.
    Keys,

    /// Reset to defaults.
    Reset,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    match &args.action {
        ConfigAction::Show => {
            let settings = store.get().await;
            print(cli, &settings, |text| text.format_settings(&settings))
        }
        ConfigAction::Path => {
            let paths = serde_json::json!({
                "config_dir": default_config_dir().display().to_string(),
                "settings_file": store.path().display().to_string(),
            });
            print(cli, &paths, |text| {
                [
                    text.heading("Configuration Paths"),
                    String::new(),
                    text.field("Config dir", &default_config_dir().display().to_string()),
                    text.field("Settings file", &store.path().display().to_string()),
                ]
                .join("\n")
            })
        }
        ConfigAction::Set { key, value } => {
            store.set_value(key, value).await?;
            store.save().await?;
            info!(key = %key, "Setting updated");
            print(cli, &serde_json::json!({ "key": key, "value": value }), |text| {
                text.success(&format!("{key} updated"))
            })
        }
        ConfigAction::Keys => print(cli, &Settings::KEYS, |_| Settings::KEYS.join("\n")),
        ConfigAction::Reset => {
            store.reset().await;
            store.save().await?;
            info!(path = %store.path().display(), "Settings reset");
            print(cli, &serde_json::json!({ "reset": true }), |text| {
                text.success("Configuration reset to defaults")
            })
        }
    }
}
