//! Login command - browser login via login flow v2.

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use nextcloud_api::{LoginFlow, LoginFlowError};
use nextcloud_core::LoginPoll;
use nextcloud_fetch::CancellationToken;
use nextcloud_store::SettingsStore;
use tracing::{debug, info};

use super::{client, print, Auth};
use crate::{Cli, OutputFormat};

/// Arguments for the login command.
#[derive(Args, Default)]
pub struct LoginArgs {
    /// Seconds to wait for confirmation. Defaults to `login_timeout_secs`.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Seconds between polls. Defaults to `poll_interval_secs`.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Name for the app password the server creates.
    #[arg(long)]
    pub app_name: Option<String>,

    /// Keep waiting on an earlier login instead of starting a new one.
    #[arg(long)]
    pub token: Option<String>,

    /// Do not remember the server and login name.
    #[arg(long)]
    pub no_save: bool,
}

/// Runs the login command.
pub async fn run(args: &LoginArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let client = client(cli, store, Auth::None).await?;
    let flow = LoginFlow::new(&client);

    let poll = match &args.token {
        Some(token) => LoginPoll::for_server(client.endpoint(), token.clone()),
        None => {
            let start = flow.initiate(args.app_name.as_deref()).await?;
            // Keep stdout machine-readable in JSON mode.
            match cli.format {
                OutputFormat::Text => println!(
                    "{}",
                    crate::output::TextFormatter::new(!cli.no_color)
                        .format_login_prompt(&start.login)
                ),
                OutputFormat::Json => eprintln!("Open {} to log in", start.login),
            }
            start.poll
        }
    };

    let timeout = args
        .timeout
        .map_or(client.settings().login_timeout, Duration::from_secs);
    let interval = args
        .interval
        .map_or(client.settings().poll_interval, Duration::from_secs);

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Ctrl-C received");
                cancel.cancel();
            }
        }
    });

    let result = flow
        .wait_for_confirmation_until_cancelled(&poll, timeout, interval, &cancel)
        .await;
    ctrl_c.abort();

    let credentials = match result {
        Ok(credentials) => credentials,
        Err(err @ LoginFlowError::Timeout { .. }) => {
            if !cli.quiet {
                eprintln!("Resume with: ncctl login --token {}", poll.token);
            }
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    if !args.no_save {
        store
            .record_login(&credentials.server, &credentials.login_name, Utc::now())
            .await;
        store.save().await?;
        info!(path = %store.path().display(), "Login remembered");
    }

    print(cli, &credentials, |text| text.format_credentials(&credentials))
}

/// Runs the logout command.
pub async fn logout(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let client = client(cli, store, Auth::Required).await?;
    LoginFlow::new(&client).destroy_app_password().await?;

    store.clear_login().await;
    store.save().await?;

    print(cli, &serde_json::json!({ "revoked": true }), |text| {
        text.success("App password revoked")
    })
}
