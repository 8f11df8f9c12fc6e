//! CLI command implementations.

pub mod avatar;
pub mod capabilities;
pub mod config;
pub mod login;
pub mod wipe;

use anyhow::{bail, Result};
use nextcloud_fetch::NextcloudClient;
use nextcloud_store::{Settings, SettingsStore};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Whether a command needs credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// Anonymous requests only.
    None,
    /// Basic auth with user and password.
    Required,
}

/// Server and credentials resolved from flags, environment and settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub server: String,
    pub credentials: Option<(String, String)>,
}

/// Flags and environment win over saved settings.
pub fn resolve_connection(cli: &Cli, settings: &Settings, auth: Auth) -> Result<Connection> {
    let Some(server) = cli.server.clone().or_else(|| settings.server.clone()) else {
        bail!("No server configured. Pass --server or run `ncctl config set server <URL>`");
    };

    let user = cli.user.clone().or_else(|| settings.username.clone());
    let credentials = match (user, cli.password.clone()) {
        (Some(user), Some(password)) => Some((user, password)),
        (None, _) if auth == Auth::Required => {
            bail!("No user configured. Pass --user or set NEXTCLOUD_USER")
        }
        (Some(_), None) if auth == Auth::Required => {
            bail!("No password given. Pass --password or set NEXTCLOUD_PASSWORD")
        }
        _ => None,
    };

    Ok(Connection {
        server,
        credentials,
    })
}

/// Builds a client from the resolved connection and saved timing settings.
pub async fn client(cli: &Cli, store: &SettingsStore, auth: Auth) -> Result<NextcloudClient> {
    let settings = store.get().await;
    let connection = resolve_connection(cli, &settings, auth)?;

    let mut builder = NextcloudClient::builder(connection.server)
        .login_timeout(settings.login_timeout())
        .poll_interval(settings.poll_interval());
    if let Some(user_agent) = settings.user_agent {
        builder = builder.user_agent(user_agent);
    }
    if let Some((user, password)) = connection.credentials {
        builder = builder.credentials(user, password);
    }
    Ok(builder.build()?)
}

/// Prints a serializable value as JSON, or its text form.
pub fn print<T: serde::Serialize>(
    cli: &Cli,
    value: &T,
    text: impl FnOnce(&TextFormatter) -> String,
) -> Result<()> {
    match cli.format {
        OutputFormat::Text => println!("{}", text(&TextFormatter::new(!cli.no_color))),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(value)?),
    }
    Ok(())
}
