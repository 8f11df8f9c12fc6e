//! Avatar command - Talk conversation avatars.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use nextcloud_api::ConversationAvatars;
use nextcloud_core::{AvatarColor, AvatarSize};
use nextcloud_store::SettingsStore;
use tracing::info;

use super::{client, print, Auth};
use crate::Cli;

/// Arguments for the avatar command.
#[derive(Args)]
pub struct AvatarArgs {
    #[command(subcommand)]
    pub action: AvatarAction,

    /// Talk API version. Defaults to `talk_api_version`.
    #[arg(long, global = true)]
    pub api_version: Option<u8>,
}

/// Avatar subcommands.
#[derive(Subcommand)]
pub enum AvatarAction {
    /// Download the conversation avatar.
    Get {
        /// Conversation token.
        room: String,
        /// Dark theme variant.
        #[arg(long)]
        dark: bool,
        /// Write the image here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Upload an image as the conversation avatar.
    Set {
        /// Conversation token.
        room: String,
        /// Image file.
        file: PathBuf,
        /// MIME type, e.g. `image/png`. Guessed from the extension if omitted.
        #[arg(long)]
        content_type: Option<String>,
    },

    /// Use an emoji as the conversation avatar.
    Emoji {
        /// Conversation token.
        room: String,
        /// Emoji to show.
        emoji: String,
        /// Background color as six hex digits.
        #[arg(long, short)]
        color: Option<String>,
    },

    /// Remove the custom avatar.
    Delete {
        /// Conversation token.
        room: String,
    },

    /// Download a federated user's avatar through the conversation.
    Federated {
        /// Conversation token.
        room: String,
        /// Cloud ID of the federated user.
        cloud_id: String,
        /// Size in pixels: 64 or 512.
        #[arg(long, default_value_t = 64)]
        size: u32,
        /// Dark theme variant.
        #[arg(long)]
        dark: bool,
        /// Write the image here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Runs the avatar command.
pub async fn run(args: &AvatarArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let client = client(cli, store, Auth::Required).await?;
    let api_version = match args.api_version {
        Some(version) => version,
        None => store.get().await.talk_api_version,
    };
    let avatars = ConversationAvatars::new(&client).with_api_version(api_version);

    match &args.action {
        AvatarAction::Get { room, dark, output } => {
            let image = avatars.get(room, *dark).await?;
            write_image(&image, output.as_deref()).await
        }
        AvatarAction::Set {
            room,
            file,
            content_type,
        } => {
            let image = tokio::fs::read(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let content_type = content_type
                .as_deref()
                .or_else(|| guess_content_type(file));
            let room = avatars.set_image(room, image, content_type).await?;
            print(cli, &room, |text| text.format_room(&room))
        }
        AvatarAction::Emoji { room, emoji, color } => {
            let color = color
                .as_deref()
                .map(str::parse::<AvatarColor>)
                .transpose()?;
            let room = avatars.set_emoji(room, emoji, color.as_ref()).await?;
            print(cli, &room, |text| text.format_room(&room))
        }
        AvatarAction::Delete { room } => {
            let room = avatars.delete(room).await?;
            print(cli, &room, |text| text.format_room(&room))
        }
        AvatarAction::Federated {
            room,
            cloud_id,
            size,
            dark,
            output,
        } => {
            let size = AvatarSize::try_from(*size)?;
            let image = avatars.get_federated(room, cloud_id, size, *dark).await?;
            write_image(&image, output.as_deref()).await
        }
    }
}

async fn write_image(image: &[u8], output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            tokio::fs::write(path, image)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = image.len(), "Avatar saved");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(image)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}
