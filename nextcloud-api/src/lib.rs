// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Nextcloud API
//!
//! Endpoint modules built on [`nextcloud_fetch::NextcloudClient`].
//!
//! | Module | Endpoints | Capability |
//! |--------|-----------|------------|
//! | [`loginflow`] | `/index.php/login/v2`, poll, `/ocs/v2.php/core/apppassword` | none |
//! | [`talk`] | conversation avatars | `avatar`, `federation-v1` |
//! | [`wipe`] | `/index.php/core/wipe/*` | none |
//!
//! ## Usage
//!
//! ```ignore
//! use nextcloud_api::talk::ConversationAvatars;
//!
//! let avatars = ConversationAvatars::new(&client);
//! let png = avatars.get("abc123", false).await?;
//! ```

pub mod loginflow;
pub mod talk;
pub mod wipe;

pub use loginflow::{LoginFlow, LoginFlowError};
pub use talk::ConversationAvatars;
pub use wipe::RemoteWipe;
