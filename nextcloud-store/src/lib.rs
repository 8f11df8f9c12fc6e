// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Nextcloud Store
//!
//! Settings persistence for the `ncctl` command-line client.
//!
//! - **SettingsStore**: Server, user and timing preferences
//! - **Persistence**: Owner-only JSON files with atomic writes
//!
//! Credentials are never written by this crate.
//!
//! ## Usage
//!
//! ```ignore
//! use nextcloud_store::SettingsStore;
//!
//! let store = SettingsStore::load_default().await;
//! store.set_value("server", "https://cloud.example.com").await?;
//! store.save().await?;
//! ```

pub mod error;
pub mod persistence;
pub mod settings_store;

pub use error::StoreError;
pub use persistence::{default_config_dir, default_settings_path, load_json, save_json};
pub use settings_store::{LogLevel, Settings, SettingsStore};
