// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Nextcloud Core
//!
//! Core types, models, and errors shared by the Nextcloud client crates.
//!
//! This crate has no networking of its own. It provides:
//!
//! - The server-side error taxonomy ([`NextcloudError`]) and the mapping
//!   from HTTP status codes onto it
//! - Domain models for the login flow, capabilities and Talk avatars
//!
//! ## Key Types
//!
//! ### Login Flow
//! - [`LoginFlowStart`] - Response of the login flow initiation
//! - [`LoginPoll`] - Token and endpoint used to poll for confirmation
//! - [`LoginCredentials`] - App password issued once the user confirms
//!
//! ### Capabilities
//! - [`TalkFeature`] - Talk features this client gates operations on
//! - [`FeatureSet`] - Set of feature identifiers advertised by a server
//!
//! ### Avatars
//! - [`AvatarSize`] - Supported federated avatar sizes
//! - [`AvatarColor`] - Validated hex color for emoji avatars

pub mod error;
pub mod models;

pub use error::NextcloudError;

pub use models::{
    // Avatars
    AvatarColor,
    AvatarSize,
    // Capabilities
    FeatureSet,
    TalkFeature,
    // Login flow
    LoginCredentials,
    LoginFlowStart,
    LoginPoll,
};
