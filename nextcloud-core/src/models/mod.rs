//! Domain models for the Nextcloud client.
//!
//! ## Submodules
//!
//! - [`login`] - Login flow v2 types (start, poll target, credentials)
//! - [`capabilities`] - Talk features and advertised feature sets
//! - [`avatar`] - Conversation avatar parameters

mod avatar;
mod capabilities;
mod login;

// Re-export everything at the models level
pub use avatar::{AvatarColor, AvatarSize};
pub use capabilities::{FeatureSet, TalkFeature};
pub use login::{LoginCredentials, LoginFlowStart, LoginPoll};
#[cfg(test)]
mod serde_tests;
