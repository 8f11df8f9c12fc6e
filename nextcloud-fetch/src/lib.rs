// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Nextcloud Fetch
//!
//! Transport, OCS handling and confirmation polling for the Nextcloud
//! client crates.
//!
//! ## Transport
//!
//! - [`transport::Requester`] - Trait for a single network call
//! - [`host::http::HttpRequester`] - reqwest implementation with tracing
//!   and a domain allowlist
//! - `host::scripted::ScriptedRequester` - replayed responses for tests
//!   (feature `mock`)
//!
//! ## Client
//!
//! - [`client::NextcloudClient`] - Endpoint, credentials and settings
//!   shared by every API module
//! - [`ocs`] - OCS request headers and envelope checks
//! - [`capabilities`] - Cached capabilities and the Talk feature guard
//!
//! ## Polling
//!
//! - [`poll::PollingConfirmation`] - Bounded wait for an out-of-band
//!   confirmation, with timeout and cancellation
//! - [`backoff::Backoff`] - Delay schedule between attempts
//!
//! ## Example
//!
//! ```ignore
//! use nextcloud_fetch::NextcloudClient;
//!
//! let client = NextcloudClient::builder("https://cloud.example.com")
//!     .credentials("alice", app_password)
//!     .build()?;
//!
//! let features = client.talk_features().await?;
//! ```

pub mod backoff;
pub mod capabilities;
pub mod client;
pub mod error;
pub mod host;
pub mod ocs;
pub mod poll;
pub mod transport;


// Errors
pub use error::{FetchError, PollError, TransportError};

// Transport
pub use host::http::{HttpRequester, DEFAULT_USER_AGENT};
#[cfg(any(test, feature = "mock"))]
pub use host::scripted::{ScriptedReply, ScriptedRequester};
pub use transport::{ApiRequest, ApiResponse, Method, Payload, Requester};

// Client
pub use capabilities::{require_talk_features, CapabilityLookup};
pub use client::{ClientSettings, Credentials, NextcloudClient, NextcloudClientBuilder};

// Polling
pub use backoff::Backoff;
pub use poll::{ConfirmationSession, PollOutcome, PollRequest, PollingConfirmation};

// Cancellation token used by the polling API
pub use tokio_util::sync::CancellationToken;
