//! Transport implementations.
//!
//! - [`http`] - reqwest-backed requester with tracing and domain allowlist
//! - `scripted` - replayed responses for tests (feature `mock`)

pub mod http;
#[cfg(any(test, feature = "mock"))]
pub mod scripted;

pub use http::HttpRequester;
#[cfg(any(test, feature = "mock"))]
pub use scripted::{ScriptedReply, ScriptedRequester};
