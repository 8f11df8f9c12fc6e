//! Nextcloud Talk (spreed) endpoints.
//!
//! ## API Endpoints
//!
//! Relative to `/ocs/v2.php/apps/spreed/api/v1`:
//!
//! - `POST /room/{token}/avatar` - Upload an avatar image
//! - `POST /room/{token}/avatar/emoji` - Set an emoji avatar
//! - `DELETE /room/{token}/avatar` - Remove the avatar
//! - `GET /room/{token}/avatar[/dark]` - Download the avatar
//! - `GET /proxy/{token}/user-avatar/{size}[/dark]` - Federated user avatar

mod avatars;

pub use avatars::{ConversationAvatars, DEFAULT_API_VERSION};
