//! Login flow v2.
//!
//! Obtains an app password without handling the user's real password: the
//! user approves the login in a browser while this client polls.
//!
//! ## Flow
//!
//! 1. **Initiate**: `POST /index.php/login/v2` returns a login URL and a poll
//!    token
//! 2. **Display**: Show the login URL to the user
//! 3. **Poll**: `POST` the token to the poll endpoint; 404 means "not yet"
//! 4. **Complete**: The server returns server URL, login name and app password
//!
//! ## Example
//!
//! ```ignore
//! use nextcloud_api::loginflow::LoginFlow;
//!
//! let flow = LoginFlow::new(&client);
//! let start = flow.initiate(None).await?;
//! println!("Open {} to approve this login", start.login);
//!
//! let credentials = flow
//!     .wait_for_confirmation(&start.poll, Duration::from_secs(60), Duration::from_secs(1))
//!     .await?;
//! ```

mod error;
mod flow;

pub use error::LoginFlowError;
pub use flow::LoginFlow;
