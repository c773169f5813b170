//! Per-user OAuth: authorization URLs, code exchange, token refresh, and profile lookup.
//!
//! An [`OAuth2Session`] owns one user's [`OAuth2Token`](crate::auth::OAuth2Token) and keeps it
//! current in place. Sessions are not shared between tasks; all mutating calls take `&mut self`.

pub mod authorize;
pub mod session;
pub mod user;

pub use authorize::*;
pub use session::*;
pub use user::*;
