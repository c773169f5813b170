//! Credential values: the shared app-level access token and per-user OAuth tokens.

pub mod credential;
pub mod secret;
pub mod user;
