//! Endpoint wrappers built on the executor.
//!
//! Each wrapper is a plain [`Operation`](crate::client::Operation) value plus a convenience method
//! on [`Client`](crate::client::Client); the credential handling and the retry protocol live
//! entirely in the executor.

pub mod merchant;
pub mod message;
pub mod pay;

pub use merchant::*;
pub use message::*;
pub use pay::*;

// self
use crate::error::ConfigError;

fn require(condition: bool, reason: &str) -> Result<(), ConfigError> {
	if condition { Ok(()) } else { Err(ConfigError::invalid_input(reason)) }
}
