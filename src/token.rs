//! Token source contract and the app-level access-token implementation.
//!
//! A [`TokenSource`] hands out the shared [`Credential`] every API call carries. Callers share one
//! source (usually behind `Arc<dyn TokenSource>`); the source coordinates refreshes so that
//! concurrent callers observing the same stale value trigger a single remote issuance.

pub mod access;
pub mod metrics;

pub use access::*;
pub use metrics::RefreshMetrics;

// self
use crate::{_prelude::*, auth::Credential};

/// Boxed future returned by [`TokenSource`] methods.
pub type TokenFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Provider of the shared app credential.
pub trait TokenSource
where
	Self: Send + Sync,
{
	/// Returns the cached credential while it is within its buffered validity window, or
	/// refreshes (single-flight) and returns the new one.
	fn current(&self) -> TokenFuture<'_, Credential>;

	/// Replaces the credential whose value is `stale`.
	///
	/// When another caller already replaced `stale` with a credential that is still valid, that
	/// credential is returned without contacting the issuer.
	fn force_refresh<'a>(&'a self, stale: &'a str) -> TokenFuture<'a, Credential>;
}
