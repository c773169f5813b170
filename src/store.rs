//! Storage contracts and the built-in in-memory store for app credentials.
//!
//! Stores hold at most one [`Credential`] per [`AppId`]. Refreshes install new credentials with
//! [`CredentialStore::compare_and_swap`] keyed on the value the caller observed as stale, so a
//! slow refresher can never overwrite a newer credential installed by someone else.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AppId, Credential},
};

/// Boxed future returned by [`CredentialStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by credential stores.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the credential cached for `app_id`, if present.
	fn load<'a>(&'a self, app_id: &'a AppId) -> StoreFuture<'a, Option<Credential>>;

	/// Persists or replaces the credential for `app_id` unconditionally.
	fn save(&self, app_id: AppId, credential: Credential) -> StoreFuture<'_, ()>;

	/// Installs `replacement` only if the cached value still equals `expected`.
	///
	/// `expected = None` means "nothing cached yet".
	fn compare_and_swap<'a>(
		&'a self,
		app_id: &'a AppId,
		expected: Option<&'a str>,
		replacement: Credential,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;
}

/// Result of a credential compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The cached value matched the expectation and the replacement was installed.
	Updated,
	/// A credential is cached but its value differs from the expectation.
	Mismatch,
	/// Nothing is cached although a value was expected.
	Missing,
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn compare_and_swap_outcome_can_be_serialized() {
		let payload = serde_json::to_string(&CompareAndSwapOutcome::Mismatch)
			.expect("CompareAndSwapOutcome should serialize to JSON.");

		assert_eq!(payload, "\"Mismatch\"");
	}
}
