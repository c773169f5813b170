//! Thread-safe in-memory [`CredentialStore`] implementation.

// self
use crate::{
	_prelude::*,
	auth::{AppId, Credential},
	store::{CompareAndSwapOutcome, CredentialStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<AppId, Credential>>>;

/// Process-local credential cache; the default store for every token source.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn cas_now(
		map: &StoreMap,
		app_id: &AppId,
		expected: Option<&str>,
		replacement: Credential,
	) -> CompareAndSwapOutcome {
		let mut guard = map.write();
		let outcome = match (guard.get(app_id), expected) {
			(Some(current), Some(expected)) if current.value().matches(expected) =>
				CompareAndSwapOutcome::Updated,
			(None, None) => CompareAndSwapOutcome::Updated,
			(Some(_), _) => CompareAndSwapOutcome::Mismatch,
			(None, Some(_)) => CompareAndSwapOutcome::Missing,
		};

		if outcome == CompareAndSwapOutcome::Updated {
			guard.insert(app_id.clone(), replacement);
		}

		outcome
	}
}
impl CredentialStore for MemoryStore {
	fn load<'a>(&'a self, app_id: &'a AppId) -> StoreFuture<'a, Option<Credential>> {
		Box::pin(async move { Ok(self.0.read().get(app_id).cloned()) })
	}

	fn save(&self, app_id: AppId, credential: Credential) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.0.write().insert(app_id, credential);

			Ok::<_, StoreError>(())
		})
	}

	fn compare_and_swap<'a>(
		&'a self,
		app_id: &'a AppId,
		expected: Option<&'a str>,
		replacement: Credential,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move { Ok(Self::cas_now(&self.0, app_id, expected, replacement)) })
	}
}
