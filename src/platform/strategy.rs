//! Errcode classification hooks.
//!
//! The executor never hard-codes which errcodes mean "the credential is no longer good"; it asks
//! a [`PlatformStrategy`] instead, so deployments can extend the sentinel list without touching
//! the call protocol.

// self
use crate::_prelude::*;

/// Errcode reported by successful calls (or implied when the field is absent).
pub const ERRCODE_OK: i64 = 0;
/// Errcode reported when the access token is invalid or was superseded.
pub const ERRCODE_INVALID_CREDENTIAL: i64 = 40001;
/// Errcode reported when the access token timed out on the server.
pub const ERRCODE_CREDENTIAL_TIMEOUT: i64 = 42001;

/// Canonical errcode categories used by the call protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrcodeKind {
	/// The call succeeded.
	Success,
	/// The server rejected the credential; one forced refresh and retry is allowed.
	CredentialRejected,
	/// Any other failure; surfaced to the caller as-is.
	Failure,
}

/// Strategy hook that classifies platform errcodes.
///
/// Implementors are required to be `Send + Sync` because a single strategy is shared by every
/// concurrent call on a client.
pub trait PlatformStrategy: Send + Sync {
	/// Maps an envelope errcode onto the call protocol's categories.
	fn classify(&self, code: i64) -> ErrcodeKind;

	/// Returns `true` when `code` reports an invalid (rather than merely failed) credential.
	///
	/// `check_valid` uses this to answer `false` instead of failing.
	fn is_invalid_credential(&self, code: i64) -> bool {
		code == ERRCODE_INVALID_CREDENTIAL
	}
}

/// Default strategy treating `40001` and `42001` as credential rejections.
#[derive(Clone, Debug)]
pub struct DefaultPlatformStrategy {
	rejection_codes: Vec<i64>,
	invalid_credential_code: i64,
}
impl DefaultPlatformStrategy {
	/// Replaces the list of errcodes that trigger a forced refresh and retry.
	pub fn with_rejection_codes<I>(mut self, codes: I) -> Self
	where
		I: IntoIterator<Item = i64>,
	{
		self.rejection_codes = codes.into_iter().filter(|code| *code != ERRCODE_OK).collect();

		self
	}

	/// Overrides the errcode `check_valid` interprets as "token invalid".
	pub fn with_invalid_credential_code(mut self, code: i64) -> Self {
		self.invalid_credential_code = code;

		self
	}

	/// Errcodes currently treated as credential rejections.
	pub fn rejection_codes(&self) -> &[i64] {
		&self.rejection_codes
	}
}
impl Default for DefaultPlatformStrategy {
	fn default() -> Self {
		Self {
			rejection_codes: vec![ERRCODE_INVALID_CREDENTIAL, ERRCODE_CREDENTIAL_TIMEOUT],
			invalid_credential_code: ERRCODE_INVALID_CREDENTIAL,
		}
	}
}
impl Display for DefaultPlatformStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-platform-strategy")
	}
}
impl PlatformStrategy for DefaultPlatformStrategy {
	fn classify(&self, code: i64) -> ErrcodeKind {
		if code == ERRCODE_OK {
			ErrcodeKind::Success
		} else if self.rejection_codes.contains(&code) {
			ErrcodeKind::CredentialRejected
		} else {
			ErrcodeKind::Failure
		}
	}

	fn is_invalid_credential(&self, code: i64) -> bool {
		code == self.invalid_credential_code
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn default_strategy_retries_both_sentinels() {
		let strategy = DefaultPlatformStrategy::default();

		assert_eq!(strategy.classify(ERRCODE_OK), ErrcodeKind::Success);
		assert_eq!(strategy.classify(40001), ErrcodeKind::CredentialRejected);
		assert_eq!(strategy.classify(42001), ErrcodeKind::CredentialRejected);
		assert_eq!(strategy.classify(45009), ErrcodeKind::Failure);
		assert_eq!(strategy.classify(-1), ErrcodeKind::Failure);
	}

	#[test]
	fn rejection_codes_are_configurable() {
		let strategy = DefaultPlatformStrategy::default().with_rejection_codes([40001, 40014, 0]);

		assert_eq!(strategy.rejection_codes(), &[40001, 40014]);
		assert_eq!(strategy.classify(40014), ErrcodeKind::CredentialRejected);
		assert_eq!(strategy.classify(42001), ErrcodeKind::Failure);
		assert_eq!(strategy.classify(0), ErrcodeKind::Success);
	}

	#[test]
	fn invalid_credential_code_is_configurable() {
		let strategy = DefaultPlatformStrategy::default();

		assert!(strategy.is_invalid_credential(40001));
		assert!(!strategy.is_invalid_credential(42001));
		assert!(strategy.with_invalid_credential_code(40014).is_invalid_credential(40014));
	}
}
