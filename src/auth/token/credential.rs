//! The shared app-level access token.

// self
use crate::{_prelude::*, auth::Secret, expiry};

/// Immutable access token issued to the application.
///
/// A refresh never mutates a credential; it produces a new one that replaces the old one in the
/// credential store. `valid_until` always carries the buffered deadline computed by
/// [`expiry::valid_until`], never the raw server value, so the only way in is
/// [`Credential::issue`].
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
	value: Secret,
	issued_at: OffsetDateTime,
	valid_until: OffsetDateTime,
}
impl Credential {
	/// Builds a credential from the issuer's raw `expires_in` lifetime.
	pub fn issue(
		value: impl Into<String>,
		raw_ttl_seconds: i64,
		issued_at: OffsetDateTime,
	) -> Result<Self, expiry::InvalidTtl> {
		let valid_until = expiry::valid_until(issued_at, raw_ttl_seconds)?;

		Ok(Self { value: Secret::new(value), issued_at, valid_until })
	}

	/// Bearer value appended to every call as `access_token`.
	pub fn value(&self) -> &Secret {
		&self.value
	}

	/// Instant the issuer answered.
	pub fn issued_at(&self) -> OffsetDateTime {
		self.issued_at
	}

	/// Buffered local validity deadline.
	pub fn valid_until(&self) -> OffsetDateTime {
		self.valid_until
	}

	/// Returns `true` if the credential is past its buffered deadline at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.valid_until
	}

	/// Returns `true` if the credential is past its buffered deadline now.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("value", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.field("valid_until", &self.valid_until)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn issue_applies_the_expiry_buffer() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential =
			Credential::issue("ACCESS", 7200, issued).expect("Positive lifetimes should issue.");

		assert_eq!(credential.issued_at(), issued);
		assert_eq!(credential.valid_until(), macros::datetime!(2025-01-01 01:40 UTC));
		assert_eq!(credential.value().expose(), "ACCESS");
		assert!(!credential.is_expired_at(macros::datetime!(2025-01-01 01:39 UTC)));
		assert!(credential.is_expired_at(macros::datetime!(2025-01-01 01:40 UTC)));
	}

	#[test]
	fn issue_rejects_non_positive_lifetimes() {
		let err = Credential::issue("ACCESS", 0, OffsetDateTime::now_utc())
			.expect_err("Zero lifetimes must be rejected.");

		assert_eq!(err.seconds, 0);
	}

	#[test]
	fn short_lifetimes_keep_the_deadline_after_issuance() {
		let issued = macros::datetime!(2025-01-01 00:00 UTC);
		let credential =
			Credential::issue("ACCESS", 1, issued).expect("One-second lifetimes should issue.");

		assert!(credential.valid_until() > credential.issued_at());
		assert!(!credential.is_expired_at(issued));
	}

	#[test]
	fn debug_output_redacts_value() {
		let credential = Credential::issue("ACCESS-VALUE", 60, OffsetDateTime::now_utc())
			.expect("Credential fixture should issue.");

		assert!(!format!("{credential:?}").contains("ACCESS-VALUE"));
	}
}
