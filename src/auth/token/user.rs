//! Per-user OAuth tokens and the grant payload that updates them.

// self
use crate::{
	_prelude::*,
	auth::{OpenId, ScopeSet, ScopeValidationError, Secret},
	error::ConfigError,
	expiry,
};

/// Token fields returned by the code-exchange and refresh endpoints.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
	/// New user access token.
	pub access_token: String,
	/// Rotated refresh token; the platform does not always reissue it.
	#[serde(default)]
	pub refresh_token: Option<String>,
	/// Raw lifetime of `access_token` in seconds.
	pub expires_in: i64,
	/// User identifier scoped to the application.
	pub openid: OpenId,
	/// Comma-separated scopes granted by the user.
	#[serde(default)]
	pub scope: String,
}
impl Debug for TokenGrant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGrant")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_in", &self.expires_in)
			.field("openid", &self.openid)
			.field("scope", &self.scope)
			.finish()
	}
}

/// Access/refresh token pair held on behalf of one user.
///
/// Persist the value between requests if needed; [`OAuth2Token::apply_grant`] keeps it current.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Token {
	/// User access token.
	pub access_token: Secret,
	/// Refresh token, if the platform issued one.
	pub refresh_token: Option<Secret>,
	/// Buffered expiry instant.
	pub expires_at: OffsetDateTime,
	/// Subject of the token.
	pub open_id: OpenId,
	/// Scopes the user granted.
	pub scopes: ScopeSet,
}
impl OAuth2Token {
	/// Builds a token from a fresh grant observed at `now`.
	pub fn from_grant(grant: TokenGrant, now: OffsetDateTime) -> Result<Self> {
		let parts = GrantParts::validate(grant, now)?;

		Ok(Self {
			access_token: parts.access_token,
			refresh_token: parts.refresh_token,
			expires_at: parts.expires_at,
			open_id: parts.open_id,
			scopes: parts.scopes,
		})
	}

	/// Updates the token in place from a grant observed at `now`.
	///
	/// Every field is validated before any assignment, so a rejected grant leaves the token
	/// untouched. The previous refresh token survives when the grant omits one.
	pub fn apply_grant(&mut self, grant: TokenGrant, now: OffsetDateTime) -> Result<()> {
		let parts = GrantParts::validate(grant, now)?;

		self.access_token = parts.access_token;
		self.expires_at = parts.expires_at;
		self.open_id = parts.open_id;
		self.scopes = parts.scopes;

		if let Some(refresh) = parts.refresh_token {
			self.refresh_token = Some(refresh);
		}

		Ok(())
	}

	/// Returns `true` once `instant` is strictly past the buffered expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant > self.expires_at
	}

	/// Returns `true` once the current clock is strictly past the buffered expiry.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for OAuth2Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Token")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("open_id", &self.open_id)
			.field("scopes", &self.scopes)
			.finish()
	}
}

struct GrantParts {
	access_token: Secret,
	refresh_token: Option<Secret>,
	expires_at: OffsetDateTime,
	open_id: OpenId,
	scopes: ScopeSet,
}
impl GrantParts {
	fn validate(grant: TokenGrant, now: OffsetDateTime) -> Result<Self> {
		if grant.access_token.is_empty() {
			return Err(ConfigError::invalid_input("token grant carries an empty access_token").into());
		}

		let expires_at = expiry::valid_until(now, grant.expires_in)?;
		let scopes = ScopeSet::from_csv(&grant.scope).map_err(scope_error)?;
		let refresh_token = grant.refresh_token.filter(|value| !value.is_empty()).map(Secret::new);

		Ok(Self {
			access_token: Secret::new(grant.access_token),
			refresh_token,
			expires_at,
			open_id: grant.openid,
			scopes,
		})
	}
}

fn scope_error(err: ScopeValidationError) -> Error {
	ConfigError::invalid_input(format!("token grant scope is invalid: {err}")).into()
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn grant(access: &str, refresh: Option<&str>, expires_in: i64, scope: &str) -> TokenGrant {
		TokenGrant {
			access_token: access.into(),
			refresh_token: refresh.map(Into::into),
			expires_in,
			openid: OpenId::new("oUser").expect("Open identifier fixture should be valid."),
			scope: scope.into(),
		}
	}

	#[test]
	fn from_grant_buffers_expiry_and_parses_scopes() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let token = OAuth2Token::from_grant(grant("a1", Some("r1"), 7200, "snsapi_userinfo"), now)
			.expect("Grant fixture should build a token.");

		assert_eq!(token.access_token.expose(), "a1");
		assert_eq!(token.refresh_token.as_ref().map(Secret::expose), Some("r1"));
		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 01:40 UTC));
		assert!(token.scopes.contains("snsapi_userinfo"));
	}

	#[test]
	fn apply_grant_keeps_refresh_token_when_omitted() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let mut token = OAuth2Token::from_grant(grant("a1", Some("r1"), 7200, "snsapi_base"), now)
			.expect("Initial grant should build a token.");

		token
			.apply_grant(grant("a2", Some(""), 1800, "snsapi_userinfo"), now)
			.expect("Refresh grant should apply.");

		assert_eq!(token.access_token.expose(), "a2");
		assert_eq!(token.refresh_token.as_ref().map(Secret::expose), Some("r1"));
		assert_eq!(token.expires_at, macros::datetime!(2025-01-01 00:25 UTC));
		assert!(token.scopes.contains("snsapi_userinfo"));
		assert!(!token.scopes.contains("snsapi_base"));
	}

	#[test]
	fn rejected_grant_leaves_token_untouched() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let mut token = OAuth2Token::from_grant(grant("a1", Some("r1"), 7200, ""), now)
			.expect("Initial grant should build a token.");
		let before = token.clone();
		let err = token
			.apply_grant(grant("a2", Some("r2"), 0, ""), now)
			.expect_err("Zero lifetimes must be rejected.");

		assert!(matches!(err, Error::InvalidTtl(_)));
		assert_eq!(token, before);
	}

	#[test]
	fn expiry_is_strictly_after_deadline() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let token = OAuth2Token::from_grant(grant("a1", None, 60, ""), now)
			.expect("Grant fixture should build a token.");

		assert!(!token.is_expired_at(token.expires_at));
		assert!(token.is_expired_at(token.expires_at + Duration::seconds(1)));
	}
}
