//! Authorization URLs and the client identity used by OAuth sessions.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{AppId, ScopeSet, Secret},
	error::ConfigError,
	platform::PlatformDescriptor,
};

const STATE_LEN: usize = 32;
const REDIRECT_FRAGMENT: &str = "wechat_redirect";

/// Client identity used by per-user OAuth sessions.
#[derive(Clone, Debug)]
pub struct OAuth2Config {
	/// Application id.
	pub app_id: AppId,
	/// Application secret.
	pub app_secret: Secret,
	/// Where the platform sends the user back with `code` and `state`.
	pub redirect_uri: Url,
	/// Scopes requested from the user.
	pub scopes: ScopeSet,
}
impl OAuth2Config {
	/// Creates a client identity.
	pub fn new(
		app_id: AppId,
		app_secret: impl Into<String>,
		redirect_uri: Url,
		scopes: ScopeSet,
	) -> Self {
		Self { app_id, app_secret: Secret::new(app_secret), redirect_uri, scopes }
	}

	/// Builds the authorization URL with a fresh random `state`.
	pub fn authorization_request(&self, descriptor: &PlatformDescriptor) -> AuthorizationRequest {
		let state = random_string(STATE_LEN);
		let mut url = descriptor.endpoints.authorize.clone();

		url.query_pairs_mut()
			.append_pair("appid", &self.app_id)
			.append_pair("redirect_uri", self.redirect_uri.as_str())
			.append_pair("response_type", "code")
			.append_pair("scope", &self.scopes.to_csv())
			.append_pair("state", &state);
		url.set_fragment(Some(REDIRECT_FRAGMENT));

		AuthorizationRequest { url, state }
	}
}

/// Authorization redirect handed to the user's browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// Fully-formed authorization URL.
	pub url: Url,
	/// Opaque value that must round-trip through the redirect.
	pub state: String,
}
impl AuthorizationRequest {
	/// Validates the `state` returned with the authorization code.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state { Ok(()) } else { Err(ConfigError::StateMismatch.into()) }
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
