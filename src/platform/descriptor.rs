//! Platform descriptor data structures shared by the token source, executor, and OAuth sessions.

/// Builder API for assembling platform descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, error::ConfigError};

/// Official API base.
pub const OFFICIAL_API_BASE: &str = "https://api.weixin.qq.com/";
/// Official user authorization endpoint.
pub const OFFICIAL_AUTHORIZE_ENDPOINT: &str = "https://open.weixin.qq.com/connect/oauth2/authorize";

/// Endpoint set declared by a platform descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEndpoints {
	/// Base URL every API path (`cgi-bin/...`, `sns/...`) is resolved against.
	pub api: Url,
	/// Browser-facing authorization endpoint for per-user OAuth.
	pub authorize: Url,
}
impl PlatformEndpoints {
	/// Resolves a relative API path such as `cgi-bin/token` against the API base.
	pub fn api_url(&self, path: &str) -> Result<Url, ConfigError> {
		self.api
			.join(path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}
}

/// Immutable platform descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
	/// Endpoint definitions.
	pub endpoints: PlatformEndpoints,
}
impl PlatformDescriptor {
	/// Creates a new builder with no endpoints configured.
	pub fn builder() -> PlatformDescriptorBuilder {
		PlatformDescriptorBuilder::new()
	}

	/// Descriptor pointing at the official production endpoints.
	pub fn official() -> Self {
		let parse = |raw: &str| Url::parse(raw).unwrap_or_else(|_| unreachable!("{raw} is a valid URL"));

		Self {
			endpoints: PlatformEndpoints {
				api: parse(OFFICIAL_API_BASE),
				authorize: parse(OFFICIAL_AUTHORIZE_ENDPOINT),
			},
		}
	}

	/// Resolves a relative API path against the configured API base.
	pub fn api_url(&self, path: &str) -> Result<Url, ConfigError> {
		self.endpoints.api_url(path)
	}
}
impl Default for PlatformDescriptor {
	fn default() -> Self {
		Self::official()
	}
}
