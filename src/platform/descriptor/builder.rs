// self
use crate::{
	_prelude::*,
	platform::{PlatformDescriptor, PlatformEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum PlatformDescriptorError {
	/// The API base is mandatory.
	#[error("Missing API base endpoint.")]
	MissingApiBase,
	/// The authorization endpoint is mandatory.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizeEndpoint,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The API base must accept relative paths.
	#[error("The API base cannot resolve relative paths: {url}.")]
	NotABase {
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`PlatformDescriptor`] values.
#[derive(Debug, Default)]
pub struct PlatformDescriptorBuilder {
	/// API base that relative paths are joined onto.
	pub api_base: Option<Url>,
	/// Browser-facing authorization endpoint.
	pub authorize_endpoint: Option<Url>,
}
impl PlatformDescriptorBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds the builder with the official endpoints so callers can override one of them.
	pub fn official() -> Self {
		let PlatformEndpoints { api, authorize } = PlatformDescriptor::official().endpoints;

		Self { api_base: Some(api), authorize_endpoint: Some(authorize) }
	}

	/// Sets the API base.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorize_endpoint(mut self, url: Url) -> Self {
		self.authorize_endpoint = Some(url);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	///
	/// A trailing `/` is appended to the API base path when missing so `join` keeps every segment.
	pub fn build(self) -> Result<PlatformDescriptor, PlatformDescriptorError> {
		let mut api = self.api_base.ok_or(PlatformDescriptorError::MissingApiBase)?;
		let authorize =
			self.authorize_endpoint.ok_or(PlatformDescriptorError::MissingAuthorizeEndpoint)?;

		validate_endpoint("api", &api)?;
		validate_endpoint("authorize", &authorize)?;

		if api.cannot_be_a_base() {
			return Err(PlatformDescriptorError::NotABase { url: api.to_string() });
		}
		if !api.path().ends_with('/') {
			let path = format!("{}/", api.path());

			api.set_path(&path);
		}

		Ok(PlatformDescriptor { endpoints: PlatformEndpoints { api, authorize } })
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), PlatformDescriptorError> {
	if url.scheme() != "https" {
		Err(PlatformDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
