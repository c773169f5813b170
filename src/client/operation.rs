//! The contract every credential-bearing API operation implements.

// std
use std::marker::PhantomData;
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, platform::PlatformDescriptor, remote::RemoteRequest};

pub use crate::remote::Method;

/// Describes one platform endpoint call, without the credential.
///
/// The executor appends `access_token` to the request produced by [`Operation::request`] on every
/// attempt, so implementations must not add it themselves.
pub trait Operation
where
	Self: Send + Sync,
{
	/// Payload decoded from a successful response body.
	type Output: DeserializeOwned + Send;

	/// Stable label used for spans.
	fn name(&self) -> &'static str;

	/// Builds the request against the descriptor's endpoints.
	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest>;
}

/// Ad-hoc [`Operation`] for endpoints without a dedicated wrapper.
pub struct ApiCall<O> {
	name: &'static str,
	method: Method,
	path: String,
	query: Vec<(String, String)>,
	body: Option<serde_json::Value>,
	_output: PhantomData<fn() -> O>,
}
impl<O> ApiCall<O> {
	/// Describes a `GET` call to `path` (relative to the API base).
	pub fn get(name: &'static str, path: impl Into<String>) -> Self {
		Self {
			name,
			method: Method::Get,
			path: path.into(),
			query: Vec::new(),
			body: None,
			_output: PhantomData,
		}
	}

	/// Describes a `POST` call to `path` carrying `body` as JSON.
	pub fn post<B>(name: &'static str, path: impl Into<String>, body: &B) -> Result<Self>
	where
		B: ?Sized + Serialize,
	{
		let body = serde_json::to_value(body).map_err(crate::error::ConfigError::RequestEncode)?;

		Ok(Self {
			name,
			method: Method::Post,
			path: path.into(),
			query: Vec::new(),
			body: Some(body),
			_output: PhantomData,
		})
	}

	/// Adds a query parameter.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// HTTP verb of the call.
	pub fn method(&self) -> Method {
		self.method
	}
}
impl<O> Operation for ApiCall<O>
where
	O: DeserializeOwned + Send,
{
	type Output = O;

	fn name(&self) -> &'static str {
		self.name
	}

	fn request(&self, descriptor: &PlatformDescriptor) -> Result<RemoteRequest> {
		let url = descriptor.api_url(&self.path)?;
		let mut request = match &self.body {
			Some(body) => RemoteRequest::post_json(url, body)?,
			None => RemoteRequest::get(url),
		};

		for (key, value) in &self.query {
			request = request.with_query(key, value);
		}

		Ok(request)
	}
}
impl<O> Debug for ApiCall<O> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiCall")
			.field("name", &self.name)
			.field("method", &self.method)
			.field("path", &self.path)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::remote::Ack;

	#[test]
	fn api_call_builds_requests_without_credentials() {
		let descriptor = PlatformDescriptor::official();
		let call = <ApiCall<Ack>>::get("menu_get", "cgi-bin/menu/get").query("lang", "en");
		let request = call.request(&descriptor).expect("GET call should build.");

		assert_eq!(request.method, Method::Get);
		assert_eq!(request.url.as_str(), "https://api.weixin.qq.com/cgi-bin/menu/get?lang=en");
		assert!(request.body.is_none());

		let call = <ApiCall<Ack>>::post("menu_delete", "cgi-bin/menu/delete", &serde_json::json!({}))
			.expect("POST call should build.");
		let request = call.request(&descriptor).expect("POST call should build.");

		assert_eq!(request.method, Method::Post);
		assert_eq!(request.body.as_deref(), Some(&b"{}"[..]));
		assert!(!request.url.as_str().contains("access_token"));
	}
}
