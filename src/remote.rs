//! Wire layer shared by every platform call.
//!
//! Requests are plain values ([`RemoteRequest`]) turned into `http::Request<Vec<u8>>` at dispatch
//! time; responses are checked for HTTP 200 and then decoded in two phases: the
//! [`RemoteErrorEnvelope`] first, the operation payload only when the envelope reports success.

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{Method as HttpMethod, header},
};
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, RemoteError, TransportError},
	http::{PlatformHttpClient, ResponseMetadata, ResponseMetadataSlot},
	platform::ERRCODE_OK,
};

/// Maps HTTP transport failures into client [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a client error.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			other => map_common_error(meta, other),
		}
	}
}

/// Mapper for custom transports whose errors carry no timeout signal of their own.
///
/// Transport errors become [`TransportError::Network`]; everything else is mapped exactly like
/// the reqwest mapper does.
#[derive(Clone, Debug, Default)]
pub struct GenericTransportErrorMapper;
impl<E> TransportErrorMapper<E> for GenericTransportErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(&self, meta: Option<&ResponseMetadata>, err: HttpClientError<E>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => TransportError::Network { source: inner }.into(),
			other => map_common_error(meta, other),
		}
	}
}

/// HTTP verb used by platform calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// Query-string call without a body.
	Get,
	/// JSON body call.
	Post,
}
impl Method {
	fn as_http(self) -> HttpMethod {
		match self {
			Self::Get => HttpMethod::GET,
			Self::Post => HttpMethod::POST,
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(match self {
			Self::Get => "GET",
			Self::Post => "POST",
		})
	}
}

/// Wire shape of the `errcode`/`errmsg` pair merged into every response body.
///
/// Both fields default when absent; successful responses frequently omit them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteErrorEnvelope {
	/// Platform errcode; `0` means success.
	#[serde(rename = "errcode", default)]
	pub code: i64,
	/// Platform errmsg.
	#[serde(rename = "errmsg", default)]
	pub message: String,
}
impl RemoteErrorEnvelope {
	/// Returns `true` when the envelope reports success.
	pub fn is_success(&self) -> bool {
		self.code == ERRCODE_OK
	}

	/// Converts the envelope into `Ok(())` on success or the matching [`RemoteError`].
	pub fn into_result(self) -> Result<(), RemoteError> {
		if self.is_success() { Ok(()) } else { Err(self.into()) }
	}
}
impl From<RemoteErrorEnvelope> for RemoteError {
	fn from(envelope: RemoteErrorEnvelope) -> Self {
		Self { code: envelope.code, message: envelope.message }
	}
}

/// Payload of endpoints that answer with the envelope alone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {}

/// A fully resolved request, minus transport concerns.
#[derive(Clone, Debug)]
pub struct RemoteRequest {
	/// HTTP verb.
	pub method: Method,
	/// Absolute URL including the query string.
	pub url: Url,
	/// Serialized JSON body for `POST` calls.
	pub body: Option<Vec<u8>>,
}
impl RemoteRequest {
	/// Builds a `GET` request.
	pub fn get(url: Url) -> Self {
		Self { method: Method::Get, url, body: None }
	}

	/// Builds a `POST` request carrying `body` as JSON.
	pub fn post_json<T>(url: Url, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(body).map_err(ConfigError::RequestEncode)?;

		Ok(Self { method: Method::Post, url, body: Some(body) })
	}

	/// Appends a query pair to the URL.
	pub fn with_query(mut self, key: &str, value: &str) -> Self {
		self.url.query_pairs_mut().append_pair(key, value);

		self
	}

	fn to_http(&self) -> Result<HttpRequest, ConfigError> {
		let builder = oauth2::http::Request::builder()
			.method(self.method.as_http())
			.uri(self.url.as_str())
			.header(header::ACCEPT, "application/json");

		match &self.body {
			Some(body) => Ok(builder
				.header(header::CONTENT_TYPE, "application/json; charset=utf-8")
				.body(body.clone())?),
			None => Ok(builder.body(Vec::new())?),
		}
	}
}

/// Raw HTTP 200 response body awaiting decoding.
#[derive(Clone, Debug)]
pub struct RemoteResponse {
	/// HTTP status code (always `200` once returned by [`send`]).
	pub status: u16,
	/// Response body.
	pub body: Vec<u8>,
}
impl RemoteResponse {
	/// Decodes the `errcode`/`errmsg` envelope.
	pub fn envelope(&self) -> Result<RemoteErrorEnvelope, TransportError> {
		decode_json(&self.body, Some(self.status))
	}

	/// Decodes the operation payload from the same body.
	pub fn payload<T>(&self) -> Result<T, TransportError>
	where
		T: DeserializeOwned,
	{
		decode_json(&self.body, Some(self.status))
	}

	/// Decodes the envelope and, on success, the payload; non-zero codes become [`RemoteError`].
	pub fn into_payload<T>(self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.envelope()?.into_result()?;

		Ok(self.payload()?)
	}
}

/// Dispatches `request` through the transport and enforces HTTP 200.
///
/// Network failures, timeouts, and non-200 statuses all surface as [`Error::Transport`] (or
/// [`Error::Config`] when the request itself could not be built).
pub async fn send<C, M>(
	http_client: &C,
	mapper: &M,
	request: &RemoteRequest,
	timeout: StdDuration,
) -> Result<RemoteResponse>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let slot = ResponseMetadataSlot::default();
	let handle = http_client.handle(slot.clone(), timeout);
	let response = handle
		.call(request.to_http()?)
		.await
		.map_err(|err| mapper.map_transport_error(slot.take().as_ref(), err))?;
	let status = response.status().as_u16();

	if status != 200 {
		return Err(TransportError::Status { status }.into());
	}

	Ok(RemoteResponse { status, body: response.into_body() })
}

fn decode_json<T>(body: &[u8], status: Option<u16>) -> Result<T, TransportError>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| TransportError::Decode { source, status })
}

fn map_common_error<E>(meta: Option<&ResponseMetadata>, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) =>
			TransportError::Other { message: with_status(meta, message) }.into(),
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner }.into(),
		_ => TransportError::Other { message: with_status(meta, "unknown transport failure".into()) }
			.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}

fn with_status(meta: Option<&ResponseMetadata>, message: String) -> String {
	match meta.and_then(|value| value.status) {
		Some(status) => format!("{message} (HTTP {status})"),
		None => message,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(body: &str) -> RemoteResponse {
		RemoteResponse { status: 200, body: body.as_bytes().to_vec() }
	}

	#[derive(Debug, Deserialize)]
	struct MsgId {
		msg_id: i64,
	}

	#[test]
	fn envelope_defaults_when_fields_are_absent() {
		let envelope = response("{\"msg_id\":7}").envelope().expect("Body should decode.");

		assert_eq!(envelope, RemoteErrorEnvelope::default());
		assert!(envelope.is_success());
	}

	#[test]
	fn payload_is_only_decoded_on_success() {
		let ok: MsgId = response("{\"errcode\":0,\"errmsg\":\"ok\",\"msg_id\":7}")
			.into_payload()
			.expect("Successful envelope should yield the payload.");

		assert_eq!(ok.msg_id, 7);

		let err = response("{\"errcode\":45009,\"errmsg\":\"quota\"}")
			.into_payload::<MsgId>()
			.expect_err("Non-zero errcode should fail before payload decoding.");

		assert_eq!(err.remote_code(), Some(45009));
	}

	#[test]
	fn malformed_json_is_a_decode_failure_with_path() {
		let err = response("{\"errcode\":\"zero\"}")
			.envelope()
			.expect_err("A string errcode should not decode.");

		match err {
			TransportError::Decode { source, status } => {
				assert_eq!(status, Some(200));
				assert_eq!(source.path().to_string(), "errcode");
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}

	#[test]
	fn requests_carry_method_query_and_json_body() {
		let url = Url::parse("https://api.weixin.qq.com/cgi-bin/message/mass/delete")
			.expect("Fixture URL should parse.");
		let request = RemoteRequest::post_json(url, &serde_json::json!({ "msg_id": 1 }))
			.expect("JSON body should serialize.")
			.with_query("access_token", "TOKEN");
		let http = request.to_http().expect("Request should convert.");

		assert_eq!(http.method(), &HttpMethod::POST);
		assert!(http.uri().to_string().ends_with("mass/delete?access_token=TOKEN"));
		assert_eq!(http.body(), b"{\"msg_id\":1}");
		assert!(http.headers().get(header::CONTENT_TYPE).is_some());
	}
}
