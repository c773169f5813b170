//! Client-level error types shared across the token source, executor, and OAuth sessions.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem or caller precondition violation.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (network, timeout, HTTP status, malformed JSON); never retried.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Well-formed response carrying a non-success errcode.
	#[error(transparent)]
	Remote(#[from] RemoteError),
	/// The credential issuer rejected a refresh; fatal for the current operation.
	#[error("Credential issuer rejected the refresh: {0}")]
	RefreshDenied(#[source] RemoteError),
	/// Server declared a non-positive token lifetime.
	#[error(transparent)]
	InvalidTtl(#[from] crate::expiry::InvalidTtl),
	/// Signature verification failed.
	#[error(transparent)]
	Signature(#[from] SignatureError),
	/// The caller cancelled the call before the retry attempt.
	#[error("Call was cancelled before the retry attempt.")]
	Cancelled,
}
impl Error {
	/// Returns the platform errcode when the failure originated from a remote envelope.
	pub fn remote_code(&self) -> Option<i64> {
		match self {
			Self::Remote(err) | Self::RefreshDenied(err) => Some(err.code),
			_ => None,
		}
	}
}

/// Failure value raised when a response envelope reports a non-zero errcode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
#[error("errcode {code}, errmsg: {message}.")]
pub struct RemoteError {
	/// Platform errcode.
	pub code: i64,
	/// Platform errmsg, preserved for diagnostics.
	pub message: String,
}

/// Configuration and precondition failures raised before any network call.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// An endpoint path could not be resolved against the descriptor base URL.
	#[error("Endpoint path `{path}` cannot be resolved.")]
	InvalidEndpoint {
		/// Offending path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestEncode(#[source] serde_json::Error),
	/// Caller-supplied input failed local validation.
	#[error("Invalid input: {reason}.")]
	InvalidInput {
		/// Human-readable reason.
		reason: String,
	},

	/// The `state` returned by the authorization redirect does not match the issued one.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// The OAuth session has no client identity configured.
	#[error("OAuth session has no client identity configured.")]
	MissingClientIdentity,
	/// The OAuth session holds no token.
	#[error("OAuth session holds no token.")]
	MissingToken,
	/// The OAuth token carries no refresh token.
	#[error("OAuth token is missing a refresh token.")]
	MissingRefreshToken,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}

	/// Builds an [`ConfigError::InvalidInput`] from a reason string.
	pub fn invalid_input(reason: impl Into<String>) -> Self {
		Self::InvalidInput { reason: reason.into() }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures; surfaced immediately and never retried by the call protocol.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the platform.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded its time budget.
	#[error("Request to the platform timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the platform.")]
	Io(#[from] std::io::Error),
	/// The platform answered with a non-200 HTTP status.
	#[error("Platform returned HTTP status {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// The response body was not the expected JSON shape.
	#[error("Platform returned malformed JSON.")]
	Decode {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Any other transport failure reported as text.
	#[error("HTTP client error occurred while calling the platform: {message}.")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Signature verification failures.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum SignatureError {
	/// The claimed signature does not have the digest's fixed hex length.
	#[error("Signature has length {actual}, expected {expected}.")]
	Malformed {
		/// Length of the claimed signature in bytes.
		actual: usize,
		/// Fixed hex length of the digest.
		expected: usize,
	},
	/// The claimed signature does not match the recomputed one.
	#[error("Signature does not match.")]
	Bad,
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "redis unreachable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("redis unreachable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn remote_code_is_exposed_for_remote_failures() {
		let remote = RemoteError { code: 45009, message: "reach max api daily quota limit".into() };

		assert_eq!(Error::Remote(remote.clone()).remote_code(), Some(45009));
		assert_eq!(Error::RefreshDenied(remote).remote_code(), Some(45009));
		assert_eq!(Error::Cancelled.remote_code(), None);
	}

	#[test]
	fn refresh_denied_keeps_issuer_error_as_source() {
		let err = Error::RefreshDenied(RemoteError { code: 40013, message: "invalid appid".into() });
		let source = StdError::source(&err).expect("RefreshDenied should expose its source.");

		assert!(source.to_string().contains("40013"));
		assert!(err.to_string().contains("invalid appid"));
	}
}
