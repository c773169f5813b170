//! WeChat Official Account API client: a shared access-token cache with single-flight refresh,
//! retry-once credential recovery, per-user OAuth sessions, and timing-safe payment signatures.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod expiry;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod platform;
pub mod remote;
pub mod signature;
pub mod store;
pub mod token;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::AppId,
		client::{Client, ReqwestPlatformClient},
		http::ReqwestHttpClient,
		oauth::{OAuth2Config, OAuth2Session, ReqwestOAuth2Session},
		platform::PlatformDescriptor,
		remote::ReqwestTransportErrorMapper,
		token::{AccessTokenSource, ReqwestAccessTokenSource},
	};

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Builds a descriptor whose API base and authorization endpoint both point at `base`.
	pub fn test_descriptor(base: &str) -> PlatformDescriptor {
		let api = Url::parse(base).expect("Mock server base URL should parse.");
		let authorize = api.join("connect/oauth2/authorize").expect("Authorize URL should join.");

		PlatformDescriptor::builder()
			.api_base(api)
			.authorize_endpoint(authorize)
			.build()
			.expect("Mock descriptor should build.")
	}

	/// Constructs an access-token source backed by the in-memory store and the reqwest transport
	/// used across integration tests.
	pub fn build_reqwest_test_token_source(
		descriptor: PlatformDescriptor,
		app_id: &str,
		app_secret: &str,
	) -> ReqwestAccessTokenSource {
		let app_id = AppId::new(app_id).expect("Application identifier fixture should be valid.");

		AccessTokenSource::with_http_client(
			app_id,
			app_secret,
			descriptor,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Constructs a [`Client`] sharing its token source with the caller so tests can inspect the
	/// issuer metrics.
	pub fn build_reqwest_test_client(
		descriptor: PlatformDescriptor,
		app_id: &str,
		app_secret: &str,
	) -> (ReqwestPlatformClient, Arc<ReqwestAccessTokenSource>) {
		let source =
			Arc::new(build_reqwest_test_token_source(descriptor.clone(), app_id, app_secret));
		let client: ReqwestPlatformClient = Client::with_http_client(
			descriptor,
			source.clone(),
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		);

		(client, source)
	}

	/// Constructs an OAuth session for `config` over the insecure test transport.
	pub fn build_reqwest_test_session(
		descriptor: PlatformDescriptor,
		config: OAuth2Config,
	) -> ReqwestOAuth2Session {
		OAuth2Session::with_http_client(
			descriptor,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_config(config)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
