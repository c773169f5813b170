//! Credential-bearing API client and its resilient call executor.

pub mod executor;
pub mod operation;

pub use executor::*;
pub use operation::*;

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	http::{DEFAULT_REQUEST_TIMEOUT, PlatformHttpClient},
	platform::{DefaultPlatformStrategy, PlatformDescriptor, PlatformStrategy},
	remote::TransportErrorMapper,
	token::TokenSource,
};
#[cfg(feature = "reqwest")]
use crate::{
	auth::AppId,
	http::ReqwestHttpClient,
	remote::ReqwestTransportErrorMapper,
	token::ReqwestAccessTokenSource,
};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestPlatformClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Runs platform operations with the shared app credential.
///
/// The client owns the HTTP transport, errcode strategy, and token source so operations only
/// describe what to call. Cloning is cheap; every clone shares the same token source.
pub struct Client<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound call.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Endpoint descriptor operations resolve their paths against.
	pub descriptor: PlatformDescriptor,
	/// Errcode classification used by the retry protocol.
	pub strategy: Arc<dyn PlatformStrategy>,
	/// Source of the shared app credential.
	pub token_source: Arc<dyn TokenSource>,
	/// Default time budget of a single transport call.
	pub timeout: StdDuration,
}
impl<C, M> Client<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: PlatformDescriptor,
		token_source: Arc<dyn TokenSource>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			descriptor,
			strategy: Arc::new(DefaultPlatformStrategy::default()),
			token_source,
			timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Replaces the errcode strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn PlatformStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Overrides the default per-call time budget.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client for the official endpoints backed by a [`ReqwestAccessTokenSource`].
	///
	/// The token source and the client share one reqwest transport.
	pub fn new(app_id: AppId, app_secret: impl Into<String>) -> Result<Self> {
		let descriptor = PlatformDescriptor::official();
		let http_client = Arc::new(ReqwestHttpClient::new()?);
		let mapper = Arc::new(ReqwestTransportErrorMapper);
		let token_source = ReqwestAccessTokenSource::with_http_client(
			app_id,
			app_secret,
			descriptor.clone(),
			http_client.clone(),
			mapper.clone(),
		);

		Ok(Self::with_http_client(descriptor, Arc::new(token_source), http_client, mapper))
	}
}
impl<C, M> Clone for Client<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			descriptor: self.descriptor.clone(),
			strategy: self.strategy.clone(),
			token_source: self.token_source.clone(),
			timeout: self.timeout,
		}
	}
}
impl<C, M> Debug for Client<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("descriptor", &self.descriptor)
			.field("timeout", &self.timeout)
			.finish()
	}
}
