//! App-level access token issued through `cgi-bin/token`.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{AppId, Credential, Secret},
	http::{DEFAULT_REQUEST_TIMEOUT, PlatformHttpClient},
	obs::{self, CallKind, CallOutcome, CallSpan},
	platform::PlatformDescriptor,
	remote::{self, RemoteRequest, TransportErrorMapper},
	store::{CompareAndSwapOutcome, CredentialStore, MemoryStore},
	token::{RefreshMetrics, TokenFuture, TokenSource},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, remote::ReqwestTransportErrorMapper};

/// Path of the credential issuer relative to the API base.
pub const ISSUER_PATH: &str = "cgi-bin/token";

#[cfg(feature = "reqwest")]
/// Token source specialized for the crate's default reqwest transport stack.
pub type ReqwestAccessTokenSource =
	AccessTokenSource<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Token source issuing app credentials with the `client_credential` grant.
///
/// Credentials live in a [`CredentialStore`] (a [`MemoryStore`] unless replaced). Every path that
/// may contact the issuer runs under one async guard, so concurrent refreshes collapse into a
/// single issuer call whose result all waiters observe.
pub struct AccessTokenSource<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	app_id: AppId,
	app_secret: Secret,
	descriptor: PlatformDescriptor,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	store: Arc<dyn CredentialStore>,
	timeout: StdDuration,
	refresh_guard: AsyncMutex<()>,
	metrics: Arc<RefreshMetrics>,
}
impl<C, M> AccessTokenSource<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a token source that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		app_id: AppId,
		app_secret: impl Into<String>,
		descriptor: PlatformDescriptor,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			app_id,
			app_secret: Secret::new(app_secret),
			descriptor,
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store: Arc::new(MemoryStore::default()),
			timeout: DEFAULT_REQUEST_TIMEOUT,
			refresh_guard: AsyncMutex::new(()),
			metrics: Default::default(),
		}
	}

	/// Replaces the credential store.
	pub fn with_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = store;

		self
	}

	/// Overrides the time budget of issuer calls.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Application the credentials are issued to.
	pub fn app_id(&self) -> &AppId {
		&self.app_id
	}

	/// Issuer call counters.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		&self.metrics
	}

	async fn load(&self) -> Result<Option<Credential>> {
		Ok(self.store.load(&self.app_id).await?)
	}

	async fn refresh_current(&self) -> Result<Credential> {
		let _singleflight = self.refresh_guard.lock().await;
		let cached = self.load().await?;

		if let Some(credential) = cached.as_ref().filter(|credential| !credential.is_expired()) {
			return Ok(credential.clone());
		}

		let fresh = self.issue().await?;

		self.install(cached.as_ref().map(|credential| credential.value().expose()), fresh).await
	}

	async fn refresh_stale(&self, stale: &str) -> Result<Credential> {
		let _singleflight = self.refresh_guard.lock().await;
		let cached = self.load().await?;

		if let Some(credential) = cached
			.as_ref()
			.filter(|credential| !credential.value().matches(stale) && !credential.is_expired())
		{
			return Ok(credential.clone());
		}

		let fresh = self.issue().await?;

		self.install(cached.as_ref().map(|credential| credential.value().expose()), fresh).await
	}

	async fn install(&self, expected: Option<&str>, fresh: Credential) -> Result<Credential> {
		match self.store.compare_and_swap(&self.app_id, expected, fresh.clone()).await? {
			CompareAndSwapOutcome::Updated => Ok(fresh),
			CompareAndSwapOutcome::Mismatch | CompareAndSwapOutcome::Missing =>
				match self.load().await? {
					Some(installed) => Ok(installed),
					None => {
						self.store.save(self.app_id.clone(), fresh.clone()).await?;

						Ok(fresh)
					},
				},
		}
	}

	async fn issue(&self) -> Result<Credential> {
		const KIND: CallKind = CallKind::CredentialRefresh;

		let span = CallSpan::new(KIND, "issue");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.metrics.record_attempt();

		let result = span.instrument(self.request_credential()).await;

		match &result {
			Ok(_) => self.metrics.record_success(),
			Err(err) => {
				span.note("credential issuance failed", err.remote_code());
				self.metrics.record_failure();
			},
		}

		obs::record_result(KIND, &result);

		result
	}

	async fn request_credential(&self) -> Result<Credential> {
		let request = RemoteRequest::get(self.descriptor.api_url(ISSUER_PATH)?)
			.with_query("grant_type", "client_credential")
			.with_query("appid", &self.app_id)
			.with_query("secret", self.app_secret.expose());
		let response = remote::send(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			&request,
			self.timeout,
		)
		.await?;
		let envelope = response.envelope()?;

		if !envelope.is_success() {
			return Err(Error::RefreshDenied(envelope.into()));
		}

		let grant = response.payload::<AccessTokenGrant>()?;

		Ok(Credential::issue(grant.access_token, grant.expires_in, OffsetDateTime::now_utc())?)
	}
}
#[cfg(feature = "reqwest")]
impl AccessTokenSource<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a token source for the official endpoints over the default reqwest transport.
	pub fn new(app_id: AppId, app_secret: impl Into<String>) -> Result<Self> {
		Ok(Self::with_http_client(
			app_id,
			app_secret,
			PlatformDescriptor::official(),
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}
}
impl<C, M> TokenSource for AccessTokenSource<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn current(&self) -> TokenFuture<'_, Credential> {
		Box::pin(async move {
			match self.load().await? {
				Some(credential) if !credential.is_expired() => Ok(credential),
				_ => self.refresh_current().await,
			}
		})
	}

	fn force_refresh<'a>(&'a self, stale: &'a str) -> TokenFuture<'a, Credential> {
		Box::pin(self.refresh_stale(stale))
	}
}
impl<C, M> Debug for AccessTokenSource<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessTokenSource")
			.field("app_id", &self.app_id)
			.field("app_secret", &self.app_secret)
			.field("descriptor", &self.descriptor)
			.field("timeout", &self.timeout)
			.finish()
	}
}

#[derive(Deserialize)]
struct AccessTokenGrant {
	access_token: String,
	expires_in: i64,
}
