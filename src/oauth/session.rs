//! Per-user OAuth session: code exchange, refresh, validity checks, and profile lookup.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{OAuth2Token, TokenGrant},
	error::{ConfigError, RemoteError},
	http::{DEFAULT_REQUEST_TIMEOUT, PlatformHttpClient},
	oauth::{Language, OAuth2Config, UserInfo},
	obs::{self, CallKind, CallOutcome, CallSpan},
	platform::{DefaultPlatformStrategy, ERRCODE_OK, PlatformDescriptor, PlatformStrategy},
	remote::{self, RemoteRequest, RemoteResponse, TransportErrorMapper},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, remote::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Session specialized for the crate's default reqwest transport stack.
pub type ReqwestOAuth2Session = OAuth2Session<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// One user's OAuth state.
///
/// Methods that replace the token update it in place as a group; a failed call leaves the
/// previous token untouched.
pub struct OAuth2Session<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: Option<OAuth2Config>,
	token: Option<OAuth2Token>,
	descriptor: PlatformDescriptor,
	strategy: Arc<dyn PlatformStrategy>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
	timeout: StdDuration,
}
impl<C, M> OAuth2Session<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an empty session over the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: PlatformDescriptor,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			config: None,
			token: None,
			descriptor,
			strategy: Arc::new(DefaultPlatformStrategy::default()),
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Attaches the client identity required by `exchange`, `refresh`, and `user_info`.
	pub fn with_config(mut self, config: OAuth2Config) -> Self {
		self.config = Some(config);

		self
	}

	/// Restores a previously persisted token.
	pub fn with_token(mut self, token: OAuth2Token) -> Self {
		self.token = Some(token);

		self
	}

	/// Replaces the errcode strategy consulted by [`OAuth2Session::check_valid`].
	pub fn with_strategy(mut self, strategy: Arc<dyn PlatformStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Overrides the per-call time budget.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Current token, if any.
	pub fn token(&self) -> Option<&OAuth2Token> {
		self.token.as_ref()
	}

	/// Consumes the session, returning the token for persistence.
	pub fn into_token(self) -> Option<OAuth2Token> {
		self.token
	}

	/// Exchanges an authorization `code` for a token and installs it.
	pub async fn exchange(&mut self, code: &str) -> Result<&OAuth2Token> {
		let config = self.config.as_ref().ok_or(ConfigError::MissingClientIdentity)?;

		if code.is_empty() {
			return Err(ConfigError::invalid_input("authorization code is empty").into());
		}

		let request = RemoteRequest::get(self.descriptor.api_url("sns/oauth2/access_token")?)
			.with_query("appid", &config.app_id)
			.with_query("secret", config.app_secret.expose())
			.with_query("code", code)
			.with_query("grant_type", "authorization_code");
		let grant = self.fetch_grant("exchange", &request).await?;

		self.install(grant)
	}

	/// Refreshes the access token with the stored refresh token.
	///
	/// Fails with [`ConfigError::MissingRefreshToken`] before any network call when no refresh
	/// token is held.
	pub async fn refresh(&mut self) -> Result<&OAuth2Token> {
		let config = self.config.as_ref().ok_or(ConfigError::MissingClientIdentity)?;
		let token = self.token.as_ref().ok_or(ConfigError::MissingToken)?;
		let refresh_token = token
			.refresh_token
			.as_ref()
			.filter(|secret| !secret.is_empty())
			.ok_or(ConfigError::MissingRefreshToken)?;
		let request = RemoteRequest::get(self.descriptor.api_url("sns/oauth2/refresh_token")?)
			.with_query("appid", &config.app_id)
			.with_query("grant_type", "refresh_token")
			.with_query("refresh_token", refresh_token.expose());
		let grant = self.fetch_grant("refresh", &request).await?;

		self.install(grant)
	}

	/// Refreshes the token only when it is past its buffered expiry.
	pub async fn ensure_fresh(&mut self) -> Result<&OAuth2Token> {
		let expired = self.token.as_ref().ok_or(ConfigError::MissingToken)?.is_expired();

		if expired {
			self.refresh().await
		} else {
			self.token.as_ref().ok_or_else(|| ConfigError::MissingToken.into())
		}
	}

	/// Asks the platform whether the access token is still valid.
	///
	/// Answers `false` for the strategy's invalid-credential errcode; any other non-zero code is
	/// returned as [`Error::Remote`].
	pub async fn check_valid(&self) -> Result<bool> {
		let token = self.token.as_ref().ok_or(ConfigError::MissingToken)?;
		let request = RemoteRequest::get(self.descriptor.api_url("sns/auth")?)
			.with_query("access_token", token.access_token.expose())
			.with_query("openid", &token.open_id);
		let response = self.send("check_valid", &request).await?;
		let envelope = response.envelope()?;

		match envelope.code {
			ERRCODE_OK => Ok(true),
			code if self.strategy.is_invalid_credential(code) => Ok(false),
			_ => Err(RemoteError::from(envelope).into()),
		}
	}

	/// Fetches the user's profile, refreshing an expired token first.
	pub async fn user_info(&mut self, lang: Language) -> Result<UserInfo> {
		if self.config.is_none() {
			return Err(ConfigError::MissingClientIdentity.into());
		}

		self.ensure_fresh().await?;

		let token = self.token.as_ref().ok_or(ConfigError::MissingToken)?;
		let request = RemoteRequest::get(self.descriptor.api_url("sns/userinfo")?)
			.with_query("access_token", token.access_token.expose())
			.with_query("openid", &token.open_id)
			.with_query("lang", lang.as_str());

		self.send("user_info", &request).await?.into_payload()
	}

	fn install(&mut self, grant: TokenGrant) -> Result<&OAuth2Token> {
		let now = OffsetDateTime::now_utc();

		match self.token.as_mut() {
			Some(token) => token.apply_grant(grant, now)?,
			None => self.token = Some(OAuth2Token::from_grant(grant, now)?),
		}

		self.token.as_ref().ok_or_else(|| ConfigError::MissingToken.into())
	}

	async fn fetch_grant(&self, stage: &'static str, request: &RemoteRequest) -> Result<TokenGrant> {
		self.send(stage, request).await?.into_payload()
	}

	async fn send(&self, stage: &'static str, request: &RemoteRequest) -> Result<RemoteResponse> {
		const KIND: CallKind = CallKind::OAuth;

		let span = CallSpan::new(KIND, stage);

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span
			.instrument(remote::send(
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				request,
				self.timeout,
			))
			.await;

		obs::record_result(KIND, &result);

		result
	}
}
#[cfg(feature = "reqwest")]
impl OAuth2Session<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a session for the official endpoints over the default reqwest transport.
	pub fn new(config: OAuth2Config) -> Result<Self> {
		Ok(Self::with_http_client(
			PlatformDescriptor::official(),
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_config(config))
	}
}
impl<C, M> Debug for OAuth2Session<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Session")
			.field("config", &self.config)
			.field("token", &self.token)
			.field("descriptor", &self.descriptor)
			.finish()
	}
}
