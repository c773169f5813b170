//! Resilient call protocol: one forced credential refresh and one retry per call, at most.
//!
//! ```text
//! credential = current()
//! loop:
//!     send(request + access_token)          transport failures end the call
//!     errcode == 0                        -> decode payload
//!     credential rejected && !has_retried -> force_refresh(credential), retry
//!     otherwise                           -> RemoteError
//! ```

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	client::{Client, Operation},
	http::PlatformHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
	platform::ErrcodeKind,
	remote::{self, TransportErrorMapper},
};

/// Per-call overrides.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
	/// Time budget of each transport call; the client default applies when unset.
	pub timeout: Option<StdDuration>,
	/// Token observed between attempts; a cancelled token aborts the retry.
	pub cancellation: Option<CancellationToken>,
}
impl CallOptions {
	/// Sets the per-attempt time budget.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Attaches a cancellation token.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = Some(token);

		self
	}

	fn ensure_active(&self) -> Result<()> {
		match &self.cancellation {
			Some(token) if token.is_cancelled() => Err(Error::Cancelled),
			_ => Ok(()),
		}
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + PlatformHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Runs `op` with the default call options.
	pub async fn execute<O>(&self, op: &O) -> Result<O::Output>
	where
		O: Operation,
	{
		self.execute_with(op, &CallOptions::default()).await
	}

	/// Runs `op`, retrying once after a forced refresh when the credential is rejected.
	///
	/// At most two transport calls and one forced refresh happen per invocation. Transport
	/// failures are never retried here; a rejection on the retry is returned as
	/// [`Error::Remote`].
	pub async fn execute_with<O>(&self, op: &O, options: &CallOptions) -> Result<O::Output>
	where
		O: Operation,
	{
		const KIND: CallKind = CallKind::Api;

		let span = CallSpan::new(KIND, op.name());

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.run(op, options, &span)).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn run<O>(&self, op: &O, options: &CallOptions, span: &CallSpan) -> Result<O::Output>
	where
		O: Operation,
	{
		let request = op.request(&self.descriptor)?;
		let timeout = options.timeout.unwrap_or(self.timeout);
		let mut credential = self.token_source.current().await?;
		let mut has_retried = false;

		loop {
			let attempt = request.clone().with_query("access_token", credential.value().expose());
			let response = remote::send(
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				&attempt,
				timeout,
			)
			.await?;
			let envelope = response.envelope()?;

			match self.strategy.classify(envelope.code) {
				ErrcodeKind::Success => return Ok(response.payload()?),
				ErrcodeKind::CredentialRejected if !has_retried => {
					span.note("credential rejected; forcing a refresh", Some(envelope.code));
					obs::record_call_outcome(CallKind::Api, CallOutcome::Retry);
					options.ensure_active()?;

					let refreshed = self.token_source.force_refresh(credential.value().expose()).await?;

					options.ensure_active()?;

					credential = refreshed;
					has_retried = true;
				},
				_ => return Err(Error::Remote(envelope.into())),
			}
		}
	}
}
