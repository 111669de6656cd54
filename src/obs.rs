//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `sendpulse_client.call` with `call` (kind) and `stage`
//!   (call site) fields.
//! - Enable `metrics` to increment the `sendpulse_client_call_total` counter, labeled by `call` +
//!   `outcome`.

// self
use crate::_prelude::*;

/// Resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// Kinds of outbound calls made by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Client-credentials token issuance.
	TokenIssue,
	/// Caller-requested API call.
	ApiRequest,
}
impl CallKind {
	/// Stable label for span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::TokenIssue => "token_issue",
			Self::ApiRequest => "api_request",
		}
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Token dropped after a `401` and the call repeated.
	Retry,
}
impl CallOutcome {
	/// Stable label for span and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Attempt => "attempt",
			Self::Success => "success",
			Self::Failure => "failure",
			Self::Retry => "retry",
		}
	}
}

/// Span plus outcome counter for one client call.
///
/// Creating the span records [`CallOutcome::Attempt`].
#[derive(Clone, Debug)]
pub struct CallSpan {
	kind: CallKind,
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Opens a span for `kind` at call site `stage`.
	pub fn new(kind: CallKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		let this = Self {
			kind,
			span: tracing::info_span!("sendpulse_client.call", call = kind.as_str(), stage),
		};
		#[cfg(not(feature = "tracing"))]
		let this = {
			let _ = stage;

			Self { kind }
		};

		this.record(CallOutcome::Attempt);

		this
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}

	/// Increments the call counter for `outcome`.
	pub fn record(&self, outcome: CallOutcome) {
		#[cfg(feature = "metrics")]
		{
			metrics::counter!(
				"sendpulse_client_call_total",
				"call" => self.kind.as_str(),
				"outcome" => outcome.as_str()
			)
			.increment(1);
		}
		#[cfg(not(feature = "metrics"))]
		{
			let _ = (self.kind, outcome);
		}
	}

	/// Records success or failure from a finished call and hands the result back.
	pub fn finish<T>(&self, result: Result<T>) -> Result<T> {
		self.record(if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure });

		result
	}

	/// Notes that the cached token was dropped after a `401` on `path` and the call is retried.
	pub fn token_rejected(&self, path: &str) {
		#[cfg(feature = "tracing")]
		{
			let _guard = self.span.enter();

			tracing::debug!(path, "access token rejected; clearing cache");
		}
		#[cfg(not(feature = "tracing"))]
		let _ = path;

		self.record(CallOutcome::Retry);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_are_stable() {
		assert_eq!(CallKind::TokenIssue.as_str(), "token_issue");
		assert_eq!(CallOutcome::Retry.as_str(), "retry");
	}

	#[test]
	fn finish_passes_result_through() {
		let span = CallSpan::new(CallKind::ApiRequest, "finish");

		span.token_rejected("/balance");

		assert_eq!(span.finish(Ok(7)).ok(), Some(7));
		assert!(
			span.finish::<()>(Err(Error::Unauthorized { path: "/x".into(), body: String::new() }))
				.is_err()
		);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallKind::ApiRequest, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
