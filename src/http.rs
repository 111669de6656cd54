//! Transport primitives for SendPulse API calls.
//!
//! [`ApiHttpClient`] is the client's only dependency on an HTTP stack. The client asks it for a
//! short-lived [`AsyncHttpClient`] handle bound to the configured timeout, hands that handle a
//! fully built request, and classifies whatever comes back. The default implementation wraps
//! `reqwest`; tests and custom stacks supply their own.

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Abstraction over HTTP transports able to execute API requests.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can back every clone of
/// a [`Client`](crate::Client), and the handles they return must own whatever state they need so
/// request futures stay `Send` while in flight.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle that applies a request timeout.
	///
	/// The request future returned by [`AsyncHttpClient::call`] must be `Send` so the client's
	/// futures can hop executors.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds a handle whose requests give up after `timeout`.
	///
	/// A timeout must surface as an error from [`AsyncHttpClient::call`], never as a response.
	fn with_timeout(&self, timeout: StdDuration) -> Self::Handle;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	pub(crate) fn timed(&self, timeout: StdDuration) -> TimedHandle {
		TimedHandle::new(self.0.clone(), timeout)
	}
}
#[cfg(feature = "reqwest")]
impl ApiHttpClient for ReqwestHttpClient {
	type Handle = TimedHandle;
	type TransportError = ReqwestError;

	fn with_timeout(&self, timeout: StdDuration) -> Self::Handle {
		self.timed(timeout)
	}
}

#[cfg(feature = "reqwest")]
struct TimedHttpClient {
	client: ReqwestClient,
	timeout: StdDuration,
}

/// Handle returned by [`ReqwestHttpClient`] that applies a per-request timeout.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct TimedHandle(Arc<TimedHttpClient>);
#[cfg(feature = "reqwest")]
impl TimedHandle {
	fn new(client: ReqwestClient, timeout: StdDuration) -> Self {
		Self(Arc::new(TimedHttpClient { client, timeout }))
	}
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for TimedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			let mut request: reqwest::Request = request.try_into().map_err(Box::new)?;

			*request.timeout_mut() = Some(client.timeout);

			let response = client.client.execute(request).await.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn refused_connection_surfaces_as_transport_error() {
		let handle = ReqwestHttpClient::default().with_timeout(StdDuration::from_secs(2));
		let request = oauth2::http::Request::builder()
			.uri("http://127.0.0.1:9/unreachable")
			.body(Vec::new())
			.expect("Test request should build.");
		let err = handle.call(request).await.expect_err("Nothing listens on the discard port.");

		assert!(matches!(err, HttpClientError::Reqwest(_)));
	}
}
