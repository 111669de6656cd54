//! Request execution with a single token refresh on `401 Unauthorized`.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpResponse, http::StatusCode};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	client::Client,
	error::{ConfigError, TransportError},
	http::ApiHttpClient,
	obs::{CallKind, CallSpan},
	request::ApiRequest,
};

impl<C> Client<C>
where
	C: ApiHttpClient,
{
	/// Sends `request` and returns the raw body of a `200` response.
	///
	/// With [`ApiRequest::use_token`] set, the cached token (issued on demand) is attached as a
	/// bearer header. A `401` clears the cache and the request is sent once more with a fresh
	/// token; a second `401` clears the cache again and fails with
	/// [`Error::Unauthorized`]. Any other status except `200` fails with [`Error::Api`], and
	/// transport failures with [`Error::Transport`].
	pub async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>> {
		let span = CallSpan::new(CallKind::ApiRequest, "execute");
		let result = span
			.instrument(async {
				let mut retried = false;

				loop {
					let token =
						if request.use_token { Some(self.access_token().await?) } else { None };
					let response = self.dispatch(request, token.as_ref()).await?;

					if response.status() != StatusCode::UNAUTHORIZED || !request.use_token {
						return expect_ok(&request.path, response);
					}

					self.tokens.clear();

					if retried {
						return Err(Error::Unauthorized {
							path: request.path.clone(),
							body: lossy_body(response.into_body()),
						});
					}

					retried = true;
					span.token_rejected(&request.path);
				}
			})
			.await;

		span.finish(result)
	}

	/// Sends one HTTP request without interpreting the status.
	pub(crate) async fn dispatch(
		&self,
		request: &ApiRequest,
		token: Option<&TokenSecret>,
	) -> Result<HttpResponse> {
		let url = self.config.endpoint(&request.path)?;
		let http_request = request.to_http(url, token)?;
		let handle = self.http_client.with_timeout(self.config.timeout());

		handle.call(http_request).await.map_err(|err| map_transport_error(&request.path, err))
	}
}

/// Returns the body of a `200` response, or an [`Error::Api`] for any other status.
pub(crate) fn expect_ok(path: &str, response: HttpResponse) -> Result<Vec<u8>> {
	let status = response.status();
	let body = response.into_body();

	if status == StatusCode::OK {
		return Ok(body);
	}

	Err(Error::Api { status: status.as_u16(), path: path.to_owned(), body: lossy_body(body) })
}

fn lossy_body(body: Vec<u8>) -> String {
	String::from_utf8(body).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn map_transport_error<E>(path: &str, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let source = match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { source: inner },
		HttpClientError::Http(inner) => return ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner),
		HttpClientError::Other(message) => TransportError::Other { message },
		other => TransportError::Other { message: other.to_string() },
	};

	Error::Transport { path: path.to_owned(), source }
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			StatusCode::from_u16(status).expect("Test status code should be valid.");

		response
	}

	#[test]
	fn expect_ok_returns_body_unchanged() {
		let body = expect_ok("/balance", response(200, "{\"balance\":1}"))
			.expect("200 responses should pass through.");

		assert_eq!(body, b"{\"balance\":1}");
	}

	#[test]
	fn expect_ok_rejects_other_success_codes() {
		let err = expect_ok("/emails", response(201, "created"))
			.expect_err("Only 200 counts as success.");

		assert_eq!(err.status(), Some(201));
		assert_eq!(err.body(), Some("created"));
	}

	#[test]
	fn transport_errors_keep_underlying_text() {
		let err = map_transport_error::<std::io::Error>(
			"/balance",
			HttpClientError::Other("dns lookup failed".into()),
		);

		assert_eq!(err.status(), Some(503));
		assert_eq!(err.path(), Some("/balance"));
		assert_eq!(err.message().as_deref(), Some("dns lookup failed"));

		let err = map_transport_error::<std::io::Error>(
			"/balance",
			HttpClientError::Io(std::io::Error::new(
				std::io::ErrorKind::ConnectionRefused,
				"connection refused",
			)),
		);

		assert!(matches!(err, Error::Transport { source: TransportError::Io(_), .. }));
		assert_eq!(err.message().as_deref(), Some("connection refused"));
	}
}
