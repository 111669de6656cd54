//! Client-credentials issuance feeding the shared token cache.
//!
//! [`Client::access_token`] returns the cached token or issues a new one with an
//! unauthenticated `POST /oauth/access_token`. Only `access_token` is required in the JSON
//! answer; a numeric `expires_in` bounds how long the token is reused.

// self
use crate::{
	_prelude::*,
	auth::{CachedToken, TokenSecret},
	client::{Client, execute},
	error::AuthResponseError,
	http::ApiHttpClient,
	obs::{CallKind, CallSpan},
	request::ApiRequest,
};

/// Path of the token issuance endpoint.
pub const TOKEN_PATH: &str = "/oauth/access_token";

#[derive(Deserialize)]
struct TokenResponse {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	expires_in: Option<serde_json::Value>,
}

impl<C> Client<C>
where
	C: ApiHttpClient,
{
	/// Returns the cached access token, issuing one first when the cache is empty.
	///
	/// Concurrent callers on an empty cache may each issue a token.
	pub async fn access_token(&self) -> Result<TokenSecret> {
		self.tokens.get_or_issue(|| self.issue_token()).await
	}

	/// Drops the cached access token; the next authenticated call issues a new one.
	pub fn invalidate_token(&self) {
		self.tokens.clear();
	}

	async fn issue_token(&self) -> Result<CachedToken> {
		let span = CallSpan::new(CallKind::TokenIssue, "issue_token");
		let result = span
			.instrument(async move {
				let request = ApiRequest::post(TOKEN_PATH)
					.param("grant_type", "client_credentials")
					.param("client_id", &self.config.user_id)
					.param("client_secret", &self.config.secret)
					.without_token();
				let response = self.dispatch(&request, None).await?;
				let body = execute::expect_ok(TOKEN_PATH, response)?;

				parse_token_response(&body, OffsetDateTime::now_utc())
			})
			.await;

		span.finish(result)
	}
}

fn parse_token_response(body: &[u8], issued_at: OffsetDateTime) -> Result<CachedToken> {
	let rejected = |source| Error::AuthResponse {
		path: TOKEN_PATH.to_owned(),
		body: String::from_utf8_lossy(body).into_owned(),
		source,
	};
	let response: TokenResponse =
		serde_path_to_error::deserialize(&mut serde_json::Deserializer::from_slice(body))
			.map_err(|e| rejected(AuthResponseError::Parse(e)))?;
	let access_token =
		response.access_token.ok_or_else(|| rejected(AuthResponseError::MissingAccessToken))?;
	let mut token = CachedToken::new(TokenSecret::new(access_token), issued_at);

	if let Some(secs) = response.expires_in.as_ref().and_then(serde_json::Value::as_i64) {
		token = token.with_expires_in(Duration::seconds(secs));
	}

	Ok(token)
}
