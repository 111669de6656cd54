//! Single-slot access-token cache guarded by a reader/writer lock.
//!
//! The cache is a two-state machine: [`TokenState::NoToken`] moves to
//! [`TokenState::HasToken`] when an issuance succeeds, and any `401` or explicit
//! [`TokenCache::clear`] moves it back. A token whose `expires_at` has passed reads as
//! `NoToken`. Locks are only held long enough to copy or replace the state, never across an
//! issuance request, so concurrent callers on an empty cache may each issue a token; the last
//! writer wins.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access token plus the lifetime the token endpoint advertised for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
	/// Bearer token value.
	pub secret: TokenSecret,
	/// Instant the token was received.
	pub issued_at: OffsetDateTime,
	/// Instant the token stops being used, when the endpoint reported `expires_in`.
	pub expires_at: Option<OffsetDateTime>,
}
impl CachedToken {
	/// Wraps a token that lives until it is cleared.
	pub fn new(secret: TokenSecret, issued_at: OffsetDateTime) -> Self {
		Self { secret, issued_at, expires_at: None }
	}

	/// Sets the expiry relative to `issued_at`; non-positive lifetimes are ignored.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		if expires_in.is_positive() {
			self.expires_at = self.issued_at.checked_add(expires_in);
		}

		self
	}

	/// Returns `true` once the token has reached its expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}
}

/// Lifecycle of the cached credential.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TokenState {
	/// No token cached; the next authenticated call issues one.
	#[default]
	NoToken,
	/// A token is cached.
	HasToken(CachedToken),
}
impl TokenState {
	/// Returns the cached token if it is still usable at `instant`.
	pub fn usable_at(&self, instant: OffsetDateTime) -> Option<&CachedToken> {
		match self {
			Self::HasToken(token) if !token.is_expired_at(instant) => Some(token),
			_ => None,
		}
	}
}

/// Shared holder for the client's single access token.
#[derive(Debug, Default)]
pub struct TokenCache {
	state: RwLock<TokenState>,
}
impl TokenCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Copies the current state.
	pub fn state(&self) -> TokenState {
		self.state.read().clone()
	}

	/// Returns the cached token when one is usable right now, without issuing.
	pub fn peek(&self) -> Option<TokenSecret> {
		let now = OffsetDateTime::now_utc();

		self.state.read().usable_at(now).map(|token| token.secret.clone())
	}

	/// Replaces the cached token.
	pub fn store(&self, token: CachedToken) {
		*self.state.write() = TokenState::HasToken(token);
	}

	/// Drops the cached token. Idempotent.
	pub fn clear(&self) {
		*self.state.write() = TokenState::NoToken;
	}

	/// Returns the cached token, or runs `issue` and caches its result when none is usable.
	///
	/// Failures from `issue` are returned unchanged and leave the cache empty.
	pub async fn get_or_issue<F, Fut>(&self, issue: F) -> Result<TokenSecret>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<CachedToken>>,
	{
		if let Some(secret) = self.peek() {
			return Ok(secret);
		}

		let token = issue().await?;
		let secret = token.secret.clone();

		self.store(token);

		Ok(secret)
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::error::{AuthResponseError, Error};

	fn token(value: &str) -> CachedToken {
		CachedToken::new(TokenSecret::new(value), OffsetDateTime::now_utc())
	}

	#[test]
	fn state_transitions_follow_store_and_clear() {
		let cache = TokenCache::new();

		assert_eq!(cache.state(), TokenState::NoToken);

		cache.store(token("first"));

		assert_eq!(cache.peek().map(|secret| secret.expose().to_owned()), Some("first".into()));

		cache.clear();
		cache.clear();

		assert_eq!(cache.state(), TokenState::NoToken);
		assert!(cache.peek().is_none());
	}

	#[test]
	fn empty_token_string_is_still_a_token() {
		let cache = TokenCache::new();

		cache.store(token(""));

		assert_eq!(cache.peek(), Some(TokenSecret::new("")));
	}

	#[test]
	fn expired_token_reads_as_missing() {
		let issued_at = OffsetDateTime::now_utc() - Duration::hours(2);
		let expired = CachedToken::new(TokenSecret::new("old"), issued_at)
			.with_expires_in(Duration::hours(1));
		let eternal =
			CachedToken::new(TokenSecret::new("kept"), issued_at).with_expires_in(Duration::ZERO);

		assert!(expired.is_expired_at(OffsetDateTime::now_utc()));
		assert!(TokenState::HasToken(expired).usable_at(OffsetDateTime::now_utc()).is_none());
		assert!(eternal.expires_at.is_none());
	}

	#[tokio::test]
	async fn get_or_issue_issues_once_then_reuses() {
		let cache = TokenCache::new();
		let issued = AtomicUsize::new(0);
		let counter = &issued;
		let issue = move || async move {
			counter.fetch_add(1, Ordering::SeqCst);

			Ok(token("issued"))
		};
		let first = cache.get_or_issue(issue).await.expect("First issuance should succeed.");
		let second = cache.get_or_issue(issue).await.expect("Cached lookup should succeed.");

		assert_eq!(first.expose(), "issued");
		assert_eq!(second.expose(), "issued");
		assert_eq!(issued.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn failed_issuance_leaves_cache_empty() {
		let cache = TokenCache::new();
		let err = cache
			.get_or_issue(|| async {
				Err(Error::AuthResponse {
					path: "/oauth/access_token".into(),
					body: "{\"foo\":\"bar\"}".into(),
					source: AuthResponseError::MissingAccessToken,
				})
			})
			.await
			.expect_err("Issuance failure should propagate.");

		assert!(matches!(err, Error::AuthResponse { .. }));
		assert_eq!(cache.state(), TokenState::NoToken);
	}

	#[tokio::test]
	async fn expired_token_is_reissued() {
		let cache = TokenCache::new();

		cache.store(
			CachedToken::new(TokenSecret::new("stale"), OffsetDateTime::now_utc() - Duration::hours(2))
				.with_expires_in(Duration::hours(1)),
		);

		let secret = cache
			.get_or_issue(|| async { Ok(token("fresh")) })
			.await
			.expect("Expired token should be replaced.");

		assert_eq!(secret.expose(), "fresh");
	}
}
