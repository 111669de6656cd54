//! The SendPulse API client: configuration, transport, and the shared token cache.

mod execute;
mod token;

pub use token::TOKEN_PATH;

// self
use crate::{
	_prelude::*,
	auth::TokenCache,
	config::ClientConfig,
	http::ApiHttpClient,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = Client<ReqwestHttpClient>;

/// Issues SendPulse API calls with a cached client-credentials token.
///
/// Clones share the transport, configuration, and token cache, so a token issued through one
/// clone is reused by all of them.
pub struct Client<C>
where
	C: ApiHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	config: Arc<ClientConfig>,
	tokens: Arc<TokenCache>,
}
impl<C> Client<C>
where
	C: ApiHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: ClientConfig, http_client: impl Into<Arc<C>>) -> Result<Self> {
		config.validate()?;

		Ok(Self {
			http_client: http_client.into(),
			config: Arc::new(config),
			tokens: Default::default(),
		})
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Token cache shared by every clone of this client.
	pub fn token_cache(&self) -> &TokenCache {
		&self.tokens
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient> {
	/// Creates a client backed by a fresh reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::default())
	}
}
impl<C> Clone for Client<C>
where
	C: ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			config: self.config.clone(),
			tokens: self.tokens.clone(),
		}
	}
}
impl<C> Debug for Client<C>
where
	C: ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.config)
			.field("token_cached", &self.tokens.peek().is_some())
			.finish()
	}
}
