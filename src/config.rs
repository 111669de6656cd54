//! Client configuration: credentials, request timeout, and API origin.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Production SendPulse API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.sendpulse.com";
/// Request timeout applied when the configuration omits one.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings consumed by [`Client`](crate::Client).
///
/// The struct deserializes from any serde format so hosts can load it however they like;
/// `timeout_secs` and `base_url` fall back to [`DEFAULT_TIMEOUT_SECS`] and
/// [`DEFAULT_BASE_URL`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// OAuth 2.0 client identifier (SendPulse "ID").
	pub user_id: String,
	/// OAuth 2.0 client secret.
	pub secret: String,
	/// Per-request timeout in seconds.
	#[serde(default = "default_timeout_secs")]
	pub timeout_secs: u64,
	/// API origin every request path is appended to.
	#[serde(default = "default_base_url")]
	pub base_url: Url,
}
impl ClientConfig {
	/// Creates a configuration for the production API with the default timeout.
	pub fn new(user_id: impl Into<String>, secret: impl Into<String>) -> Self {
		Self {
			user_id: user_id.into(),
			secret: secret.into(),
			timeout_secs: DEFAULT_TIMEOUT_SECS,
			base_url: default_base_url(),
		}
	}

	/// Overrides the per-request timeout.
	pub fn with_timeout_secs(mut self, secs: u64) -> Self {
		self.timeout_secs = secs;

		self
	}

	/// Points the client at another origin (staging, mock servers).
	pub fn with_base_url(mut self, url: Url) -> Self {
		self.base_url = url;

		self
	}

	/// Per-request timeout as a [`std::time::Duration`].
	pub fn timeout(&self) -> StdDuration {
		StdDuration::from_secs(self.timeout_secs)
	}

	/// Checks the settings before a client is built.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.user_id.trim().is_empty() {
			return Err(ConfigError::MissingUserId);
		}
		if self.secret.is_empty() {
			return Err(ConfigError::MissingSecret);
		}
		if self.timeout_secs == 0 {
			return Err(ConfigError::ZeroTimeout);
		}

		match self.base_url.scheme() {
			"http" | "https" => Ok(()),
			scheme => Err(ConfigError::UnsupportedScheme { scheme: scheme.to_owned() }),
		}
	}

	/// Joins the origin and a request path (`/oauth/access_token`, `/addressbooks`).
	///
	/// The path must start with `/`, and the joined URL must keep the scheme, host, and port of
	/// [`Self::base_url`]; the bearer token is never sent anywhere else.
	pub(crate) fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let raw = format!("{}{path}", self.base_url.as_str().trim_end_matches('/'));

		if !path.starts_with('/') {
			return Err(ConfigError::InvalidUrl { url: raw, source: None });
		}

		let url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
			url: raw.clone(),
			source: Some(source),
		})?;
		let base = &self.base_url;

		if url.scheme() != base.scheme()
			|| url.host_str() != base.host_str()
			|| url.port_or_known_default() != base.port_or_known_default()
			|| !url.username().is_empty()
			|| url.password().is_some()
		{
			return Err(ConfigError::InvalidUrl { url: raw, source: None });
		}

		Ok(url)
	}
}
impl Debug for ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientConfig")
			.field("user_id", &self.user_id)
			.field("secret", &"<redacted>")
			.field("timeout_secs", &self.timeout_secs)
			.field("base_url", &self.base_url.as_str())
			.finish()
	}
}

fn default_timeout_secs() -> u64 {
	DEFAULT_TIMEOUT_SECS
}

fn default_base_url() -> Url {
	Url::parse(DEFAULT_BASE_URL).expect("Default base URL must parse.")
}
