//! Client-level error types shared by the token cache, the request executor, and transports.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Status reported for transport failures, mirroring `503 Service Unavailable`.
pub const TRANSPORT_FAILURE_STATUS: u16 = 503;

/// Canonical client error exposed by public APIs.
///
/// Every variant except [`Error::Config`] carries the request path so callers can log or branch
/// on the failing call; see [`Error::record`] for a flat snapshot.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Network failure (DNS, TCP, TLS, timeout, IO) while calling the API.
	#[error("Transport failure while calling `{path}`: {source}")]
	Transport {
		/// Request path that failed.
		path: String,
		/// Underlying transport failure.
		#[source]
		source: TransportError,
	},
	/// Token endpoint answered `200` with a body that does not yield an access token.
	#[error("Token endpoint `{path}` returned an unusable response: {source}")]
	AuthResponse {
		/// Token endpoint path.
		path: String,
		/// Raw response body.
		body: String,
		/// Parsing failure or missing field.
		#[source]
		source: AuthResponseError,
	},
	/// API kept answering `401` after the cached token was replaced once.
	#[error("Request to `{path}` is still unauthorized after refreshing the access token.")]
	Unauthorized {
		/// Request path that was rejected.
		path: String,
		/// Raw body of the final `401` response.
		body: String,
	},
	/// API answered with a status other than `200`.
	#[error("Request to `{path}` failed with HTTP {status}.")]
	Api {
		/// HTTP status code.
		status: u16,
		/// Request path that failed.
		path: String,
		/// Raw response body.
		body: String,
	},
}
impl Error {
	/// HTTP status associated with the failure.
	///
	/// Transport failures report `503`, token parsing failures report the `200` the token
	/// endpoint answered with, and configuration problems report nothing.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Config(_) => None,
			Self::Transport { .. } => Some(TRANSPORT_FAILURE_STATUS),
			Self::AuthResponse { .. } => Some(200),
			Self::Unauthorized { .. } => Some(401),
			Self::Api { status, .. } => Some(*status),
		}
	}

	/// Request path tied to the failure, if any.
	pub fn path(&self) -> Option<&str> {
		match self {
			Self::Config(_) => None,
			Self::Transport { path, .. }
			| Self::AuthResponse { path, .. }
			| Self::Unauthorized { path, .. }
			| Self::Api { path, .. } => Some(path),
		}
	}

	/// Raw response body, when a response was received.
	pub fn body(&self) -> Option<&str> {
		match self {
			Self::Config(_) | Self::Transport { .. } => None,
			Self::AuthResponse { body, .. }
			| Self::Unauthorized { body, .. }
			| Self::Api { body, .. } => Some(body),
		}
	}

	/// Explanatory message for failures that are not fully described by status and body.
	pub fn message(&self) -> Option<String> {
		match self {
			Self::Config(e) => Some(e.to_string()),
			Self::Transport { source, .. } => Some(source.to_string()),
			Self::AuthResponse { source, .. } => Some(source.to_string()),
			Self::Unauthorized { .. } | Self::Api { .. } => None,
		}
	}

	/// Flattens the error into a serializable diagnostic record.
	pub fn record(&self) -> ErrorRecord {
		ErrorRecord {
			status: self.status(),
			path: self.path().map(ToOwned::to_owned),
			body: self.body().map(ToOwned::to_owned),
			message: self.message(),
		}
	}
}

/// Flat diagnostic snapshot of an [`Error`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
	/// HTTP status code, when one applies.
	pub status: Option<u16>,
	/// Request path.
	pub path: Option<String>,
	/// Raw response body.
	pub body: Option<String>,
	/// Optional explanatory message.
	pub message: Option<String>,
}

/// Configuration and request construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Base URL and path do not form a valid URL on the configured origin.
	#[error("Request URL `{url}` is invalid or leaves the configured origin.")]
	InvalidUrl {
		/// Offending URL text.
		url: String,
		/// Parsing failure, when the text is not a URL at all.
		#[source]
		source: Option<url::ParseError>,
	},
	/// HTTP method name cannot be parsed.
	#[error("HTTP method `{method}` is invalid.")]
	InvalidMethod {
		/// Offending method name.
		method: String,
	},

	/// Client id is empty.
	#[error("Client user id must not be empty.")]
	MissingUserId,
	/// Client secret is empty.
	#[error("Client secret must not be empty.")]
	MissingSecret,
	/// Request timeout is zero.
	#[error("Request timeout must be at least one second.")]
	ZeroTimeout,
	/// Base URL uses a scheme other than HTTP(S).
	#[error("Base URL scheme `{scheme}` is not supported; use http or https.")]
	UnsupportedScheme {
		/// Offending scheme.
		scheme: String,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("{source}")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("{0}")]
	Io(#[from] std::io::Error),
	/// Transport reported a failure without a structured error.
	#[error("{message}")]
	Other {
		/// Transport-supplied description.
		message: String,
	},
}

/// Reasons a `200` token endpoint response is rejected.
#[derive(Debug, ThisError)]
pub enum AuthResponseError {
	/// Body is not JSON, or `access_token` has the wrong type.
	#[error("Malformed JSON: {0}.")]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// Body is JSON but has no `access_token`.
	#[error("'access_token' not found in response.")]
	MissingAccessToken,
}
