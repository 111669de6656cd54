//! Request descriptors and their form-encoded wire shape.

// crates.io
use oauth2::{
	HttpRequest,
	http::{
		Method,
		header::{AUTHORIZATION, CONTENT_TYPE},
	},
};
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Content type sent with every non-GET request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// One API call: path, method, parameters, and whether a bearer token is attached.
///
/// Parameters are kept in key order, so the encoded query string or body is deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
	/// Path appended to the configured origin, e.g. `/addressbooks`.
	pub path: String,
	/// HTTP method.
	pub method: Method,
	/// Parameter name to value mapping.
	pub params: BTreeMap<String, String>,
	/// Attaches `Authorization: Bearer <token>` when true.
	pub use_token: bool,
}
impl ApiRequest {
	/// Creates an authenticated request without parameters.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { path: path.into(), method, params: BTreeMap::new(), use_token: true }
	}

	/// Creates a request from a method name; the name is upper-cased before parsing.
	pub fn with_method_name(method: &str, path: impl Into<String>) -> Result<Self, ConfigError> {
		let upper = method.trim().to_ascii_uppercase();
		let method = Method::from_bytes(upper.as_bytes())
			.map_err(|_| ConfigError::InvalidMethod { method: method.to_owned() })?;

		Ok(Self::new(method, path))
	}

	/// Authenticated `GET`.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Authenticated `POST`.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Authenticated `PUT`.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// Authenticated `DELETE`.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Adds or replaces one parameter; values are rendered with [`Display`].
	pub fn param(mut self, name: impl Into<String>, value: impl Display) -> Self {
		self.params.insert(name.into(), value.to_string());

		self
	}

	/// Adds or replaces several parameters.
	pub fn params<I, K, V>(mut self, params: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Display,
	{
		self.params.extend(params.into_iter().map(|(k, v)| (k.into(), v.to_string())));

		self
	}

	/// Sends the request without a bearer token.
	pub fn without_token(mut self) -> Self {
		self.use_token = false;

		self
	}

	/// Form-encodes the parameters (`a=1&b=two`).
	pub fn encoded_params(&self) -> String {
		form_urlencoded::Serializer::new(String::new()).extend_pairs(&self.params).finish()
	}

	/// Builds the HTTP request against `url`.
	///
	/// `GET` carries the parameters on the query string and an empty body; every other method
	/// carries them as a form-encoded body.
	pub(crate) fn to_http(&self, mut url: Url, token: Option<&TokenSecret>) -> Result<HttpRequest> {
		let is_get = self.method == Method::GET;
		let body = if is_get {
			if !self.params.is_empty() {
				url.query_pairs_mut().extend_pairs(&self.params);
			}

			Vec::new()
		} else {
			self.encoded_params().into_bytes()
		};
		let mut builder =
			oauth2::http::Request::builder().method(self.method.clone()).uri(url.as_str());

		if !is_get {
			builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE);
		}
		if let Some(token) = token {
			builder = builder.header(AUTHORIZATION, token.bearer_header());
		}

		builder.body(body).map_err(|e| ConfigError::from(e).into())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse test URL.")
	}

	#[test]
	fn get_places_params_on_query_string() {
		let request = ApiRequest::get("/addressbooks").param("limit", 10).param("offset", 0);
		let http = request
			.to_http(url("https://api.example.com/addressbooks"), None)
			.expect("GET request should build.");

		assert_eq!(http.method(), Method::GET);
		assert_eq!(
			http.uri().to_string(),
			"https://api.example.com/addressbooks?limit=10&offset=0"
		);
		assert!(http.body().is_empty());
		assert!(http.headers().get(CONTENT_TYPE).is_none());
	}

	#[test]
	fn get_without_params_has_no_query() {
		let http = ApiRequest::get("/balance")
			.to_http(url("https://api.example.com/balance"), None)
			.expect("GET request should build.");

		assert_eq!(http.uri().to_string(), "https://api.example.com/balance");
	}

	#[test]
	fn post_places_params_in_form_body() {
		let request = ApiRequest::post("/addressbooks").param("bookName", "VIP list & co");
		let token = TokenSecret::new("abc");
		let http = request
			.to_http(url("https://api.example.com/addressbooks"), Some(&token))
			.expect("POST request should build.");

		assert_eq!(http.uri().to_string(), "https://api.example.com/addressbooks");
		assert_eq!(http.body().as_slice(), b"bookName=VIP+list+%26+co");
		assert_eq!(
			http.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
			Some(FORM_CONTENT_TYPE)
		);
		assert_eq!(
			http.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
			Some("Bearer abc")
		);
	}

	#[test]
	fn method_names_are_uppercased() {
		let request = ApiRequest::with_method_name("patch", "/emails/1")
			.expect("Lowercase method names should parse.");

		assert_eq!(request.method, Method::PATCH);
		assert!(request.use_token);
		assert!(matches!(
			ApiRequest::with_method_name("BAD METHOD", "/x"),
			Err(ConfigError::InvalidMethod { .. })
		));
	}

	#[test]
	fn params_encode_in_key_order() {
		let request =
			ApiRequest::put("/x").params([("zeta", "1"), ("alpha", "2")]).without_token();

		assert_eq!(request.encoded_params(), "alpha=2&zeta=1");
		assert!(!request.use_token);
	}
}
