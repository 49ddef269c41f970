//! Client configuration.

// std
use std::time::Duration as StdDuration;
// self
use crate::{_prelude::*, error::ConfigError};

/// Header carrying the fixed authentication value on every outgoing request.
pub const CSRF_HEADER: &str = "x-csrf-token";
/// Default value of [`CSRF_HEADER`].
pub const DEFAULT_CSRF_TOKEN: &str = "AUTH_TOKEN";
/// Default base URL; relative so the demo app can sit behind the same origin as the service.
pub const DEFAULT_BASE_URL: &str = "/";
/// Default per-request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 50_000;

/// Settings a [`Client`](crate::client::Client) is bound to at construction.
///
/// Deserializes from any serde format with every field optional, e.g.
/// `{ "base_url": "https://etransfer.example.com", "timeout_ms": 10000 }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
	/// Base URL prefixed to every request path. May be relative.
	pub base_url: String,
	/// Default timeout in milliseconds; must be greater than zero.
	pub timeout_ms: u64,
	/// Value sent in [`CSRF_HEADER`].
	pub csrf_token: String,
}
impl ClientConfig {
	/// Creates a config for `base_url` + `timeout_ms` with the default token.
	pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
		Self { base_url: base_url.into(), timeout_ms, ..Self::default() }
	}

	/// Overrides the fixed authentication header value.
	pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
		self.csrf_token = token.into();

		self
	}

	/// Default timeout as a [`StdDuration`].
	pub fn timeout(&self) -> StdDuration {
		StdDuration::from_millis(self.timeout_ms)
	}

	/// Checks the invariants the client relies on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.timeout_ms == 0 {
			return Err(ConfigError::NonPositiveTimeout);
		}
		if !is_header_value(&self.csrf_token) {
			return Err(ConfigError::InvalidHeader { name: CSRF_HEADER.into() });
		}

		Ok(())
	}

	/// Headers attached to every request issued by a client built from this config.
	pub fn default_headers(&self) -> BTreeMap<String, String> {
		BTreeMap::from([(CSRF_HEADER.to_owned(), self.csrf_token.clone())])
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.into(),
			timeout_ms: DEFAULT_TIMEOUT_MS,
			csrf_token: DEFAULT_CSRF_TOKEN.into(),
		}
	}
}

fn is_header_value(value: &str) -> bool {
	value.bytes().all(|b| b == b'\t' || (0x20..0x7f).contains(&b))
}
