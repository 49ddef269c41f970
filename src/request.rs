//! Per-call request descriptors and the shaped request handed to transports.

// std
use std::time::Duration as StdDuration;
// self
use crate::_prelude::*;

/// HTTP methods used against the transfer service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`.
	Get,
	/// `POST`.
	Post,
	/// `PUT`.
	Put,
	/// `PATCH`.
	Patch,
	/// `DELETE`.
	Delete,
}
impl Method {
	/// Returns the wire form of the method.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Patch => "PATCH",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Caller-supplied description of a single call.
///
/// Descriptors are built fresh for every invocation and consumed by
/// [`Client::request`](crate::client::Client::request). Authentication headers are never set
/// here; the client attaches them.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestDescriptor {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the client's base URL, or an absolute URL.
	pub path: String,
	/// Query string pairs, appended in order.
	pub query: Vec<(String, String)>,
	/// JSON body, if any.
	pub body: Option<Value>,
	/// Extra headers for this call only.
	pub headers: BTreeMap<String, String>,
	/// Overrides the client's default timeout.
	pub timeout: Option<StdDuration>,
}
impl RequestDescriptor {
	/// Creates a descriptor for `method` + `path`.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: None,
			headers: BTreeMap::new(),
			timeout: None,
		}
	}

	/// Shorthand for a `GET` descriptor.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::Get, path)
	}

	/// Shorthand for a `POST` descriptor.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::Post, path)
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Serializes `params` into query pairs. Non-object values and `null` fields are skipped.
	pub fn query_params<P>(mut self, params: &P) -> Result<Self, serde_json::Error>
	where
		P: ?Sized + Serialize,
	{
		if let Value::Object(map) = serde_json::to_value(params)? {
			for (key, value) in map {
				match value {
					Value::Null => {},
					Value::String(text) => self.query.push((key, text)),
					other => self.query.push((key, other.to_string())),
				}
			}
		}

		Ok(self)
	}

	/// Sets the JSON body.
	pub fn json<B>(mut self, body: &B) -> Result<Self, serde_json::Error>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_value(body)?);

		Ok(self)
	}

	/// Adds a header for this call only.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Overrides the client's default timeout for this call.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// Fully shaped request handed to an [`HttpTransport`](crate::transport::HttpTransport).
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute or base-relative URL.
	pub url: String,
	/// Headers, including the client's fixed authentication header.
	pub headers: BTreeMap<String, String>,
	/// Query string pairs.
	pub query: Vec<(String, String)>,
	/// JSON body, if any.
	pub body: Option<Value>,
	/// Effective timeout.
	pub timeout: StdDuration,
}

/// Joins `base` and `path` the way the service expects: absolute `path`s win, otherwise the
/// two are concatenated with exactly one `/` between them.
pub fn resolve_url(base: &str, path: &str) -> String {
	if path.starts_with("http://") || path.starts_with("https://") {
		return path.to_owned();
	}
	if path.is_empty() {
		return base.to_owned();
	}

	format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
