//! Response envelope produced by the transfer service.
//!
//! Every body the service returns is a JSON object carrying a domain status in `code` (a
//! string such as `"200"` or `"50001"`) and, on success, the payload under `data`. The domain
//! status is authoritative: a transport-level `200` whose envelope says `"500"` is a failure.

// self
use crate::{_prelude::*, error::DomainFailure};

/// Domain status class derived from the first character of an envelope `code`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusClass {
	/// `1xx`.
	Informational,
	/// `2xx`; the only class treated as success.
	Success,
	/// `3xx`.
	Redirection,
	/// `4xx`.
	ClientError,
	/// `5xx`.
	ServerError,
	/// Missing, empty, or unrecognized code.
	Unknown,
}
impl StatusClass {
	/// Classifies a domain status code by its leading character.
	pub fn of(code: &str) -> Self {
		match code.chars().next() {
			Some('1') => StatusClass::Informational,
			Some('2') => StatusClass::Success,
			Some('3') => StatusClass::Redirection,
			Some('4') => StatusClass::ClientError,
			Some('5') => StatusClass::ServerError,
			_ => StatusClass::Unknown,
		}
	}

	/// Returns `true` only for [`StatusClass::Success`].
	pub const fn is_success(self) -> bool {
		matches!(self, StatusClass::Success)
	}
}

/// Decoded response body awaiting classification.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope(Value);
impl Envelope {
	/// Wraps an already-decoded body.
	pub fn new(body: Value) -> Self {
		Self(body)
	}

	/// Decodes raw response bytes. An empty body decodes to JSON `null`.
	pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Self(Value::Null));
		}

		serde_json::from_slice(bytes).map(Self)
	}

	/// Domain status code, when present as a string.
	pub fn code(&self) -> Option<&str> {
		self.0.get("code").and_then(Value::as_str)
	}

	/// Domain status class; non-string or missing codes classify as [`StatusClass::Unknown`].
	pub fn status_class(&self) -> StatusClass {
		self.code().map(StatusClass::of).unwrap_or(StatusClass::Unknown)
	}

	/// Borrows the raw body.
	pub fn body(&self) -> &Value {
		&self.0
	}

	/// Consumes the envelope and returns the raw body.
	pub fn into_body(self) -> Value {
		self.0
	}

	/// Splits the envelope into its payload or a [`DomainFailure`] carrying the whole body.
	///
	/// A success envelope without `data` yields JSON `null`.
	pub fn into_payload(self) -> Result<Value, DomainFailure> {
		if !self.status_class().is_success() {
			return Err(DomainFailure::new(self.0));
		}

		match self.0 {
			Value::Object(mut map) => Ok(map.remove("data").unwrap_or(Value::Null)),
			_ => Ok(Value::Null),
		}
	}
}
impl From<Value> for Envelope {
	fn from(body: Value) -> Self {
		Self(body)
	}
}
