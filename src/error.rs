//! Client-level error types shared by the transport, the response pipeline, and callers.

// self
use crate::{_prelude::*, envelope::StatusClass};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error returned by [`Client::request`](crate::client::Client::request).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The server answered but its envelope did not report a `2xx` domain status.
	#[error(transparent)]
	Domain(#[from] DomainFailure),
	/// No usable response (connection, timeout, HTTP status, malformed body).
	#[error(transparent)]
	Transport(#[from] TransportFault),

	/// Request body could not be serialized into JSON.
	#[error("Request body could not be serialized.")]
	RequestBody(#[source] serde_json::Error),
	/// Envelope payload could not be decoded into the caller's type.
	#[error("Response payload does not match the expected shape at `{path}`.")]
	Payload {
		/// JSON path where decoding stopped.
		path: String,
		/// Underlying decoding failure.
		#[source]
		source: serde_json::Error,
	},
}
impl Error {
	/// Returns `true` when the failure carries the authentication-denial signal.
	pub fn is_denial(&self) -> bool {
		matches!(self, Self::Transport(fault) if fault.is_denial())
	}

	/// Returns the domain failure body when the server rejected the call at the domain level.
	pub fn as_domain(&self) -> Option<&DomainFailure> {
		match self {
			Self::Domain(failure) => Some(failure),
			_ => None,
		}
	}

	/// Returns the transport fault when the call never produced a usable response.
	pub fn as_transport(&self) -> Option<&TransportFault> {
		match self {
			Self::Transport(fault) => Some(fault),
			_ => None,
		}
	}
}
impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Payload { path, source: e.into_inner() }
	}
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Default timeout must be strictly positive.
	#[error("Timeout must be greater than zero milliseconds.")]
	NonPositiveTimeout,
	/// Header name or value cannot be sent over HTTP.
	#[error("Header `{name}` is not a valid HTTP header.")]
	InvalidHeader {
		/// Offending header name.
		name: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Envelope body returned by the server alongside a non-success domain status.
///
/// The body is surfaced exactly as received so callers can read server-specific fields.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainFailure {
	body: Value,
}
impl DomainFailure {
	/// Wraps an envelope body.
	pub fn new(body: Value) -> Self {
		Self { body }
	}

	/// Raw envelope body.
	pub fn body(&self) -> &Value {
		&self.body
	}

	/// Consumes the failure and returns the raw envelope body.
	pub fn into_body(self) -> Value {
		self.body
	}

	/// Domain status code, when the envelope carries a string `code`.
	pub fn code(&self) -> Option<&str> {
		self.body.get("code").and_then(Value::as_str)
	}

	/// Domain status class derived from [`code`](Self::code).
	pub fn status_class(&self) -> StatusClass {
		self.code().map(StatusClass::of).unwrap_or(StatusClass::Unknown)
	}

	/// Server-supplied message (`msg` or `message`).
	pub fn message(&self) -> Option<&str> {
		["msg", "message"].iter().find_map(|key| self.body.get(*key).and_then(Value::as_str))
	}
}
impl Display for DomainFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(
			f,
			"Server reported domain status {}: {}.",
			self.code().unwrap_or("<missing>"),
			self.message().unwrap_or("no message")
		)
	}
}
impl StdError for DomainFailure {}

/// Closed set of transport fault categories, assigned where the fault occurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultKind {
	/// Server refused the credentials (HTTP 401).
	Unauthorized,
	/// Request exceeded its timeout.
	Timeout,
	/// Connection, DNS, or TLS failure.
	Network,
	/// Server answered with a non-success HTTP status other than 401.
	HttpStatus,
	/// Response body was not a JSON envelope.
	Malformed,
	/// Request could not be built (bad URL, method, or header).
	Request,
}
impl FaultKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FaultKind::Unauthorized => "unauthorized",
			FaultKind::Timeout => "timeout",
			FaultKind::Network => "network",
			FaultKind::HttpStatus => "http_status",
			FaultKind::Malformed => "malformed",
			FaultKind::Request => "request",
		}
	}

	/// Classifies a non-success HTTP status.
	pub const fn from_status(status: u16) -> Self {
		match status {
			401 => FaultKind::Unauthorized,
			_ => FaultKind::HttpStatus,
		}
	}
}
impl Display for FaultKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Transport-level failure: no response, or a response unusable as an envelope.
#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct TransportFault {
	kind: FaultKind,
	status: Option<u16>,
	message: String,
	#[source]
	source: Option<BoxError>,
}
impl TransportFault {
	/// Creates a fault of the given kind.
	pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
		Self { kind, status: None, message: message.into(), source: None }
	}

	/// Builds the fault raised when the server answers with a non-success HTTP status.
	pub fn http_status(status: u16) -> Self {
		Self::new(FaultKind::from_status(status), format!("Request failed with status code {status}"))
			.with_status(status)
	}

	/// Classifies a fault that only exposes a textual description.
	///
	/// Descriptions carrying the denial marker become [`FaultKind::Unauthorized`]; everything
	/// else falls back to `fallback`.
	pub fn from_message(message: impl Into<String>, fallback: FaultKind) -> Self {
		let message = message.into();
		let kind = if crate::denial::is_denial_message(&message) {
			FaultKind::Unauthorized
		} else {
			fallback
		};

		Self::new(kind, message)
	}

	/// Attaches the HTTP status observed by the transport.
	pub fn with_status(mut self, status: u16) -> Self {
		self.status = Some(status);

		self
	}

	/// Attaches the underlying transport error.
	pub fn with_source(mut self, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		self.source = Some(Box::new(src));

		self
	}

	/// Fault category.
	pub fn kind(&self) -> FaultKind {
		self.kind
	}

	/// HTTP status, when the server answered at all.
	pub fn status(&self) -> Option<u16> {
		self.status
	}

	/// Human-readable description.
	pub fn message(&self) -> &str {
		&self.message
	}

	/// Returns `true` when the fault signals an authentication denial.
	pub fn is_denial(&self) -> bool {
		matches!(self.kind, FaultKind::Unauthorized)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn domain_failure_exposes_server_fields() {
		let failure =
			DomainFailure::new(serde_json::json!({ "code": "500", "msg": "insufficient funds" }));

		assert_eq!(failure.code(), Some("500"));
		assert_eq!(failure.message(), Some("insufficient funds"));
		assert_eq!(failure.status_class(), StatusClass::ServerError);
		assert_eq!(
			failure.to_string(),
			"Server reported domain status 500: insufficient funds."
		);
	}

	#[test]
	fn http_status_fault_classifies_unauthorized() {
		let denied = TransportFault::http_status(401);

		assert_eq!(denied.kind(), FaultKind::Unauthorized);
		assert_eq!(denied.status(), Some(401));
		assert_eq!(denied.to_string(), "Request failed with status code 401");
		assert!(denied.is_denial());

		let server = TransportFault::http_status(500);

		assert_eq!(server.kind(), FaultKind::HttpStatus);
		assert!(!server.is_denial());
	}

	#[test]
	fn textual_faults_fall_back_unless_marked() {
		let denied =
			TransportFault::from_message("Request failed with status code 401", FaultKind::Network);

		assert!(denied.is_denial());

		let aborted = TransportFault::from_message("ECONNABORTED", FaultKind::Timeout);

		assert_eq!(aborted.kind(), FaultKind::Timeout);
		assert!(!Error::from(aborted).is_denial());
	}
}
