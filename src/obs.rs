//! Optional observability helpers for client requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run every request inside an `etransfer_request.call` span with the
//!   `method` and `path` fields, and to log denials and panicking denial handlers.
//! - Enable `metrics` to increment the `etransfer_request_total` counter for every
//!   attempt/success/failure, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, error::Error};

/// Outcome labels recorded for each request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
	/// Entry to [`Client::request`](crate::client::Client::request).
	Attempt,
	/// Envelope reported a `2xx` domain status and the payload decoded.
	Success,
	/// Envelope reported a non-success domain status.
	DomainFailure,
	/// No usable response.
	TransportFault,
	/// Transport fault carrying the authentication-denial signal.
	Denied,
	/// Payload did not fit the caller's type.
	PayloadMismatch,
	/// Request body could not be serialized.
	InvalidRequest,
}
impl RequestOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestOutcome::Attempt => "attempt",
			RequestOutcome::Success => "success",
			RequestOutcome::DomainFailure => "domain_failure",
			RequestOutcome::TransportFault => "transport_fault",
			RequestOutcome::Denied => "denied",
			RequestOutcome::PayloadMismatch => "payload_mismatch",
			RequestOutcome::InvalidRequest => "invalid_request",
		}
	}

	/// Maps a finished call to its outcome label.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => RequestOutcome::Success,
			Err(e) if e.is_denial() => RequestOutcome::Denied,
			Err(Error::Domain(_)) => RequestOutcome::DomainFailure,
			Err(Error::Payload { .. }) => RequestOutcome::PayloadMismatch,
			Err(Error::Config(_) | Error::RequestBody(_)) => RequestOutcome::InvalidRequest,
			Err(Error::Transport(_)) => RequestOutcome::TransportFault,
		}
	}
}
impl Display for RequestOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
