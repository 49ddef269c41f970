//! Transport primitives for talking to the transfer service.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP stack. Implementations send an
//! [`OutgoingRequest`] and hand back the [`RawResponse`] for *any* HTTP status; the client
//! turns non-success statuses into [`TransportFault`]s itself. Failures that happen before a
//! response exists (DNS, TCP, TLS, timeouts) must be classified into a [`FaultKind`] where
//! they occur, so the response pipeline never has to re-derive the kind from text.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	envelope::Envelope,
	error::{FaultKind, TransportFault},
	request::OutgoingRequest,
};
#[cfg(feature = "reqwest")] use crate::request::Method;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<RawResponse, TransportFault>> + 'a + Send>>;

/// Abstraction over HTTP stacks able to carry client requests.
///
/// Implementations must be `Send + Sync + 'static` so one transport can back many clients,
/// and the returned future must be `Send` so callers can spawn requests onto any executor.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and resolves once the full body has been read.
	fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_>;
}

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
	/// HTTP status code.
	pub status: u16,
	/// Undecoded body bytes.
	pub body: Vec<u8>,
}
impl RawResponse {
	/// Creates a response from a status and body.
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self { status, body: body.into() }
	}

	/// Builds a response whose body is `value` serialized as JSON.
	pub fn json(status: u16, value: &Value) -> Self {
		Self::new(status, value.to_string())
	}

	/// Returns `true` for HTTP `2xx`.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Rejects non-success HTTP statuses and decodes the body into an [`Envelope`].
	pub fn into_envelope(self) -> Result<Envelope, TransportFault> {
		if !self.is_success() {
			return Err(TransportFault::http_status(self.status));
		}

		let status = self.status;

		Envelope::from_slice(&self.body).map_err(|e| {
			TransportFault::new(FaultKind::Malformed, "Response body is not a JSON envelope.")
				.with_status(status)
				.with_source(e)
		})
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let timeout = request.timeout;
			let url = Url::parse(&request.url).map_err(|e| {
				TransportFault::new(FaultKind::Request, format!("Invalid URL `{}`.", request.url))
					.with_source(e)
			})?;
			let mut builder = client.request(reqwest_method(request.method), url).timeout(timeout);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if !request.query.is_empty() {
				builder = builder.query(&request.query);
			}
			if let Some(body) = &request.body {
				builder = builder.json(body);
			}

			let response =
				builder.send().await.map_err(|e| map_reqwest_error(e, timeout.as_millis()))?;
			let status = response.status().as_u16();
			let body = response
				.bytes()
				.await
				.map_err(|e| map_reqwest_error(e, timeout.as_millis()))?
				.to_vec();

			Ok(RawResponse { status, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn reqwest_method(method: Method) -> reqwest::Method {
	match method {
		Method::Get => reqwest::Method::GET,
		Method::Post => reqwest::Method::POST,
		Method::Put => reqwest::Method::PUT,
		Method::Patch => reqwest::Method::PATCH,
		Method::Delete => reqwest::Method::DELETE,
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError, timeout_ms: u128) -> TransportFault {
	if err.is_timeout() {
		return TransportFault::new(FaultKind::Timeout, format!("timeout of {timeout_ms}ms exceeded"))
			.with_source(err);
	}
	if let Some(status) = err.status() {
		return TransportFault::http_status(status.as_u16()).with_source(err);
	}
	if err.is_builder() {
		return TransportFault::new(FaultKind::Request, err.to_string()).with_source(err);
	}

	TransportFault::from_message(err.to_string(), FaultKind::Network).with_source(err)
}
