//! Transport client: request shaping, dispatch, and response normalization.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	config::ClientConfig,
	denial::DenialNotifier,
	envelope::Envelope,
	obs::{self, CallSpan, RequestOutcome},
	pipeline::{Pipeline, ResponseStep},
	request::{OutgoingRequest, RequestDescriptor, resolve_url},
	transport::{HttpTransport, RawResponse},
};
#[cfg(feature = "reqwest")]
use crate::{error::ConfigError, transport::ReqwestTransport};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type DefaultClient = Client<ReqwestTransport>;

/// Issues requests against the transfer service and normalizes every response into
/// `Ok(payload)` or `Err(Error)`.
///
/// The fixed authentication header is computed once from the [`ClientConfig`] when the client
/// is built and attached to every request it sends; callers cannot override it through
/// [`RequestDescriptor::header`]. Each client owns a [`DenialNotifier`]; share one bus between
/// clients with [`Client::with_notifier`].
pub struct Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request.
	pub transport: Arc<T>,
	config: ClientConfig,
	default_headers: BTreeMap<String, String>,
	notifier: DenialNotifier,
	pipeline: Pipeline,
}
impl<T> Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client over the caller-provided transport.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Result<Self> {
		config.validate()?;

		let notifier = DenialNotifier::new();

		Ok(Self {
			transport: transport.into(),
			default_headers: config.default_headers(),
			config,
			pipeline: Pipeline::standard(notifier.clone()),
			notifier,
		})
	}

	/// Publishes denials to `notifier` instead of the client's own bus.
	///
	/// Resets the pipeline to [`Pipeline::standard`]; add custom steps afterwards.
	pub fn with_notifier(mut self, notifier: DenialNotifier) -> Self {
		self.pipeline = Pipeline::standard(notifier.clone());
		self.notifier = notifier;

		self
	}

	/// Appends a response step after the standard ones.
	pub fn with_step(mut self, step: impl 'static + ResponseStep) -> Self {
		self.pipeline = self.pipeline.then(step);

		self
	}

	/// Settings the client was built from; fixed for the client's lifetime.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Bus receiving denial publications from this client.
	pub fn notifier(&self) -> &DenialNotifier {
		&self.notifier
	}

	/// Response pipeline applied to every exchange.
	pub fn pipeline(&self) -> &Pipeline {
		&self.pipeline
	}

	/// Shapes a descriptor into the request handed to the transport.
	pub fn prepare(&self, descriptor: RequestDescriptor) -> OutgoingRequest {
		let RequestDescriptor { method, path, query, body, mut headers, timeout } = descriptor;

		// Header names are case-insensitive on the wire.
		headers.retain(|name, _| {
			!self.default_headers.keys().any(|fixed| fixed.eq_ignore_ascii_case(name))
		});
		headers.extend(self.default_headers.iter().map(|(k, v)| (k.clone(), v.clone())));

		OutgoingRequest {
			method,
			url: resolve_url(&self.config.base_url, &path),
			headers,
			query,
			body,
			timeout: timeout.unwrap_or_else(|| self.config.timeout()),
		}
	}

	/// Sends `descriptor` and decodes the unwrapped payload into `R`.
	///
	/// - `Ok(payload)` when the envelope reports a `2xx` domain status.
	/// - [`Error::Domain`] with the unmodified body for any other domain status.
	/// - [`Error::Transport`] when no usable response arrived; denials are published to the
	///   notifier before this future resolves.
	/// - [`Error::Payload`] when `data` does not fit `R`.
	pub async fn request<R>(&self, descriptor: RequestDescriptor) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let span = CallSpan::new(descriptor.method, &descriptor.path);

		span.instrument(async move {
			obs::record_request_outcome(RequestOutcome::Attempt);

			let result = self.exchange(descriptor).await.and_then(decode_payload);

			obs::record_request_outcome(RequestOutcome::of(&result));

			result
		})
		.await
	}

	/// Same as [`request`](Self::request) but keeps the payload as raw JSON.
	pub async fn request_value(&self, descriptor: RequestDescriptor) -> Result<Value> {
		self.request(descriptor).await
	}

	/// `GET path` without query parameters.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request(RequestDescriptor::get(path)).await
	}

	/// `POST path` with a JSON body.
	pub async fn post<R, B>(&self, path: &str, body: &B) -> Result<R>
	where
		R: DeserializeOwned,
		B: ?Sized + Serialize,
	{
		let descriptor = RequestDescriptor::post(path).json(body).map_err(Error::RequestBody)?;

		self.request(descriptor).await
	}

	async fn exchange(&self, descriptor: RequestDescriptor) -> Result<Value> {
		let outgoing = self.prepare(descriptor);
		let exchange = self
			.transport
			.execute(outgoing)
			.await
			.and_then(RawResponse::into_envelope)
			.map(Envelope::into_body)
			.map_err(Error::from);

		self.pipeline.run(exchange)
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestTransport> {
	/// Builds a reqwest-backed client bound to `base_url` and a default timeout.
	///
	/// `timeout_ms` must be greater than zero. `base_url` may be relative; requests against a
	/// relative URL fail at dispatch with a request fault.
	pub fn configure(base_url: impl Into<String>, timeout_ms: u64) -> Result<Self> {
		Self::from_config(ClientConfig::new(base_url, timeout_ms))
	}

	/// Builds a reqwest-backed client from a full [`ClientConfig`].
	pub fn from_config(config: ClientConfig) -> Result<Self> {
		config.validate()?;

		let client =
			ReqwestClient::builder().timeout(config.timeout()).build().map_err(ConfigError::from)?;

		Self::with_transport(config, ReqwestTransport::with_client(client))
	}
}
impl<T> Clone for Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			config: self.config.clone(),
			default_headers: self.default_headers.clone(),
			notifier: self.notifier.clone(),
			pipeline: self.pipeline.clone(),
		}
	}
}
impl<T> Debug for Client<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("base_url", &self.config.base_url)
			.field("timeout_ms", &self.config.timeout_ms)
			.field("pipeline", &self.pipeline)
			.field("notifier", &self.notifier)
			.finish()
	}
}

fn decode_payload<R>(payload: Value) -> Result<R>
where
	R: DeserializeOwned,
{
	serde_path_to_error::deserialize(payload).map_err(Error::from)
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		sync::atomic::{AtomicUsize, Ordering},
		time::Duration as StdDuration,
	};
	// self
	use super::*;
	use crate::{
		config::{CSRF_HEADER, DEFAULT_CSRF_TOKEN},
		error::{ConfigError, FaultKind, TransportFault},
		transport::TransportFuture,
	};

	struct Canned(Value);
	impl HttpTransport for Canned {
		fn execute(&self, _request: OutgoingRequest) -> TransportFuture<'_> {
			let body = self.0.clone();

			Box::pin(async move { Ok(RawResponse::json(200, &body)) })
		}
	}

	struct Failing;
	impl HttpTransport for Failing {
		fn execute(&self, _request: OutgoingRequest) -> TransportFuture<'_> {
			Box::pin(async {
				Err(TransportFault::from_message(
					"Request failed with status code 401",
					FaultKind::Network,
				))
			})
		}
	}

	fn client<T>(transport: T) -> Client<T>
	where
		T: HttpTransport,
	{
		Client::with_transport(ClientConfig::new("https://etransfer.example.com/", 5_000), transport)
			.expect("Test config should be valid.")
	}

	#[test]
	fn prepare_applies_defaults_and_overrides() {
		let client = client(Canned(Value::Null));
		let outgoing = client.prepare(
			RequestDescriptor::get("/api/app/info")
				.header(CSRF_HEADER, "caller-supplied")
				.header("x-trace", "t-1"),
		);

		assert_eq!(outgoing.url, "https://etransfer.example.com/api/app/info");
		assert_eq!(outgoing.timeout, StdDuration::from_millis(5_000));
		assert_eq!(outgoing.headers.get(CSRF_HEADER).map(String::as_str), Some(DEFAULT_CSRF_TOKEN));
		assert_eq!(outgoing.headers.get("x-trace").map(String::as_str), Some("t-1"));

		let outgoing = client.prepare(
			RequestDescriptor::get("/api/app/info").timeout(StdDuration::from_millis(10)),
		);

		assert_eq!(outgoing.timeout, StdDuration::from_millis(10));
	}

	#[test]
	fn fixed_header_wins_over_any_casing() {
		let client = client(Canned(Value::Null));
		let outgoing = client.prepare(
			RequestDescriptor::get("/x")
				.header("X-CSRF-Token", "caller-supplied")
				.header("X-CSRF-TOKEN", "caller-supplied"),
		);
		let csrf = outgoing
			.headers
			.iter()
			.filter(|(name, _)| name.eq_ignore_ascii_case(CSRF_HEADER))
			.map(|(name, value)| (name.as_str(), value.as_str()))
			.collect::<Vec<_>>();

		assert_eq!(csrf, [(CSRF_HEADER, DEFAULT_CSRF_TOKEN)]);
		assert_eq!(client.config().csrf_token, DEFAULT_CSRF_TOKEN);
	}

	#[test]
	fn zero_timeout_is_a_config_error() {
		let err = Client::<Canned>::with_transport(ClientConfig::new("/", 0), Canned(Value::Null))
			.expect_err("Zero timeout must be rejected.");

		assert!(matches!(err, Error::Config(ConfigError::NonPositiveTimeout)));
	}

	#[tokio::test]
	async fn typed_payload_decodes_from_data() {
		#[derive(Debug, Deserialize, PartialEq)]
		#[serde(rename_all = "camelCase")]
		struct Order {
			order_id: String,
		}

		let client = client(Canned(serde_json::json!({ "code": "200", "data": { "orderId": "abc" } })));
		let order: Order = client.get("/api/app/withdraw/order").await.expect("2xx must succeed.");

		assert_eq!(order, Order { order_id: "abc".into() });
	}

	#[tokio::test]
	async fn payload_mismatch_reports_path() {
		#[derive(Debug, Deserialize)]
		#[allow(dead_code)]
		struct Order {
			order_id: u64,
		}

		let client = client(Canned(serde_json::json!({ "code": "200", "data": { "order_id": "x" } })));
		let err = client.get::<Order>("/order").await.expect_err("String is not a u64.");

		match err {
			Error::Payload { path, .. } => assert_eq!(path, "order_id"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[tokio::test]
	async fn shared_notifier_receives_denials() {
		let shared = DenialNotifier::new();
		let hits = Arc::new(AtomicUsize::new(0));
		let counter = hits.clone();
		let _subscription = shared.subscribe(move || {
			counter.fetch_add(1, Ordering::SeqCst);
		});
		let client = client(Failing).with_notifier(shared.clone());
		let err = client.request_value(RequestDescriptor::get("/")).await.expect_err("Denied.");

		assert!(err.is_denial());
		assert_eq!(hits.load(Ordering::SeqCst), 1);
		assert_eq!(client.notifier().subscriber_count(), 1);
	}
}
