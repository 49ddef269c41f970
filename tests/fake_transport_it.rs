// std
use std::time::Duration as StdDuration;
// crates.io
use serde_json::json;
// self
use etransfer_request::{
	_preludet::*,
	client::Client,
	config::{CSRF_HEADER, ClientConfig},
	denial::DenialNotifier,
	error::{FaultKind, TransportFault},
	request::{OutgoingRequest, RequestDescriptor},
	transport::{HttpTransport, RawResponse, TransportFuture},
};

#[derive(Clone, Debug)]
enum Scripted {
	Reply(Value),
	Fault(&'static str, FaultKind),
}

#[derive(Clone, Default)]
struct RecordingTransport {
	script: Arc<Mutex<Vec<Scripted>>>,
	seen: Arc<Mutex<Vec<OutgoingRequest>>>,
}
impl RecordingTransport {
	fn scripted(steps: impl IntoIterator<Item = Scripted>) -> Self {
		let mut script = steps.into_iter().collect::<Vec<_>>();

		script.reverse();

		Self { script: Arc::new(Mutex::new(script)), ..Self::default() }
	}

	fn recorded(&self) -> Vec<OutgoingRequest> {
		self.seen.lock().clone()
	}
}
impl HttpTransport for RecordingTransport {
	fn execute(&self, request: OutgoingRequest) -> TransportFuture<'_> {
		self.seen.lock().push(request);

		let next = self.script.lock().pop();

		Box::pin(async move {
			match next.expect("Transport script ran out of steps.") {
				Scripted::Reply(body) => Ok(RawResponse::json(200, &body)),
				Scripted::Fault(message, fallback) =>
					Err(TransportFault::from_message(message, fallback)),
			}
		})
	}
}

fn build_client(transport: RecordingTransport) -> Client<RecordingTransport> {
	Client::with_transport(ClientConfig::new("/", 50_000).with_csrf_token("csrf-fixture"), transport)
		.expect("Fixture config should be valid.")
}

#[tokio::test]
async fn textual_401_fault_notifies_every_subscriber_once() {
	let transport = RecordingTransport::scripted([Scripted::Fault(
		"Request failed with status code 401",
		FaultKind::Network,
	)]);
	let client = build_client(transport);
	let (first, _a) = count_denials(client.notifier());
	let (second, _b) = count_denials(client.notifier());
	let err = client
		.request_value(RequestDescriptor::get("/api/app/user/info"))
		.await
		.expect_err("A 401 fault must be rejected.");

	assert!(err.is_denial());
	assert_eq!(err.to_string(), "Request failed with status code 401");
	assert_eq!(denials(&first), 1);
	assert_eq!(denials(&second), 1);
}

#[tokio::test]
async fn non_denial_faults_stay_silent() {
	let transport = RecordingTransport::scripted([
		Scripted::Fault("ECONNABORTED", FaultKind::Timeout),
		Scripted::Fault("Request failed with status code 500", FaultKind::HttpStatus),
	]);
	let client = build_client(transport);
	let (hits, _subscription) = count_denials(client.notifier());
	let aborted = client.request_value(RequestDescriptor::get("/a")).await.expect_err("Aborted.");
	let server = client.request_value(RequestDescriptor::get("/b")).await.expect_err("HTTP 500.");

	assert_eq!(aborted.as_transport().map(|fault| fault.kind()), Some(FaultKind::Timeout));
	assert_eq!(server.as_transport().map(|fault| fault.kind()), Some(FaultKind::HttpStatus));
	assert_eq!(denials(&hits), 0);
}

#[tokio::test]
async fn fixed_header_and_timeouts_reach_the_transport() {
	let transport = RecordingTransport::scripted([
		Scripted::Reply(json!({ "code": "200", "data": { "tokenList": [] } })),
		Scripted::Reply(json!({ "code": "200", "data": null })),
	]);
	let client = build_client(transport.clone());

	client
		.request_value(RequestDescriptor::get("/api/app/token/option").query("type", "Deposit"))
		.await
		.expect("First call should succeed.");
	client
		.request_value(
			RequestDescriptor::post("api/app/withdraw/info").timeout(StdDuration::from_secs(3)),
		)
		.await
		.expect("Second call should succeed.");

	let seen = transport.recorded();

	assert_eq!(seen.len(), 2);
	assert!(
		seen.iter()
			.all(|request| request.headers.get(CSRF_HEADER).map(String::as_str) == Some("csrf-fixture"))
	);
	assert_eq!(seen[0].url, "/api/app/token/option");
	assert_eq!(seen[0].query, vec![("type".to_owned(), "Deposit".to_owned())]);
	assert_eq!(seen[0].timeout, StdDuration::from_millis(50_000));
	assert_eq!(seen[1].url, "/api/app/withdraw/info");
	assert_eq!(seen[1].timeout, StdDuration::from_secs(3));
}

#[tokio::test]
async fn one_bus_serves_many_clients() {
	let bus = DenialNotifier::new();
	let (hits, _subscription) = count_denials(&bus);
	let deposit = build_client(RecordingTransport::scripted([Scripted::Fault(
		"Request failed with status code 401",
		FaultKind::Network,
	)]))
	.with_notifier(bus.clone());
	let withdraw = build_client(RecordingTransport::scripted([Scripted::Fault(
		"Request failed with status code 401",
		FaultKind::Network,
	)]))
	.with_notifier(bus.clone());

	let _ = deposit.request_value(RequestDescriptor::get("/d")).await;
	let _ = withdraw.request_value(RequestDescriptor::get("/w")).await;

	assert_eq!(denials(&hits), 2);

	bus.dispose();

	let late = build_client(RecordingTransport::scripted([Scripted::Fault(
		"Request failed with status code 401",
		FaultKind::Network,
	)]))
	.with_notifier(bus);
	let err = late.request_value(RequestDescriptor::get("/late")).await.expect_err("Denied.");

	assert!(err.is_denial(), "Disposal must not change the outcome.");
	assert_eq!(denials(&hits), 2);
}

#[tokio::test]
async fn unsubscribed_handler_misses_later_denials() {
	let client = build_client(RecordingTransport::scripted([
		Scripted::Fault("Request failed with status code 401", FaultKind::Network),
		Scripted::Fault("Request failed with status code 401", FaultKind::Network),
	]));
	let (hits, subscription) = count_denials(client.notifier());
	let _ = client.request_value(RequestDescriptor::get("/first")).await;

	assert!(subscription.unsubscribe());

	let _ = client.request_value(RequestDescriptor::get("/second")).await;

	assert_eq!(denials(&hits), 1);
}
