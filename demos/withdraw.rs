//! Walks the withdraw workflow against a mock transfer service: load token options, pick a
//! network, quote the withdrawal, and submit the order. A session-expired handler subscribed to
//! the denial bus fires when the final call comes back with HTTP 401.

// std
use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde::Deserialize;
use serde_json::json;
// self
use etransfer_request::{
	client::Client,
	denial::DenialNotifier,
	request::RequestDescriptor,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenOption {
	token_list: Vec<TokenItem>,
}

#[derive(Debug, Deserialize)]
struct TokenItem {
	symbol: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkList {
	network_list: Vec<NetworkItem>,
}

#[derive(Debug, Deserialize)]
struct NetworkItem {
	network: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawInfoEnvelope {
	withdraw_info: WithdrawInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WithdrawInfo {
	transaction_fee: String,
	transaction_unit: String,
	receive_amount: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/etransfer/token/option").query_param("type", "Deposit");
			then.status(200)
				.json_body(json!({ "code": "20000", "data": { "tokenList": [{ "symbol": "USDT" }] } }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/etransfer/network/list").query_param("symbol", "USDT");
			then.status(200).json_body(json!({
				"code": "20000",
				"data": { "networkList": [{ "network": "ETH" }, { "network": "TRX" }] }
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/api/etransfer/withdraw/info");
			then.status(200).json_body(json!({
				"code": "20000",
				"data": { "withdrawInfo": {
					"transactionFee": "1.5",
					"transactionUnit": "USDT",
					"receiveAmount": "98.5"
				} }
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/etransfer/withdraw/order");
			then.status(401);
		})
		.await;

	let bus = DenialNotifier::new();
	let session_expired = Arc::new(AtomicBool::new(false));
	let flag = session_expired.clone();
	let _redirect = bus.subscribe(move || {
		flag.store(true, Ordering::SeqCst);
		println!("Session expired; redirecting to login.");
	});
	let client = Client::configure(server.base_url(), 50_000)?.with_notifier(bus.clone());
	let tokens: TokenOption = client
		.request(RequestDescriptor::get("/api/etransfer/token/option").query("type", "Deposit"))
		.await?;
	let symbol = tokens.token_list.first().map(|token| token.symbol.clone()).unwrap_or_default();
	let networks: NetworkList = client
		.request(
			RequestDescriptor::get("/api/etransfer/network/list")
				.query("type", "Withdraw")
				.query("chainId", "tDVV")
				.query("symbol", &symbol),
		)
		.await?;
	let network = networks.network_list.first().map(|n| n.network.clone()).unwrap_or_default();
	let info: WithdrawInfoEnvelope = client
		.request(
			RequestDescriptor::get("/api/etransfer/withdraw/info")
				.query("chainId", "tDVV")
				.query("network", &network)
				.query("symbol", &symbol)
				.query("amount", "100"),
		)
		.await?;

	println!(
		"Withdrawing 100 {symbol} over {network}: fee {} {}, you receive {}.",
		info.withdraw_info.transaction_fee,
		info.withdraw_info.transaction_unit,
		info.withdraw_info.receive_amount,
	);

	let order = client
		.post::<serde_json::Value, _>(
			"/api/etransfer/withdraw/order",
			&json!({
				"network": network,
				"symbol": symbol,
				"amount": "100",
				"fromChainId": "tDVV",
				"toAddress": "0x0000000000000000000000000000000000000000",
				"rawTransaction": "",
			}),
		)
		.await;

	match order {
		Ok(order) => println!("Withdrawal request submitted: {order}."),
		Err(e) => println!("Transaction failed: {e}."),
	}

	println!("Session-expired handler fired: {}.", session_expired.load(Ordering::SeqCst));

	bus.dispose();

	Ok(())
}
