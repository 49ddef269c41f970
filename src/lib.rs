//! Envelope-normalizing HTTP transport for eTransfer clients—one success/error contract, typed
//! transport faults, and an explicit denial bus for session-expired handling.
//!
//! ```no_run
//! # async fn demo() -> etransfer_request::error::Result<()> {
//! use etransfer_request::{client::Client, request::RequestDescriptor};
//!
//! let client = Client::configure("https://etransfer.example.com", 50_000)?;
//! let _session = client.notifier().subscribe(|| eprintln!("Session expired."));
//! let tokens: serde_json::Value = client
//! 	.request(RequestDescriptor::get("/api/etransfer/token/option").query("type", "Deposit"))
//! 	.await?;
//! # let _ = tokens;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]
// Test builds also link the crate itself through its `test`-featured dev-dependency.
#![cfg_attr(test, allow(unused_crate_dependencies))]

pub mod client;
pub mod config;
pub mod denial;
pub mod envelope;
pub mod error;
pub mod obs;
pub mod pipeline;
pub mod request;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::denial::{DenialNotifier, Subscription};
	#[cfg(feature = "reqwest")]
	use crate::{
		client::{Client, DefaultClient},
		config::ClientConfig,
	};

	#[cfg(feature = "reqwest")]
	/// Builds a reqwest-backed client pointed at `base_url` with a short timeout.
	pub fn build_test_client(base_url: &str) -> DefaultClient {
		Client::from_config(ClientConfig::new(base_url, 2_000))
			.expect("Failed to build reqwest client for tests.")
	}

	/// Subscribes a counting handler to `notifier`.
	pub fn count_denials(notifier: &DenialNotifier) -> (Arc<AtomicUsize>, Subscription) {
		let hits = Arc::new(AtomicUsize::new(0));
		let counter = hits.clone();
		let subscription = notifier.subscribe(move || {
			counter.fetch_add(1, Ordering::SeqCst);
		});

		(hits, subscription)
	}

	/// Reads a counter produced by [`count_denials`].
	pub fn denials(hits: &AtomicUsize) -> usize {
		hits.load(Ordering::SeqCst)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::{Arc, Weak},
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
