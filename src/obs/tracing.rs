// self
use crate::{_prelude::*, request::Method};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by client requests.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the request method + path.
	pub fn new(method: Method, path: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("etransfer_request.call", method = method.as_str(), path);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (method, path);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs that a request was denied and the notifier is about to fan out.
pub(crate) fn log_denial(status: Option<u16>, message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(status, fault = message, "request denied; notifying subscribers");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (status, message);
	}
}

/// Logs a denial handler that panicked during fan-out.
pub(crate) fn log_handler_panic(subscription: u64) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(subscription, "denial handler panicked; skipping");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = subscription;
	}
}

/// Logs a subscription attempt on a disposed notifier.
pub(crate) fn log_disposed_subscribe(subscription: u64) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(subscription, "notifier disposed; subscription ignored");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = subscription;
	}
}
