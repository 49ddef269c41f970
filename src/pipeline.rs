//! Response pipeline applied to every exchange.
//!
//! A [`Pipeline`] is an ordered list of [`ResponseStep`]s. Each step receives the exchange as
//! left by the previous one: `Ok(body)` while the response is still usable, `Err(error)` once
//! something failed. The standard pipeline is:
//!
//! 1. [`EnvelopeStatusStep`] unwraps `data` from `2xx` envelopes and rejects everything else
//!    with the untouched body.
//! 2. [`DenialCheckStep`] publishes to the [`DenialNotifier`] when the failure is a denial.
//!
//! Steps run synchronously, so a denial is always published before the caller's future
//! resolves.

// self
use crate::{_prelude::*, denial::DenialNotifier, envelope::Envelope, obs};

/// State threaded through the pipeline.
pub type Exchange = Result<Value>;

/// One stage of response processing.
pub trait ResponseStep
where
	Self: Send + Sync,
{
	/// Stable label for logs and debugging.
	fn name(&self) -> &'static str;

	/// Transforms the exchange.
	fn apply(&self, exchange: Exchange) -> Exchange;
}

/// Classifies the envelope by its domain status and unwraps the payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvelopeStatusStep;
impl ResponseStep for EnvelopeStatusStep {
	fn name(&self) -> &'static str {
		"envelope_status"
	}

	fn apply(&self, exchange: Exchange) -> Exchange {
		let body = exchange?;

		Envelope::new(body).into_payload().map_err(Error::from)
	}
}

/// Publishes to a [`DenialNotifier`] when the exchange failed with a denial.
///
/// The failure itself passes through untouched.
#[derive(Clone, Debug)]
pub struct DenialCheckStep {
	notifier: DenialNotifier,
}
impl DenialCheckStep {
	/// Creates a step publishing to `notifier`.
	pub fn new(notifier: DenialNotifier) -> Self {
		Self { notifier }
	}
}
impl ResponseStep for DenialCheckStep {
	fn name(&self) -> &'static str {
		"denial_check"
	}

	fn apply(&self, exchange: Exchange) -> Exchange {
		if let Some(fault) =
			exchange.as_ref().err().and_then(Error::as_transport).filter(|fault| fault.is_denial())
		{
			obs::log_denial(fault.status(), fault.message());
			self.notifier.publish();
		}

		exchange
	}
}

/// Ordered list of [`ResponseStep`]s.
#[derive(Clone, Default)]
pub struct Pipeline {
	steps: Vec<Arc<dyn ResponseStep>>,
}
impl Pipeline {
	/// Creates an empty pipeline; every exchange passes through unchanged.
	pub fn new() -> Self {
		Self::default()
	}

	/// Standard pipeline: envelope classification, then denial publication.
	pub fn standard(notifier: DenialNotifier) -> Self {
		Self::new().then(EnvelopeStatusStep).then(DenialCheckStep::new(notifier))
	}

	/// Appends `step` after the existing ones.
	pub fn then(mut self, step: impl 'static + ResponseStep) -> Self {
		self.steps.push(Arc::new(step));

		self
	}

	/// Step names in execution order.
	pub fn step_names(&self) -> Vec<&'static str> {
		self.steps.iter().map(|step| step.name()).collect()
	}

	/// Runs every step in order.
	pub fn run(&self, exchange: Exchange) -> Exchange {
		self.steps.iter().fold(exchange, |exchange, step| step.apply(exchange))
	}
}
impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pipeline").field("steps", &self.step_names()).finish()
	}
}
