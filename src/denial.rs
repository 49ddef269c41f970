//! Authentication-denial broadcast.
//!
//! [`DenialNotifier`] is an explicitly constructed bus: create one at application start, hand
//! clones to every [`Client`](crate::client::Client) and collaborator that cares, and call
//! [`DenialNotifier::dispose`] at shutdown. Publication is a synchronous fan-out to the
//! handlers registered at that moment; nothing is buffered, so late subscribers never observe
//! earlier denials.

// std
use std::{
	mem,
	panic::{self, AssertUnwindSafe},
	sync::atomic::{AtomicU64, Ordering},
};
// self
use crate::{_prelude::*, obs};

/// Marker whose presence in a fault description signals an authentication denial.
pub const DENIAL_MARKER: &str = "401";

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Returns `true` when `description` carries the unauthorized marker.
pub fn is_denial_message(description: &str) -> bool {
	description.contains(DENIAL_MARKER)
}

/// Multi-subscriber channel published to whenever a request is denied.
///
/// Clones share the same subscriber set.
#[derive(Clone, Default)]
pub struct DenialNotifier(Arc<NotifierState>);
impl DenialNotifier {
	/// Creates an empty notifier.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `handler`; it runs once per [`publish`](Self::publish) until unsubscribed.
	///
	/// Registering the same closure twice yields two independent subscriptions. After
	/// [`dispose`](Self::dispose) the returned subscription is inert.
	pub fn subscribe<F>(&self, handler: F) -> Subscription
	where
		F: 'static + Fn() + Send + Sync,
	{
		let id = self.0.next_id.fetch_add(1, Ordering::Relaxed);
		let accepted = {
			let mut registry = self.0.registry.lock();

			if !registry.disposed {
				registry.handlers.insert(id, Arc::new(handler));
			}

			!registry.disposed
		};

		if !accepted {
			obs::log_disposed_subscribe(id);
		}

		Subscription { id, state: Arc::downgrade(&self.0) }
	}

	/// Invokes every registered handler and returns how many completed without panicking.
	///
	/// The handler set is snapshotted before the fan-out, so handlers may subscribe or
	/// unsubscribe while running. A panicking handler is logged and skipped.
	pub fn publish(&self) -> usize {
		let handlers =
			self.0.registry.lock().handlers.iter().map(|(id, h)| (*id, h.clone())).collect::<Vec<_>>();
		let mut delivered = 0;

		for (id, handler) in handlers {
			match panic::catch_unwind(AssertUnwindSafe(|| handler())) {
				Ok(()) => delivered += 1,
				Err(_) => obs::log_handler_panic(id),
			}
		}

		delivered
	}

	/// Number of currently registered handlers.
	pub fn subscriber_count(&self) -> usize {
		self.0.registry.lock().handlers.len()
	}

	/// Drops every handler and refuses new ones.
	pub fn dispose(&self) {
		let dropped = {
			let mut registry = self.0.registry.lock();

			registry.disposed = true;

			mem::take(&mut registry.handlers)
		};

		drop(dropped);
	}

	/// Returns `true` once [`dispose`](Self::dispose) has run.
	pub fn is_disposed(&self) -> bool {
		self.0.registry.lock().disposed
	}
}
impl Debug for DenialNotifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DenialNotifier")
			.field("subscribers", &self.subscriber_count())
			.field("disposed", &self.is_disposed())
			.finish()
	}
}

#[derive(Default)]
struct NotifierState {
	next_id: AtomicU64,
	registry: Mutex<Registry>,
}

// Flag and map share one lock; a disposed registry never gains handlers.
#[derive(Default)]
struct Registry {
	disposed: bool,
	handlers: BTreeMap<u64, Handler>,
}

/// Handle returned by [`DenialNotifier::subscribe`].
///
/// Dropping the handle keeps the handler registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it.
#[derive(Debug)]
pub struct Subscription {
	id: u64,
	state: Weak<NotifierState>,
}
impl Subscription {
	/// Subscription identifier, unique per notifier.
	pub fn id(&self) -> u64 {
		self.id
	}

	/// Removes the handler. Returns `false` if it was already gone.
	pub fn unsubscribe(self) -> bool {
		match self.state.upgrade() {
			Some(state) => state.registry.lock().handlers.remove(&self.id).is_some(),
			None => false,
		}
	}
}
