use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

type Observer = Box<dyn FnOnce() + Send>;

/// One-shot cooperative cancellation signal.
///
/// A signal starts active and moves to cancelled exactly once. Clones share
/// the same state, so the issuer keeps one clone and hands another to the
/// operation. Observers registered with [`CancelSignal::on_cancel`] run once,
/// at the transition; observers registered afterwards run immediately.
#[derive(Clone, Default)]
pub struct CancelSignal {
	inner: Arc<SignalInner>,
}

#[derive(Default)]
struct SignalInner {
	token: CancellationToken,
	/// `None` once the signal has fired.
	observers: Mutex<Option<Vec<Observer>>>,
}

impl CancelSignal {
	/// Creates an active signal.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(SignalInner {
				token: CancellationToken::new(),
				observers: Mutex::new(Some(Vec::new())),
			}),
		}
	}

	/// Requests cancellation.
	///
	/// Returns `true` if this call performed the transition, `false` if the
	/// signal was already cancelled.
	pub fn cancel(&self) -> bool {
		let observers = {
			let mut guard = self.inner.observers.lock();
			if self.inner.token.is_cancelled() {
				return false;
			}
			self.inner.token.cancel();
			guard.take().unwrap_or_default()
		};
		for observer in observers {
			observer();
		}
		true
	}

	/// Returns true when cancellation has been requested.
	pub fn is_cancelled(&self) -> bool {
		self.inner.token.is_cancelled()
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.inner.token.cancelled().await;
	}

	/// Registers a callback run exactly once when the signal fires.
	pub fn on_cancel<F>(&self, observer: F)
	where
		F: FnOnce() + Send + 'static,
	{
		{
			let mut guard = self.inner.observers.lock();
			if !self.inner.token.is_cancelled() {
				guard.get_or_insert_with(Vec::new).push(Box::new(observer));
				return;
			}
		}
		observer();
	}
}

impl fmt::Debug for CancelSignal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CancelSignal").field("cancelled", &self.is_cancelled()).finish()
	}
}
