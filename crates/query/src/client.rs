//! Keyed query registry.
//!
//! [`QueryClient`] dedupes concurrent observers of the same [`QueryKey`] onto
//! one running instance. Each instance owns its own [`CancelSignal`] and
//! [`OutcomeCell`]; nothing else is shared between instances.
//!
//! Lifecycle of one key:
//!
//! - `observe` with no reusable instance starts generation N and spawns the
//!   query function with a fresh signal.
//! - Further `observe` calls attach to generation N while it is pending and
//!   its signal has not fired. Settled instances are never reused: observing
//!   again starts over at pending.
//! - When the last observer of a pending instance goes away, its signal is
//!   cancelled. The next `observe` starts generation N+1; the previous
//!   instance is cancelled again as it is superseded, which is a no-op if it
//!   already was.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::task::TaskTracker;

use crate::generation::GenerationClock;
use crate::key::QueryKey;
use crate::outcome::{OutcomeCell, QueryOutcome};
use crate::query_fn::{QueryError, QueryFn};
use crate::signal::CancelSignal;


/// Shared registry of query instances, cheap to clone.
pub struct QueryClient<T, E> {
	registry: Arc<Registry<T, E>>,
}

impl<T, E> Clone for QueryClient<T, E> {
	fn clone(&self) -> Self {
		Self {
			registry: Arc::clone(&self.registry),
		}
	}
}

impl<T, E> Default for QueryClient<T, E> {
	fn default() -> Self {
		Self {
			registry: Arc::new(Registry {
				entries: Mutex::new(HashMap::new()),
				clock: GenerationClock::new(),
				tasks: TaskTracker::new(),
			}),
		}
	}
}

struct Registry<T, E> {
	entries: Mutex<HashMap<QueryKey, QueryEntry<T, E>>>,
	clock: GenerationClock,
	/// Running query tasks, superseded ones included.
	tasks: TaskTracker,
}

struct QueryEntry<T, E> {
	generation: u64,
	signal: CancelSignal,
	outcome: watch::Receiver<QueryOutcome<T, E>>,
	observers: usize,
}

impl<T, E> QueryEntry<T, E> {
	fn is_in_flight(&self) -> bool {
		!self.signal.is_cancelled() && self.outcome.borrow().is_pending()
	}
}

impl<T, E> QueryClient<T, E>
where
	T: Clone + Send + Sync + 'static,
	E: QueryError,
{
	/// Creates an empty client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Subscribes to the instance for `key`, starting one with `query` if
	/// there is nothing to attach to.
	pub fn observe<Q>(&self, key: impl Into<QueryKey>, query: Q) -> QueryObserver<T, E>
	where
		Q: QueryFn<Output = T, Error = E>,
	{
		let key = key.into();
		let mut entries = self.registry.entries.lock();

		if let Some(entry) = entries.get_mut(&key).filter(|entry| entry.is_in_flight()) {
			entry.observers += 1;
			tracing::debug!(%key, generation = entry.generation, observers = entry.observers, "query.attach");
			return QueryObserver {
				key,
				generation: entry.generation,
				outcome: entry.outcome.clone(),
				registry: Arc::clone(&self.registry),
			};
		}

		let generation = self.registry.clock.next();
		let signal = CancelSignal::new();
		let cell = OutcomeCell::new();
		let outcome = cell.subscribe();
		let superseded = entries.insert(
			key.clone(),
			QueryEntry {
				generation,
				signal: signal.clone(),
				outcome: outcome.clone(),
				observers: 1,
			},
		);
		drop(entries);

		if let Some(previous) = superseded
			&& previous.signal.cancel()
		{
			tracing::debug!(%key, generation = previous.generation, "query.supersede");
		}

		tracing::debug!(%key, generation, "query.start");
		spawn_query(&self.registry.tasks, key.clone(), generation, query, signal, cell);

		QueryObserver {
			key,
			generation,
			outcome,
			registry: Arc::clone(&self.registry),
		}
	}

	/// Cancels the current instance for `key`.
	///
	/// Returns `true` if a signal transitioned. The recorded outcome of an
	/// instance that already settled is left as is.
	pub fn cancel(&self, key: &QueryKey) -> bool {
		let signal = {
			let entries = self.registry.entries.lock();
			let Some(entry) = entries.get(key) else {
				return false;
			};
			entry.signal.clone()
		};
		let cancelled = signal.cancel();
		if cancelled {
			tracing::debug!(%key, "query.cancel");
		}
		cancelled
	}

	/// Cancels and forgets the current instance for `key`.
	pub fn remove(&self, key: &QueryKey) -> bool {
		let Some(entry) = self.registry.entries.lock().remove(key) else {
			return false;
		};
		entry.signal.cancel();
		tracing::debug!(%key, generation = entry.generation, "query.remove");
		true
	}

	/// Returns the latest outcome recorded for `key`.
	pub fn outcome(&self, key: &QueryKey) -> Option<QueryOutcome<T, E>> {
		let entries = self.registry.entries.lock();
		entries.get(key).map(|entry| entry.outcome.borrow().clone())
	}

	/// Returns the generation of the current instance for `key`.
	pub fn generation(&self, key: &QueryKey) -> Option<u64> {
		self.registry.entries.lock().get(key).map(|entry| entry.generation)
	}

	/// Returns the number of live observers of the current instance.
	pub fn observer_count(&self, key: &QueryKey) -> usize {
		self.registry.entries.lock().get(key).map_or(0, |entry| entry.observers)
	}

	/// Returns true while the current instance is pending and not cancelled.
	pub fn is_fetching(&self, key: &QueryKey) -> bool {
		self.registry.entries.lock().get(key).is_some_and(QueryEntry::is_in_flight)
	}

	/// Waits until every query task spawned so far has finished, including
	/// cancelled and superseded instances still unwinding.
	pub async fn idle(&self) {
		let tasks = &self.registry.tasks;
		tasks.close();
		tasks.wait().await;
		tasks.reopen();
	}
}

impl<T, E> Registry<T, E> {
	fn detach(&self, key: &QueryKey, generation: u64) {
		let mut entries = self.entries.lock();
		let Some(entry) = entries.get_mut(key) else {
			return;
		};
		if entry.generation != generation {
			return;
		}
		entry.observers = entry.observers.saturating_sub(1);
		if entry.observers > 0 || !entry.outcome.borrow().is_pending() {
			return;
		}

		// Cancel under the lock so a concurrent `observe` either attaches
		// before the count drops to zero or sees the instance as cancelled.
		if entry.signal.cancel() {
			tracing::debug!(%key, generation, "query.cancel.unobserved");
		}
	}
}

fn spawn_query<Q>(tasks: &TaskTracker, key: QueryKey, generation: u64, query: Q, signal: CancelSignal, cell: OutcomeCell<Q::Output, Q::Error>)
where
	Q: QueryFn,
{
	tracing::trace!(%key, generation, "query.spawn");
	tasks.spawn(async move {
		let result = query.call(signal.clone()).await;
		let outcome = match result {
			// A response that lands after the signal fired is stale.
			Ok(_) if signal.is_cancelled() => QueryOutcome::Error(<Q::Error as QueryError>::cancelled()),
			result => QueryOutcome::from(result),
		};
		let status = match &outcome {
			QueryOutcome::Success(_) => "success",
			QueryOutcome::Error(err) if err.is_cancelled() => "cancelled",
			_ => "error",
		};
		if cell.settle(outcome) {
			tracing::debug!(%key, generation, status, "query.settled");
		}
	});
}

/// One subscription to a query instance.
///
/// Dropping the last observer of a pending instance cancels it.
pub struct QueryObserver<T, E> {
	key: QueryKey,
	generation: u64,
	outcome: watch::Receiver<QueryOutcome<T, E>>,
	registry: Arc<Registry<T, E>>,
}

impl<T: Clone, E: Clone> QueryObserver<T, E> {
	pub fn key(&self) -> &QueryKey {
		&self.key
	}

	/// Generation of the instance this observer is attached to.
	pub const fn generation(&self) -> u64 {
		self.generation
	}

	/// Returns the current outcome and marks it seen.
	pub fn outcome(&mut self) -> QueryOutcome<T, E> {
		self.outcome.borrow_and_update().clone()
	}

	/// Waits for the next transition.
	///
	/// Returns `None` once the instance can no longer change.
	pub async fn changed(&mut self) -> Option<QueryOutcome<T, E>> {
		self.outcome.changed().await.ok()?;
		Some(self.outcome.borrow_and_update().clone())
	}

	/// Waits for the terminal outcome.
	pub async fn settled(&mut self) -> QueryOutcome<T, E> {
		if let Ok(outcome) = self.outcome.wait_for(QueryOutcome::is_final).await {
			return outcome.clone();
		}
		self.outcome.borrow().clone()
	}

	/// Detaches from the instance, cancelling it if this was the last
	/// observer and it is still pending.
	pub fn unmount(self) {}
}

impl<T, E> Drop for QueryObserver<T, E> {
	fn drop(&mut self) {
		self.registry.detach(&self.key, self.generation);
	}
}
