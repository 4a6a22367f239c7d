//! Outcome of one query instance.
//!
//! An instance starts [`QueryOutcome::Pending`] and ends in exactly one of
//! [`QueryOutcome::Success`] or [`QueryOutcome::Error`]. Once terminal, the
//! outcome never changes; late settlements (for example a cancellation that
//! arrives after the response) are ignored.

use tokio::sync::watch;

use crate::query_fn::QueryError;

/// Representation of a query instance's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome<T, E> {
	/// The request has started but not settled yet.
	Pending,
	/// The request resolved with a payload.
	Success(T),
	/// The request failed; cancellation is reported here too.
	Error(E),
}

impl<T, E> QueryOutcome<T, E> {
	pub fn is_pending(&self) -> bool {
		matches!(self, Self::Pending)
	}

	/// Returns true once the outcome won't change anymore.
	pub fn is_final(&self) -> bool {
		!self.is_pending()
	}

	pub fn is_success(&self) -> bool {
		matches!(self, Self::Success(_))
	}

	pub fn data(&self) -> Option<&T> {
		match self {
			Self::Success(data) => Some(data),
			_ => None,
		}
	}

	pub fn error(&self) -> Option<&E> {
		match self {
			Self::Error(err) => Some(err),
			_ => None,
		}
	}
}

impl<T, E> From<Result<T, E>> for QueryOutcome<T, E> {
	fn from(result: Result<T, E>) -> Self {
		match result {
			Ok(data) => Self::Success(data),
			Err(err) => Self::Error(err),
		}
	}
}

/// Single-settlement slot for one query instance.
///
/// Subscribers observe the slot through a [`watch::Receiver`]. Dropping a
/// cell that never settled records a cancellation so no subscriber is left
/// waiting on a pending outcome forever.
#[derive(Debug)]
pub struct OutcomeCell<T, E: QueryError> {
	tx: watch::Sender<QueryOutcome<T, E>>,
}

impl<T, E: QueryError> Default for OutcomeCell<T, E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T, E: QueryError> OutcomeCell<T, E> {
	/// Creates a pending slot.
	pub fn new() -> Self {
		let (tx, _rx) = watch::channel(QueryOutcome::Pending);
		Self { tx }
	}

	/// Records a terminal outcome.
	///
	/// Returns `false` without touching the slot if it already settled or if
	/// `outcome` is [`QueryOutcome::Pending`].
	pub fn settle(&self, outcome: QueryOutcome<T, E>) -> bool {
		if outcome.is_pending() {
			return false;
		}
		self.tx.send_if_modified(move |current| {
			if current.is_final() {
				return false;
			}
			*current = outcome;
			true
		})
	}

	pub fn subscribe(&self) -> watch::Receiver<QueryOutcome<T, E>> {
		self.tx.subscribe()
	}

	pub fn is_settled(&self) -> bool {
		self.tx.borrow().is_final()
	}
}

impl<T: Clone, E: QueryError> OutcomeCell<T, E> {
	/// Returns a copy of the current outcome.
	pub fn snapshot(&self) -> QueryOutcome<T, E> {
		self.tx.borrow().clone()
	}
}

impl<T, E: QueryError> Drop for OutcomeCell<T, E> {
	fn drop(&mut self) {
		if !self.is_settled() {
			self.settle(QueryOutcome::Error(E::cancelled()));
		}
	}
}
