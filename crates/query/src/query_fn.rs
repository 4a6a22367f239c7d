use std::fmt;

use async_trait::async_trait;

use crate::signal::CancelSignal;

/// Error contract for query functions.
///
/// The client needs to recognise cancellation and to produce a cancellation
/// error of its own when a response lands after the signal fired.
pub trait QueryError: Clone + fmt::Debug + fmt::Display + Send + Sync + 'static {
	/// Builds the error reported for a cancelled instance.
	fn cancelled() -> Self;

	/// Returns true if this error reports cancellation.
	fn is_cancelled(&self) -> bool;
}

/// An asynchronous operation run once per query instance.
///
/// Implementations must forward `signal` to whatever performs I/O so
/// in-flight work can stop early, and must return every error they see.
#[async_trait]
pub trait QueryFn: Send + Sync + 'static {
	type Output: Clone + Send + Sync + 'static;
	type Error: QueryError;

	async fn call(&self, signal: CancelSignal) -> Result<Self::Output, Self::Error>;
}
