//! Catch-log-rethrow around a query function.
//!
//! [`LogCancellation`] reproduces a pattern common in RPC client libraries:
//! the cancellation error is caught inside the query function, logged, and
//! handed back. The log line is noise during development double invocation,
//! so the interception is a policy that can be switched off.

use std::sync::Arc;

use async_trait::async_trait;
use qcr_query::{CancelSignal, QueryError, QueryFn};

/// Fixed prefix of the diagnostic entry.
pub const CANCELLATION_LOG_MESSAGE: &str = "Caught and logged cancellation inside query function";

/// Whether intercepted cancellations are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelLogPolicy {
	#[default]
	Log,
	Silent,
}

/// One diagnostic entry written for an intercepted cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEntry {
	pub message: &'static str,
	/// Rendered error.
	pub error: String,
}

/// Observability sink for intercepted errors.
pub trait DiagnosticSink: Send + Sync {
	fn write(&self, entry: DiagnosticEntry);
}

/// Sink writing entries as `ERROR` events through [`tracing`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
	fn write(&self, entry: DiagnosticEntry) {
		tracing::error!(error = %entry.error, "{}", entry.message);
	}
}

/// Wraps a query function, logging cancellation errors before returning
/// them unchanged.
pub struct LogCancellation<Q> {
	inner: Q,
	policy: CancelLogPolicy,
	sink: Arc<dyn DiagnosticSink>,
}

impl<Q> LogCancellation<Q> {
	/// Wraps `inner` with logging enabled, writing to [`TracingSink`].
	pub fn new(inner: Q) -> Self {
		Self {
			inner,
			policy: CancelLogPolicy::Log,
			sink: Arc::new(TracingSink),
		}
	}

	pub fn with_policy(mut self, policy: CancelLogPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
		self.sink = sink;
		self
	}

	pub fn into_inner(self) -> Q {
		self.inner
	}
}

#[async_trait]
impl<Q: QueryFn> QueryFn for LogCancellation<Q> {
	type Output = Q::Output;
	type Error = Q::Error;

	async fn call(&self, signal: CancelSignal) -> Result<Self::Output, Self::Error> {
		let result = self.inner.call(signal).await;
		if let Err(err) = &result
			&& err.is_cancelled()
			&& self.policy == CancelLogPolicy::Log
		{
			self.sink.write(DiagnosticEntry {
				message: CANCELLATION_LOG_MESSAGE,
				error: err.to_string(),
			});
		}
		result
	}
}
