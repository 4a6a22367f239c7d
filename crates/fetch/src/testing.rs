//! In-memory transport and sink for tests.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use qcr_query::CancelSignal;

use crate::error::{FetchError, Result};
use crate::intercept::{DiagnosticEntry, DiagnosticSink};
use crate::transport::{Transport, TransportResponse};

/// Transport replaying scripted replies in order.
///
/// The last reply repeats once the script runs out. Each reply is delivered
/// after the configured latency unless the signal fires first.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
	replies: Mutex<VecDeque<Result<TransportResponse>>>,
	latency: Duration,
	requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues a reply with a JSON body.
	pub fn json(self, status: u16, body: serde_json::Value) -> Self {
		self.body(status, body.to_string())
	}

	/// Queues a reply with a raw body.
	pub fn body(self, status: u16, body: impl Into<String>) -> Self {
		self.reply(Ok(TransportResponse::new(status, body.into())))
	}

	/// Queues a reply with an empty body.
	pub fn status(self, status: u16) -> Self {
		self.reply(Ok(TransportResponse::new(status, "")))
	}

	/// Queues a transport failure.
	pub fn error(self, error: FetchError) -> Self {
		self.reply(Err(error))
	}

	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = latency;
		self
	}

	/// URLs requested so far, in order.
	pub fn requests(&self) -> Vec<String> {
		self.requests.lock().clone()
	}

	fn reply(self, reply: Result<TransportResponse>) -> Self {
		self.replies.lock().push_back(reply);
		self
	}

	fn next_reply(&self) -> Result<TransportResponse> {
		let mut replies = self.replies.lock();
		let reply = if replies.len() > 1 { replies.pop_front() } else { replies.front().cloned() };
		reply.unwrap_or_else(|| Err(FetchError::Transport("no scripted reply".into())))
	}
}

#[async_trait]
impl Transport for ScriptedTransport {
	async fn get(&self, url: &str, signal: &CancelSignal) -> Result<TransportResponse> {
		self.requests.lock().push(url.to_string());
		if signal.is_cancelled() {
			return Err(FetchError::Cancelled);
		}
		if !self.latency.is_zero() {
			tokio::select! {
				biased;
				_ = signal.cancelled() => return Err(FetchError::Cancelled),
				_ = tokio::time::sleep(self.latency) => {}
			}
		}
		self.next_reply()
	}
}

/// Sink keeping every entry in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
	entries: Mutex<Vec<DiagnosticEntry>>,
}

impl RecordingSink {
	pub fn entries(&self) -> Vec<DiagnosticEntry> {
		self.entries.lock().clone()
	}
}

impl DiagnosticSink for RecordingSink {
	fn write(&self, entry: DiagnosticEntry) {
		self.entries.lock().push(entry);
	}
}
