use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use qcr_query::{CancelSignal, QueryFn};
use serde::{Deserialize, Serialize};

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};
use crate::transport::Transport;

/// Repository metadata decoded from the success body.
///
/// Only `name` is required; the other fields are shown when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoData {
	pub name: String,
	#[serde(default)]
	pub full_name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub stargazers_count: Option<u64>,
}

/// The cancellable fetch unit.
#[derive(Clone)]
pub struct RepoQuery {
	transport: Arc<dyn Transport>,
	url: String,
	delay: Duration,
}

impl RepoQuery {
	pub fn new(transport: Arc<dyn Transport>, config: &FetchConfig) -> Self {
		Self {
			transport,
			url: config.url.clone(),
			delay: config.delay,
		}
	}

	/// Waits the artificial delay, then reads and decodes the resource.
	///
	/// The delay is not raced against `signal`; a signal that fired during
	/// the delay is seen by the transport, which reports
	/// [`FetchError::Cancelled`] without touching the network.
	pub async fn fetch(&self, signal: &CancelSignal) -> Result<RepoData> {
		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}

		let result = self.transport.get(&self.url, signal).await.and_then(|response| {
			if !response.is_success() {
				tracing::debug!(url = %self.url, status = response.status, "fetch.status");
				return Err(FetchError::request_failed());
			}
			serde_json::from_slice(&response.body).map_err(|e| FetchError::Decode(e.to_string()))
		});
		if let Err(err) = &result {
			tracing::debug!(url = %self.url, kind = err.kind(), "fetch.failed");
		}
		result
	}
}

#[async_trait]
impl QueryFn for RepoQuery {
	type Output = RepoData;
	type Error = FetchError;

	async fn call(&self, signal: CancelSignal) -> Result<RepoData> {
		self.fetch(&signal).await
	}
}
