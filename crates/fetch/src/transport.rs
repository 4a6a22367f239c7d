//! Network transports.
//!
//! A transport performs one GET and must stop its own pending I/O when the
//! signal fires, reporting [`FetchError::Cancelled`]. The fetch unit never
//! aborts a request itself; it only forwards the signal.

use async_trait::async_trait;
use bytes::Bytes;
use qcr_query::CancelSignal;
use reqwest::Client;

use crate::config::FetchConfig;
use crate::error::{FetchError, Result};

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
	pub status: u16,
	pub body: Bytes,
}

impl TransportResponse {
	pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	/// Returns true for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Cancellable network read.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Issues a GET for `url`, aborting when `signal` fires.
	async fn get(&self, url: &str, signal: &CancelSignal) -> Result<TransportResponse>;
}

/// HTTP transport backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: Client,
}

impl HttpTransport {
	/// Builds a transport with the client settings from `config`.
	pub fn new(config: &FetchConfig) -> Result<Self> {
		let mut builder = Client::builder().user_agent(config.user_agent.clone());
		if let Some(timeout) = config.timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder.build()?;
		Ok(Self { client })
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn get(&self, url: &str, signal: &CancelSignal) -> Result<TransportResponse> {
		if signal.is_cancelled() {
			return Err(FetchError::Cancelled);
		}

		let request = async {
			let response = self.client.get(url).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?;
			Ok::<_, FetchError>(TransportResponse { status, body })
		};

		tokio::select! {
			biased;
			_ = signal.cancelled() => {
				tracing::debug!(url, "http.get.aborted");
				Err(FetchError::Cancelled)
			}
			result = request => {
				if let Ok(response) = &result {
					tracing::trace!(url, status = response.status, bytes = response.body.len(), "http.get");
				}
				result
			}
		}
	}
}
