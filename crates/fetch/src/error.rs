//! Error types for the fetch unit and its transports.

use qcr_query::QueryError;
use thiserror::Error;

/// Message carried by [`FetchError::RequestFailed`] for non-success statuses.
pub const REQUEST_FAILED_MESSAGE: &str = "Network response was not ok";

/// Errors that can reach the caller of a fetch.
///
/// Errors cross the fetch boundary unmodified; wrappers may observe them but
/// hand back the same value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
	/// The cancellation signal fired before the request settled.
	#[error("The operation was aborted.")]
	Cancelled,

	/// The transport completed with a non-success status.
	#[error("{0}")]
	RequestFailed(String),

	/// Connection-level failure.
	#[error("transport error: {0}")]
	Transport(String),

	/// The success body was not decodable.
	#[error("invalid response body: {0}")]
	Decode(String),
}

impl FetchError {
	/// The error reported for a non-success status.
	pub fn request_failed() -> Self {
		Self::RequestFailed(REQUEST_FAILED_MESSAGE.to_string())
	}

	/// Stable name of the error kind, for structured logs.
	pub const fn kind(&self) -> &'static str {
		match self {
			Self::Cancelled => "cancelled",
			Self::RequestFailed(_) => "request_failed",
			Self::Transport(_) => "transport",
			Self::Decode(_) => "decode",
		}
	}
}

impl From<reqwest::Error> for FetchError {
	fn from(error: reqwest::Error) -> Self {
		Self::Transport(error.to_string())
	}
}

impl QueryError for FetchError {
	fn cancelled() -> Self {
		Self::Cancelled
	}

	fn is_cancelled(&self) -> bool {
		matches!(self, Self::Cancelled)
	}
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn request_failed_carries_generic_message() {
		let err = FetchError::request_failed();
		assert_eq!(err.to_string(), "Network response was not ok");
		assert_eq!(err.kind(), "request_failed");
		assert!(!err.is_cancelled());
	}

	#[test]
	fn only_cancelled_reports_cancellation() {
		assert!(FetchError::cancelled().is_cancelled());
		assert_eq!(FetchError::cancelled(), FetchError::Cancelled);
		for err in [
			FetchError::request_failed(),
			FetchError::Transport("connection reset".into()),
			FetchError::Decode("expected value".into()),
		] {
			assert!(!err.is_cancelled(), "{err:?}");
		}
	}

	#[test]
	fn cancelled_renders_abort_message() {
		assert_eq!(FetchError::Cancelled.to_string(), "The operation was aborted.");
	}
}
