//! Cancellable fetch of repository metadata.
//!
//! [`RepoQuery`] waits an artificial delay, issues one GET through a
//! [`Transport`] with the caller's cancellation signal, and decodes the JSON
//! body. [`LogCancellation`] wraps any query function to report intercepted
//! cancellations to a [`DiagnosticSink`] before handing the same error back.

mod config;
mod error;
mod intercept;
mod repo;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod transport;

// Exercised by the integration tests only.
#[cfg(test)]
use tiny_http as _;

pub use config::{DEFAULT_DELAY, DEFAULT_REPO_URL, DEFAULT_USER_AGENT, FetchConfig};
pub use error::{FetchError, REQUEST_FAILED_MESSAGE, Result};
pub use intercept::{CANCELLATION_LOG_MESSAGE, CancelLogPolicy, DiagnosticEntry, DiagnosticSink, LogCancellation, TracingSink};
pub use repo::{RepoData, RepoQuery};
pub use transport::{HttpTransport, Transport, TransportResponse};
