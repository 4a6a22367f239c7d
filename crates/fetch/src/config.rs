use std::time::Duration;

use crate::intercept::CancelLogPolicy;

/// Repository the reproduction fetches by default.
pub const DEFAULT_REPO_URL: &str = "https://api.github.com/repos/tanstack/query";

/// Artificial delay before the network read.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(3000);

/// User agent installed on the HTTP client. The GitHub API rejects requests
/// without one.
pub const DEFAULT_USER_AGENT: &str = concat!("query-cancel-repro/", env!("CARGO_PKG_VERSION"));

/// Settings for one fetch unit and its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
	/// Resource to GET.
	pub url: String,
	/// Wait before the request is issued.
	pub delay: Duration,
	/// Whole-request timeout on the HTTP client, if any.
	pub timeout: Option<Duration>,
	pub user_agent: String,
	/// Whether intercepted cancellations are written to the diagnostic sink.
	pub cancel_log: CancelLogPolicy,
}

impl Default for FetchConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_REPO_URL.to_string(),
			delay: DEFAULT_DELAY,
			timeout: None,
			user_agent: DEFAULT_USER_AGENT.to_string(),
			cancel_log: CancelLogPolicy::default(),
		}
	}
}
