//! Application configuration.
//!
//! Every field has a default, so a config file only lists what it changes:
//!
//! ```toml
//! url = "https://api.github.com/repos/tanstack/query"
//! delay_ms = 3000
//! strict_mode = true
//! log_cancellation = true
//! request_timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use qcr_fetch::{CancelLogPolicy, DEFAULT_DELAY, DEFAULT_REPO_URL, DEFAULT_USER_AGENT, FetchConfig};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or field types.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
	/// Resource the problem page fetches.
	pub url: String,
	/// Artificial delay before the request, in milliseconds.
	pub delay_ms: u64,
	/// Double-invoke page mounts the way development builds do.
	pub strict_mode: bool,
	/// Log cancellations intercepted inside the query function.
	pub log_cancellation: bool,
	pub request_timeout_secs: Option<u64>,
	pub user_agent: String,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			url: DEFAULT_REPO_URL.to_string(),
			delay_ms: DEFAULT_DELAY.as_millis() as u64,
			strict_mode: true,
			log_cancellation: true,
			request_timeout_secs: Some(30),
			user_agent: DEFAULT_USER_AGENT.to_string(),
		}
	}
}

impl AppConfig {
	pub fn from_toml(text: &str) -> Result<Self> {
		Ok(toml::from_str(text)?)
	}

	pub fn load(path: &Path) -> Result<Self> {
		let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&text)
	}

	/// Loads `path` if given, defaults otherwise.
	pub fn load_optional(path: Option<&Path>) -> Result<Self> {
		path.map_or_else(|| Ok(Self::default()), Self::load)
	}

	pub fn fetch_config(&self) -> FetchConfig {
		FetchConfig {
			url: self.url.clone(),
			delay: Duration::from_millis(self.delay_ms),
			timeout: self.request_timeout_secs.map(Duration::from_secs),
			user_agent: self.user_agent.clone(),
			cancel_log: if self.log_cancellation {
				CancelLogPolicy::Log
			} else {
				CancelLogPolicy::Silent
			},
		}
	}
}
