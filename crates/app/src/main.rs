//! Query cancel reproduction binary.
//!
//! Renders the homepage, follows its link to the problem page and prints
//! every state the page goes through. With strict mode on, the intercepted
//! cancellation of the superseded first request shows up on stderr.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use qcr_app::{AppConfig, Navigator, QueryFactory, RepoClient, Renderer, logging};
use qcr_fetch::{HttpTransport, Transport};
use tracing::info;
// Used by the library target only.
use {qcr_query as _, serde as _, thiserror as _, toml as _, tracing_subscriber as _};
#[cfg(test)]
use {serde_json as _, tempfile as _};

/// Command line arguments.
#[derive(Parser, Debug)]
#[command(name = "query-cancel-repro")]
#[command(about = "Reproduces a logged query cancellation during development double invocation")]
struct Args {
	/// TOML config file
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Resource the problem page fetches
	#[arg(long, value_name = "URL")]
	url: Option<String>,

	/// Artificial delay before the request, in milliseconds
	#[arg(long, value_name = "MS")]
	delay_ms: Option<u64>,

	/// Mount pages once instead of mount, unmount, mount
	#[arg(long)]
	no_strict: bool,

	/// Do not log cancellations caught inside the query function
	#[arg(long)]
	silent_cancel: bool,

	/// Navigate back home this many milliseconds after opening the problem
	/// page, cancelling the request if it is still pending
	#[arg(long, value_name = "MS")]
	back_after_ms: Option<u64>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

impl Args {
	fn apply(&self, config: &mut AppConfig) {
		if let Some(url) = &self.url {
			config.url = url.clone();
		}
		if let Some(delay_ms) = self.delay_ms {
			config.delay_ms = delay_ms;
		}
		if self.no_strict {
			config.strict_mode = false;
		}
		if self.silent_cancel {
			config.log_cancellation = false;
		}
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	logging::init(args.verbose).context("installing tracing subscriber")?;

	let mut config = AppConfig::load_optional(args.config.as_deref())?;
	args.apply(&mut config);
	info!(url = %config.url, delay_ms = config.delay_ms, strict_mode = config.strict_mode, "Starting query-cancel-repro");

	let fetch_config = config.fetch_config();
	let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&fetch_config).context("building HTTP client")?);
	let client = RepoClient::new();
	let mut navigator = Navigator::new(client.clone(), QueryFactory::new(transport, fetch_config), config.strict_mode);
	let mut renderer = Renderer::new(std::io::stdout());

	navigator.play(&mut renderer, args.back_after_ms.map(Duration::from_millis)).await.context("writing frames")?;

	// Superseded and cancelled instances finish in the background; wait for
	// them so their diagnostics are not cut off.
	client.idle().await;
	Ok(())
}
