use tracing::Level;
use tracing::subscriber::SetGlobalDefaultError;

/// Maximum level for the verbosity flag.
pub const fn max_level(verbose: bool) -> Level {
	if verbose { Level::DEBUG } else { Level::INFO }
}

/// Installs the global subscriber, writing to stderr so frames on stdout
/// stay readable.
pub fn init(verbose: bool) -> Result<(), SetGlobalDefaultError> {
	let subscriber = tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_max_level(max_level(verbose))
		.finish();

	tracing::subscriber::set_global_default(subscriber)
}
