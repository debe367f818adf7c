// Logging setup for catalogctl

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
	/// Human readable text
	#[default]
	Text,
	/// JSON lines
	Json,
}

/// Install the global subscriber. Logs go to stderr so stdout only carries
/// command output. `RUST_LOG` overrides the default `info` level.
pub fn init(format: LogFormat) -> anyhow::Result<()> {
	let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
	let registry = tracing_subscriber::registry().with(filter);
	match format {
		LogFormat::Text => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.try_init()?,
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.try_init()?,
	}
	Ok(())
}
