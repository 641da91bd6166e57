//! Tracing subscriber setup.
//!
//! The interactive UI owns the terminal, so its logs go to a file in the data
//! directory. One-shot runs log to stderr.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::app_dirs;

/// Environment variable holding the `EnvFilter` directives.
pub const LOG_ENV: &str = "DOCKET_LOG";
const DEFAULT_DIRECTIVES: &str = "docket=info";
const LOG_FILE: &str = "docket.log";

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
	Stderr,
	File(PathBuf),
}

impl LogTarget {
	/// `<data dir>/docket.log`.
	pub fn default_file() -> Result<Self> {
		Ok(Self::File(app_dirs::get_data_dir()?.join(LOG_FILE)))
	}
}

fn env_filter() -> EnvFilter {
	EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

fn open_log_file(path: &Path) -> Result<File> {
	if let Some(parent) = path.parent() {
		fs::create_dir_all(parent)
			.with_context(|| format!("failed to create log directory {}", parent.display()))?;
	}
	File::options()
		.create(true)
		.append(true)
		.open(path)
		.with_context(|| format!("failed to open log file {}", path.display()))
}

/// Install the global subscriber. Calling this twice is a no-op.
pub fn initialize(target: &LogTarget) -> Result<()> {
	let registry = tracing_subscriber::registry().with(env_filter());
	let installed = match target {
		LogTarget::Stderr => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.try_init(),
		LogTarget::File(path) => {
			let file = open_log_file(path)?;
			registry
				.with(
					tracing_subscriber::fmt::layer()
						.with_ansi(false)
						.with_writer(Mutex::new(file)),
				)
				.try_init()
		}
	};
	if installed.is_err() {
		tracing::debug!("tracing subscriber already installed");
	}
	Ok(())
}
