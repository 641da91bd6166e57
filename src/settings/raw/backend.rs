use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use docket::search::{BackendConfig, StaticToken};
use serde::Deserialize;

use crate::cli::CliArgs;

/// `[backend]` section as read from disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct BackendSection {
	pub(super) base_url: Option<String>,
	pub(super) search_path: Option<String>,
	pub(super) content_search_path: Option<String>,
	pub(super) token: Option<String>,
	pub(super) token_file: Option<PathBuf>,
	pub(super) timeout_ms: Option<u64>,
}

impl BackendSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(url) = cli.base_url.clone() {
			self.base_url = Some(url);
		}
		if let Some(token) = cli.token.clone() {
			self.token = Some(token);
		}
	}

	/// The base URL is checked during validation, so a missing one resolves
	/// to an empty string here.
	pub(super) fn resolve(self) -> Result<(BackendConfig, StaticToken)> {
		let mut config = BackendConfig::new(self.base_url.unwrap_or_default().trim());
		if let Some(path) = self.search_path {
			config.search_path = path;
		}
		if let Some(path) = self.content_search_path {
			config.content_search_path = path;
		}
		config.timeout = self.timeout_ms.map(Duration::from_millis);

		let token = match (self.token, self.token_file) {
			(Some(token), _) => Some(token),
			(None, Some(path)) => Some(
				fs::read_to_string(&path)
					.with_context(|| format!("failed to read token file {}", path.display()))?,
			),
			(None, None) => None,
		};

		Ok((config, StaticToken::new(token)))
	}
}
