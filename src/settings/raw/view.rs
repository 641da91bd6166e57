use serde::Deserialize;

use crate::cli::CliArgs;

use crate::settings::ViewOptions;

/// `[view]` section as read from disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct ViewSection {
	pub(super) overscan: Option<usize>,
	pub(super) prefetch_threshold: Option<usize>,
	pub(super) theme: Option<String>,
}

impl ViewSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(theme) = cli.theme.clone() {
			self.theme = Some(theme);
		}
	}

	pub(super) fn resolve(&self) -> ViewOptions {
		let defaults = ViewOptions::default();
		ViewOptions {
			overscan: self.overscan.unwrap_or(defaults.overscan),
			prefetch_threshold: self.prefetch_threshold.unwrap_or(defaults.prefetch_threshold),
			theme: self
				.theme
				.as_deref()
				.map(str::trim)
				.filter(|name| !name.is_empty())
				.map(str::to_string),
		}
	}
}
