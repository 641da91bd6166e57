use docket::query::{Compiler, QueryParams};
use docket::search::{BackendConfig, ControllerOptions, StaticToken};

mod errors;
mod sources;
mod summary;
mod validation;

pub(crate) use errors::ConfigError;
pub(crate) use sources::{ConfigSources, SettingSource};

/// Application-ready configuration derived from user input, config files and
/// sensible defaults.
#[derive(Debug)]
pub struct ResolvedConfig {
	pub backend: BackendConfig,
	pub token: StaticToken,
	pub compiler: Compiler,
	/// Parameters of the first search, including the seeded filters.
	pub params: QueryParams,
	pub controller: ControllerOptions,
	pub view: ViewOptions,
}

/// Settings for the interactive result window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
	/// Rows rendered beyond each edge of the viewport.
	pub overscan: usize,
	/// Rows from the end at which the next page is prefetched.
	pub prefetch_threshold: usize,
	pub theme: Option<String>,
}

impl Default for ViewOptions {
	fn default() -> Self {
		Self {
			overscan: 3,
			prefetch_threshold: 5,
			theme: None,
		}
	}
}

impl ResolvedConfig {
	pub(super) fn validate(&self, sources: &ConfigSources) -> Result<(), ConfigError> {
		validation::validate(self, sources)
	}

	/// Print a human readable summary of the effective configuration.
	pub fn print_summary(&self) {
		print!("{}", summary::render_summary(self));
	}
}

#[cfg(test)]
pub(super) fn sample_config() -> ResolvedConfig {
	ResolvedConfig {
		backend: BackendConfig::new("https://docs.example"),
		token: StaticToken::default(),
		compiler: Compiler::default(),
		params: QueryParams::default(),
		controller: ControllerOptions::default(),
		view: ViewOptions::default(),
	}
}
