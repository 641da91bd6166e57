use std::time::Duration;

use anyhow::{Error, Result};
use docket::query::{
	Compiler, DEFAULT_PAGE_SIZE, DEFAULT_SOURCE_SYSTEM, DefaultFacetPolicy, FieldRegistry,
	FilterValue, field::SOURCE_SYSTEM,
};
use docket::search::{ControllerOptions, RetryPolicy};
use serde::Deserialize;

use crate::cli::CliArgs;

/// `[search]` section as read from disk.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct SearchSection {
	pub(super) page_size: Option<u64>,
	pub(super) projection: Option<Vec<String>>,
	pub(super) stale_time_ms: Option<u64>,
	pub(super) gc_time_ms: Option<u64>,
	pub(super) max_retries: Option<u32>,
	pub(super) retry_base_delay_ms: Option<u64>,
	pub(super) retry_max_delay_ms: Option<u64>,
	pub(super) debounce_ms: Option<u64>,
	pub(super) auto_apply: Option<bool>,
	pub(super) default_source_system: Option<String>,
	pub(super) default_facet_policy: Option<String>,
}

impl SearchSection {
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		if let Some(size) = cli.page_size {
			self.page_size = Some(size);
		}
	}

	pub(super) fn page_size(&self) -> u64 {
		self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
	}

	/// Build the compiler. An empty `default_source_system` disables the
	/// injected partition altogether.
	pub(super) fn compiler(&self, registry: FieldRegistry) -> Result<Compiler> {
		let policy = match &self.default_facet_policy {
			Some(raw) => raw.parse::<DefaultFacetPolicy>().map_err(Error::msg)?,
			None => DefaultFacetPolicy::default(),
		};
		let source_system = self
			.default_source_system
			.as_deref()
			.unwrap_or(DEFAULT_SOURCE_SYSTEM)
			.trim();

		let mut compiler = Compiler::new(registry).with_policy(policy);
		if !source_system.is_empty() {
			compiler =
				compiler.with_default(SOURCE_SYSTEM, FilterValue::Matches(source_system.to_string()));
		}
		Ok(compiler)
	}

	pub(super) fn controller_options(&self) -> ControllerOptions {
		let defaults = ControllerOptions::default();
		let retry_defaults = RetryPolicy::default();
		ControllerOptions {
			stale_time: millis_or(self.stale_time_ms, defaults.stale_time),
			gc_time: millis_or(self.gc_time_ms, defaults.gc_time),
			retry: RetryPolicy {
				max_retries: self.max_retries.unwrap_or(retry_defaults.max_retries),
				base_delay: millis_or(self.retry_base_delay_ms, retry_defaults.base_delay),
				max_delay: millis_or(self.retry_max_delay_ms, retry_defaults.max_delay),
			},
			debounce: millis_or(self.debounce_ms, defaults.debounce),
			auto_apply: self.auto_apply.unwrap_or(defaults.auto_apply),
		}
	}
}

fn millis_or(value: Option<u64>, fallback: Duration) -> Duration {
	value.map(Duration::from_millis).unwrap_or(fallback)
}
