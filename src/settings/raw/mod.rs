use std::env;

use anyhow::{Context, Error, Result};
use docket::query::{FieldRegistry, Filter, FilterSet, QueryParams, QueryType};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::cli::CliArgs;

use super::resolved::{ConfigSources, ResolvedConfig, SettingSource};

mod backend;
mod search;
mod view;

use backend::BackendSection;
use search::SearchSection;
use view::ViewSection;

/// Mirror of the configuration file representation before CLI overrides and
/// validation are applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(super) struct RawConfig {
	backend: BackendSection,
	search: SearchSection,
	view: ViewSection,
	/// Field type overrides, `key = "matches" | "like" | "in" | "range" | "contains"`.
	fields: IndexMap<String, String>,
	/// Query object seeding the initial filters.
	filters: IndexMap<String, Value>,
}

impl RawConfig {
	/// Apply CLI overrides on top of the raw configuration values.
	pub(super) fn apply_cli_overrides(&mut self, cli: &CliArgs) {
		self.backend.apply_cli_overrides(cli);
		self.search.apply_cli_overrides(cli);
		self.view.apply_cli_overrides(cli);
	}

	/// Convert the raw configuration into a [`ResolvedConfig`], validating and
	/// filling defaults where required.
	pub(super) fn resolve(self, cli: &CliArgs) -> Result<ResolvedConfig> {
		let sources = ConfigSources {
			base_url: detect_source(
				cli.base_url.is_some(),
				self.backend.base_url.is_some(),
				"DOCKET__BACKEND__BASE_URL",
				"--base-url",
				"backend.base_url",
			),
			page_size: detect_source(
				cli.page_size.is_some(),
				self.search.page_size.is_some(),
				"DOCKET__SEARCH__PAGE_SIZE",
				"--page-size",
				"search.page_size",
			),
			retry_base_delay: detect_source(
				false,
				self.search.retry_base_delay_ms.is_some(),
				"DOCKET__SEARCH__RETRY_BASE_DELAY_MS",
				"",
				"search.retry_base_delay_ms",
			),
			theme: detect_source(
				cli.theme.is_some(),
				self.view.theme.is_some(),
				"DOCKET__VIEW__THEME",
				"--theme",
				"view.theme",
			),
		};

		let registry = resolve_registry(&self.fields)?;
		let filters = initial_filters(&self.filters, cli, &registry)?;
		let (backend, token) = self.backend.resolve()?;
		let compiler = self.search.compiler(registry)?;
		let controller = self.search.controller_options();
		let params = QueryParams::new(self.search.page_size())
			.with_filters(filters)
			.with_offset(cli.offset.unwrap_or(0))
			.with_projection(self.search.projection.clone().unwrap_or_default());
		let view = self.view.resolve();

		let config = ResolvedConfig {
			backend,
			token,
			compiler,
			params,
			controller,
			view,
		};

		config.validate(&sources).map_err(Error::new)?;

		Ok(config)
	}
}

/// Find the registered spelling of `key`. Config sources may fold keys to
/// lower case, so registry keys are matched without regard to case.
fn canonical_key(registry: &FieldRegistry, key: &str) -> Option<String> {
	registry
		.iter()
		.map(|(known, _)| known)
		.find(|known| known.eq_ignore_ascii_case(key))
		.map(str::to_string)
}

fn resolve_registry(fields: &IndexMap<String, String>) -> Result<FieldRegistry> {
	let mut registry = FieldRegistry::default();
	for (key, raw_type) in fields {
		let query_type = raw_type
			.parse::<QueryType>()
			.map_err(Error::msg)
			.with_context(|| format!("invalid type for field '{key}'"))?;
		let key = canonical_key(&registry, key).unwrap_or_else(|| key.clone());
		registry.register(key, query_type);
	}
	Ok(registry)
}

/// Seed filters from `[filters]`, then `--filters-json`, then each `--filter`.
/// Later sources replace earlier values for the same key.
fn initial_filters(
	configured: &IndexMap<String, Value>,
	cli: &CliArgs,
	registry: &FieldRegistry,
) -> Result<FilterSet> {
	let configured: IndexMap<String, Value> = configured
		.iter()
		.map(|(key, value)| {
			let key = canonical_key(registry, key).unwrap_or_else(|| key.clone());
			(key, value.clone())
		})
		.collect();
	let mut set = FilterSet::from_query_object(&configured, registry)
		.context("invalid [filters] configuration")?;

	if let Some(json) = &cli.filters_json {
		let object: IndexMap<String, Value> =
			serde_json::from_str(json).context("--filters-json must be a JSON object")?;
		let overrides = FilterSet::from_query_object(&object, registry)
			.context("invalid filter in --filters-json")?;
		for (key, value) in overrides.iter() {
			set.apply(registry, key, value.clone())?;
		}
	}

	for assignment in &cli.filters {
		let filter = Filter::parse_assignment(registry, assignment)
			.with_context(|| format!("invalid --filter '{assignment}'"))?;
		set.apply(registry, &filter.key, filter.value)?;
	}

	Ok(set)
}

fn detect_source(
	cli_present: bool,
	value_present: bool,
	env_var: &'static str,
	cli_flag: &'static str,
	key: &'static str,
) -> Option<SettingSource> {
	if !value_present {
		return None;
	}

	if cli_present {
		return Some(SettingSource::CliFlag(cli_flag));
	}

	if env::var_os(env_var).is_some() {
		return Some(SettingSource::Environment(env_var));
	}

	Some(SettingSource::ConfigKey(key))
}
