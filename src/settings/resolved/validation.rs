use docket::tui::style;

use super::{ConfigError, ConfigSources, ResolvedConfig};

pub(super) fn validate(
	config: &ResolvedConfig,
	sources: &ConfigSources,
) -> Result<(), ConfigError> {
	let base_url = config.backend.base_url.as_str();
	if base_url.is_empty() {
		return Err(ConfigError::invalid(
			"backend.base_url",
			base_url,
			sources.source_for_base_url(),
			"a backend URL is required",
		));
	}
	if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
		return Err(ConfigError::invalid(
			"backend.base_url",
			base_url,
			sources.source_for_base_url(),
			"must start with http:// or https://",
		));
	}

	if config.params.count == 0 {
		return Err(ConfigError::invalid(
			"search.page_size",
			config.params.count.to_string(),
			sources.source_for_page_size(),
			"must be greater than zero",
		));
	}

	let retry = &config.controller.retry;
	if retry.base_delay > retry.max_delay {
		return Err(ConfigError::invalid(
			"search.retry_base_delay_ms",
			retry.base_delay.as_millis().to_string(),
			sources.source_for_retry_base_delay(),
			format!(
				"must not exceed search.retry_max_delay_ms ({})",
				retry.max_delay.as_millis()
			),
		));
	}

	if let Some(theme) = &config.view.theme
		&& style::by_name(theme).is_none()
	{
		return Err(ConfigError::invalid(
			"view.theme",
			theme.as_str(),
			sources.source_for_theme(),
			format!("expected one of: {}", style::names().join(", ")),
		));
	}

	Ok(())
}
