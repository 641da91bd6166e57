use std::fmt::Write;
use std::time::Duration;

use super::ResolvedConfig;

pub(super) fn render_summary(config: &ResolvedConfig) -> String {
	let mut out = String::new();
	let _ = writeln!(out, "Effective configuration:");
	let _ = writeln!(out, "  Backend: {}", config.backend.base_url);
	let _ = writeln!(out, "  Search path: {}", config.backend.search_path);
	let _ = writeln!(
		out,
		"  Content search path: {}",
		config.backend.content_search_path
	);
	let _ = writeln!(out, "  Token: {}", bool_to_word(config.token.is_set()));
	match config.backend.timeout {
		Some(timeout) => {
			let _ = writeln!(out, "  Request timeout: {}", millis(timeout));
		}
		None => {
			let _ = writeln!(out, "  Request timeout: none");
		}
	}

	let _ = writeln!(out, "  Page size: {}", config.params.count);
	if config.params.offset > 0 {
		let _ = writeln!(out, "  Start offset: {}", config.params.offset);
	}
	if !config.params.projection.is_empty() {
		let _ = writeln!(out, "  Projection: {}", config.params.projection.join(", "));
	}
	for default in config.compiler.defaults() {
		let _ = writeln!(
			out,
			"  Default facet: {} = {}",
			default.key,
			default.value.to_json()
		);
	}
	let _ = writeln!(out, "  Default facet policy: {}", config.compiler.policy());
	let fields: Vec<_> = config
		.compiler
		.registry()
		.iter()
		.map(|(key, kind)| format!("{key}:{kind}"))
		.collect();
	let _ = writeln!(out, "  Fields: {}", fields.join(", "));
	if config.params.filters.is_empty() {
		let _ = writeln!(out, "  Initial filters: (none)");
	} else {
		for (key, value) in config.params.filters.iter() {
			let _ = writeln!(out, "  Initial filter: {key} = {}", value.to_json());
		}
	}

	let options = &config.controller;
	let _ = writeln!(out, "  Stale time: {}", millis(options.stale_time));
	let _ = writeln!(out, "  GC time: {}", millis(options.gc_time));
	let _ = writeln!(
		out,
		"  Retries: {} (backoff {} to {})",
		options.retry.max_retries,
		millis(options.retry.base_delay),
		millis(options.retry.max_delay)
	);
	let _ = writeln!(out, "  Debounce: {}", millis(options.debounce));
	let _ = writeln!(out, "  Auto apply: {}", bool_to_word(options.auto_apply));

	let _ = writeln!(out, "  Overscan: {} rows", config.view.overscan);
	let _ = writeln!(
		out,
		"  Prefetch threshold: {} rows",
		config.view.prefetch_threshold
	);
	let _ = writeln!(
		out,
		"  UI theme: {}",
		config
			.view
			.theme
			.as_deref()
			.unwrap_or("(use the library default)")
	);
	out
}

fn millis(duration: Duration) -> String {
	format!("{}ms", duration.as_millis())
}

fn bool_to_word(value: bool) -> &'static str {
	if value { "yes" } else { "no" }
}
