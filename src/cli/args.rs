use std::fmt::Write;
use std::path::PathBuf;

use clap::{
	ArgAction, ColorChoice, Command, CommandFactory, FromArgMatches, Parser, ValueEnum,
	builder::{
		Styles,
		styling::{AnsiColor, Effects},
	},
};
use docket::app_dirs;

use super::annotations::dim_cli_annotations;

/// Produce the full version banner including config and data directories.
fn long_version() -> &'static str {
	let config_dir = match app_dirs::get_config_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};
	let data_dir = match app_dirs::get_data_dir() {
		Ok(path) => path.display().to_string(),
		Err(err) => format!("unavailable ({err})"),
	};

	let mut details = format!("docket {}", env!("CARGO_PKG_VERSION"));
	let _ = writeln!(details);
	let _ = writeln!(details, "config directory: {config_dir}");
	let _ = writeln!(details, "data directory: {data_dir}");

	Box::leak(details.into_boxed_str())
}

fn cli_styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
		.literal(AnsiColor::Cyan.on_default())
		.placeholder(AnsiColor::Yellow.on_default())
}

/// Parse command line arguments into [`CliArgs`].
pub(crate) fn parse_cli() -> CliArgs {
	let mut matches = tinted_cli_command().get_matches();
	CliArgs::from_arg_matches_mut(&mut matches).unwrap_or_else(|err| err.exit())
}

fn tinted_cli_command() -> Command {
	CliArgs::command().mut_args(dim_cli_annotations)
}

#[derive(Parser, Debug)]
#[command(
	name = "docket",
	version,
	long_version = long_version(),
	about = "Faceted document search with a windowed result browser",
	color = ColorChoice::Auto,
	styles = cli_styles()
)]
/// Command-line arguments accepted by the `docket` binary.
pub(crate) struct CliArgs {
	#[arg(
		short,
		long = "config",
		value_name = "FILE",
		env = "DOCKET_CONFIG",
		action = ArgAction::Append,
		help = "Additional configuration file to merge (default: none)"
	)]
	pub(crate) config: Vec<PathBuf>,
	#[arg(
		short = 'n',
		long = "no-config",
		help = "Skip loading default configuration files (default: disabled)"
	)]
	pub(crate) no_config: bool,
	#[arg(
		short = 'b',
		long = "base-url",
		value_name = "URL",
		help = "Document backend base URL (default: backend.base_url)"
	)]
	pub(crate) base_url: Option<String>,
	#[arg(
		long,
		value_name = "TOKEN",
		env = "DOCKET_TOKEN",
		hide_env_values = true,
		help = "Bearer token sent with every request (default: backend.token or backend.token_file)"
	)]
	pub(crate) token: Option<String>,
	#[arg(
		short = 'f',
		long = "filter",
		value_name = "KEY=VALUE",
		action = ArgAction::Append,
		help = "Apply a filter; lists are comma separated and ranges use FROM..TO (default: none)"
	)]
	pub(crate) filters: Vec<String>,
	#[arg(
		long = "filters-json",
		value_name = "JSON",
		help = "Seed filters from a JSON query object (default: the [filters] table)"
	)]
	pub(crate) filters_json: Option<String>,
	#[arg(
		short = 's',
		long = "page-size",
		value_name = "NUM",
		help = "Results per page (default: 20)"
	)]
	pub(crate) page_size: Option<u64>,
	#[arg(long, value_name = "NUM", help = "Start at this result offset (default: 0)")]
	pub(crate) offset: Option<u64>,
	#[arg(long, value_name = "THEME", help = "Select a theme by name (default: slate)")]
	pub(crate) theme: Option<String>,
	#[arg(
		long,
		help = "Run one search, print the page and exit (default: interactive)"
	)]
	pub(crate) once: bool,
	#[arg(
		short = 'p',
		long = "print-config",
		help = "Print the resolved configuration before running (default: disabled)"
	)]
	pub(crate) print_config: bool,
	#[arg(
		short = 'l',
		long = "list-themes",
		help = "List supported themes and exit (default: disabled)"
	)]
	pub(crate) list_themes: bool,
	#[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Plain, help = "Choose how to print results")]
	pub(crate) output: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
/// Output formats supported by the CLI utility.
pub(crate) enum OutputFormat {
	Plain,
	Json,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn command_supports_custom_styles() {
		let command = tinted_cli_command();
		assert!(command.get_about().is_some());
		command.debug_assert();
	}

	#[test]
	fn defaults_are_interactive_plain_output() {
		let parsed = CliArgs::try_parse_from(["docket"]).unwrap();
		assert_eq!(parsed.output, OutputFormat::Plain);
		assert!(!parsed.once);
		assert!(parsed.filters.is_empty());
	}

	#[test]
	fn filters_are_repeatable() {
		let parsed = CliArgs::try_parse_from([
			"docket",
			"--filter",
			"contentType=application/pdf",
			"-f",
			"createdAt=2024-01-01..2024-02-01",
			"--once",
			"--output",
			"json",
		])
		.unwrap();
		assert_eq!(parsed.filters.len(), 2);
		assert!(parsed.once);
		assert_eq!(parsed.output, OutputFormat::Json);
	}
}
