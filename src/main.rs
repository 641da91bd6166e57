mod cli;
mod settings;
mod workflow;

use anyhow::Result;
use cli::{OutputFormat, parse_cli, print_json, print_page_json, print_page_plain, print_plain};
use docket::logging::{self, LogTarget};
use docket::tui::style;
use settings::ResolvedConfig;
use workflow::SearchWorkflow;

fn main() -> Result<()> {
	let cli = parse_cli();

	if cli.list_themes {
		for name in style::names() {
			println!("{name}");
		}
		return Ok(());
	}

	let resolved = settings::load(&cli)?;

	if cli.print_config {
		resolved.print_summary();
	}

	if cli.once {
		logging::initialize(&LogTarget::Stderr)?;
		run_once(cli.output, resolved)
	} else {
		logging::initialize(&LogTarget::default_file()?)?;
		run_search(cli.output, resolved)
	}
}

/// Run the interactive browser and print the selection in the chosen format.
fn run_search(format: OutputFormat, settings: ResolvedConfig) -> Result<()> {
	let workflow = SearchWorkflow::from_config(settings)?;
	let outcome = workflow.run()?;

	match format {
		OutputFormat::Plain => print_plain(&outcome),
		OutputFormat::Json => print_json(&outcome)?,
	}

	Ok(())
}

/// Fetch one page without a terminal UI and print it.
fn run_once(format: OutputFormat, settings: ResolvedConfig) -> Result<()> {
	let workflow = SearchWorkflow::from_config(settings)?;
	let page = workflow.run_once()?;

	match format {
		OutputFormat::Plain => print_page_plain(&page),
		OutputFormat::Json => print_page_json(&page)?,
	}

	Ok(())
}
