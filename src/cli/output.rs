use anyhow::Result;
use docket::SearchOutcome;
use docket::query::{SearchPage, SearchResult};
use serde_json::json;

/// Print a plain-text representation of the interactive outcome.
pub(crate) fn print_plain(outcome: &SearchOutcome) {
	if !outcome.accepted {
		println!("Search cancelled");
		return;
	}

	match &outcome.selection {
		Some(result) => println!("{}", plain_line(result)),
		None => println!("No selection"),
	}
}

/// Format the interactive outcome as a JSON string.
pub(crate) fn format_outcome_json(outcome: &SearchOutcome) -> Result<String> {
	let payload = json!({
		"accepted": outcome.accepted,
		"query": outcome.query,
		"selection": outcome.selection,
	});

	Ok(serde_json::to_string_pretty(&payload)?)
}

/// Print the JSON representation of the interactive outcome.
pub(crate) fn print_json(outcome: &SearchOutcome) -> Result<()> {
	println!("{}", format_outcome_json(outcome)?);
	Ok(())
}

/// Print one page of results, one document per line, followed by a
/// pagination footer.
pub(crate) fn print_page_plain(page: &SearchPage) {
	for result in &page.results {
		println!("{}", plain_line(result));
	}
	println!("{}", page_footer(page));
}

pub(crate) fn print_page_json(page: &SearchPage) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(page)?);
	Ok(())
}

fn plain_line(result: &SearchResult) -> String {
	let mut line = format!("{}\t{}", result.id, result.display_name());
	if let Some(content_type) = &result.content_type {
		line.push('\t');
		line.push_str(content_type);
	}
	line
}

fn page_footer(page: &SearchPage) -> String {
	let pagination = &page.pagination;
	if pagination.total == 0 {
		return "no results".to_string();
	}
	format!(
		"page {}/{} ({} results)",
		pagination.current_page, pagination.total_pages, pagination.total
	)
}
