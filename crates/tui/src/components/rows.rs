use docket_query::SearchResult;
use ratatui::widgets::{Cell, Row};
use unicode_truncate::UnicodeTruncateStr;
use unicode_width::UnicodeWidthStr;

use crate::window::VisibleRange;

const ELLIPSIS: &str = "…";

/// Truncate `text` to `width` columns, marking the cut with an ellipsis.
#[must_use]
pub fn truncate_to_width(text: &str, width: Option<u16>) -> String {
	let Some(width) = width.map(usize::from) else {
		return text.to_string();
	};
	if UnicodeWidthStr::width(text) <= width {
		return text.to_string();
	}
	if width == 0 {
		return String::new();
	}
	let (head, _) = text.unicode_truncate(width - 1);
	format!("{head}{ELLIPSIS}")
}

/// Date portion of an ISO timestamp, or the raw value when it is not one.
#[must_use]
pub fn short_date(value: &str) -> &str {
	match value.get(..10) {
		Some(date) if value.len() > 10 && value.as_bytes().get(10) == Some(&b'T') => date,
		_ => value,
	}
}

/// Build table rows for the results inside `range` only.
#[must_use]
pub fn build_result_rows<'a>(
	results: &'a [SearchResult],
	range: VisibleRange,
	column_widths: Option<&[u16]>,
) -> Vec<Row<'a>> {
	let name_width = column_widths.and_then(|widths| widths.first().copied());
	let type_width = column_widths.and_then(|widths| widths.get(1).copied());

	range
		.indices()
		.filter_map(|index| results.get(index))
		.map(|result| {
			let content_type = result.content_type.as_deref().unwrap_or("");
			let created = result.created_at.as_deref().map(short_date).unwrap_or("");
			Row::new([
				Cell::from(truncate_to_width(result.display_name(), name_width)),
				Cell::from(truncate_to_width(content_type, type_width)),
				Cell::from(created),
			])
		})
		.collect()
}
