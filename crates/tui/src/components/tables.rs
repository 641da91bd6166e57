use docket_query::SearchResult;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, Table, TableState};
use unicode_width::UnicodeWidthStr;

use crate::components::rows::build_result_rows;
use crate::components::scrollbar::{ScrollMetrics, render_scrollbar};
use crate::style::Theme;
use crate::window::{VisibleRange, WindowState};

pub(crate) const HIGHLIGHT_SYMBOL: &str = "▶ ";
pub(crate) const TABLE_COLUMN_SPACING: u16 = 1;
/// Header row + separator height inside the table's viewport.
pub const TABLE_HEADER_ROWS: usize = 2;

/// Everything needed to draw one page of results.
pub struct ResultTable<'a> {
	/// The loaded results; only the visible window is turned into rows.
	pub results: &'a [SearchResult],
	/// Column headers.
	pub headers: Vec<String>,
	/// Column width constraints.
	pub widths: Vec<Constraint>,
	/// Optional title for the bordered table.
	pub title: Option<String>,
}

impl<'a> ResultTable<'a> {
	#[must_use]
	pub fn new(results: &'a [SearchResult]) -> Self {
		Self {
			results,
			headers: default_headers(),
			widths: default_widths(),
			title: None,
		}
	}

	#[must_use]
	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	#[must_use]
	pub fn headers(mut self, headers: Vec<String>) -> Self {
		if !headers.is_empty() {
			self.headers = headers;
		}
		self
	}
}

fn default_headers() -> Vec<String> {
	vec!["Name".into(), "Content type".into(), "Created".into()]
}

fn default_widths() -> Vec<Constraint> {
	vec![
		Constraint::Percentage(55),
		Constraint::Percentage(30),
		Constraint::Length(10),
	]
}

/// Render the windowed result table and return the range that was built.
pub fn render_result_window(
	frame: &mut Frame,
	area: Rect,
	window: &mut WindowState,
	table: ResultTable<'_>,
	theme: &Theme,
) -> Option<VisibleRange> {
	let mut block = Block::default()
		.borders(Borders::ALL)
		.border_set(ratatui::symbols::border::ROUNDED)
		.border_style(Style::default().fg(theme.header.fg.unwrap_or(ratatui::style::Color::Reset)));
	if let Some(title) = table.title.clone() {
		block = block.title(title);
	}
	let inner = block.inner(area);
	frame.render_widget(block, area);

	let item_count = table.results.len();
	let body_height = (inner.height as usize).saturating_sub(TABLE_HEADER_ROWS);
	window.set_viewport_height(body_height, item_count);

	let metrics = ScrollMetrics::compute(item_count, window.item_height(), body_height);
	let table_area = if metrics.needs_scrollbar {
		let mut scrollbar_state = metrics.state(window.scroll_offset());
		let body = Rect {
			y: inner.y + TABLE_HEADER_ROWS as u16,
			height: inner.height.saturating_sub(TABLE_HEADER_ROWS as u16),
			..inner
		};
		render_scrollbar(frame, body, &mut scrollbar_state, theme);
		Rect {
			width: inner.width.saturating_sub(1),
			..inner
		}
	} else {
		inner
	};

	let range = window.visible_range(item_count);
	let selection_width = if window.selected().is_some() {
		UnicodeWidthStr::width(HIGHLIGHT_SYMBOL) as u16
	} else {
		0
	};
	let column_widths = resolve_column_widths(
		table_area,
		&table.widths,
		selection_width,
		TABLE_COLUMN_SPACING,
	);
	let rows = range
		.map(|range| build_result_rows(table.results, range, Some(&column_widths)))
		.unwrap_or_default();

	let mut table_state = window_table_state(window, range);
	let header = Row::new(table.headers.into_iter().map(Cell::from).collect::<Vec<_>>())
		.style(Style::default().fg(theme.header.fg.unwrap_or(ratatui::style::Color::Reset)))
		.height(1)
		.bottom_margin(1);
	let widget = Table::new(rows, table.widths)
		.header(header)
		.column_spacing(TABLE_COLUMN_SPACING)
		.highlight_spacing(HighlightSpacing::WhenSelected)
		.row_highlight_style(theme.row_highlight)
		.highlight_symbol(HIGHLIGHT_SYMBOL);
	frame.render_stateful_widget(widget, table_area, &mut table_state);

	render_header_separator(frame, table_area, theme, 1);

	if item_count == 0 {
		render_empty(frame, inner, theme);
	}

	range
}

/// Map the window's absolute scroll and selection onto the materialized slice.
fn window_table_state(window: &WindowState, range: Option<VisibleRange>) -> TableState {
	let Some(range) = range else {
		return TableState::default();
	};
	let first_visible = window.scroll_offset() / window.item_height();
	let selected = window
		.selected()
		.filter(|index| range.contains(*index))
		.map(|index| index - range.start_index);
	TableState::default()
		.with_offset(first_visible.saturating_sub(range.start_index))
		.with_selected(selected)
}

fn render_empty(frame: &mut Frame, inner: Rect, theme: &Theme) {
	let header_height = TABLE_HEADER_ROWS as u16;
	if inner.height <= header_height {
		return;
	}
	let message_area = Rect {
		y: inner.y + header_height,
		height: inner.height - header_height,
		..inner
	};
	let empty = Paragraph::new("No results")
		.style(theme.empty)
		.alignment(ratatui::layout::Alignment::Center);
	frame.render_widget(empty, message_area);
}

fn render_header_separator(frame: &mut Frame, area: Rect, theme: &Theme, header_height: u16) {
	if header_height >= area.height {
		return;
	}
	let sep_y = area.y + header_height;
	let width = area.width as usize;
	if width == 0 {
		return;
	}

	let sep_rect = Rect {
		x: area.x,
		y: sep_y,
		width: area.width,
		height: 1,
	};
	if width <= 2 {
		frame.render_widget(Paragraph::new(" ".repeat(width)), sep_rect);
		return;
	}

	let middle = "─".repeat(width - 2);
	let middle_style = Style::default().fg(theme.header.fg.unwrap_or(ratatui::style::Color::Reset));
	let spans = vec![
		Span::raw(" "),
		Span::styled(middle, middle_style),
		Span::raw(" "),
	];
	frame.render_widget(Paragraph::new(Text::from(Line::from(spans))), sep_rect);
}

fn resolve_column_widths(
	area: Rect,
	constraints: &[Constraint],
	selection_width: u16,
	column_spacing: u16,
) -> Vec<u16> {
	if constraints.is_empty() {
		return Vec::new();
	}

	let layout_area = Rect {
		x: 0,
		y: 0,
		width: area.width,
		height: 1,
	};
	let [_, columns_area] =
		Layout::horizontal([Constraint::Length(selection_width), Constraint::Fill(0)])
			.areas(layout_area);

	Layout::horizontal(constraints.to_vec())
		.spacing(column_spacing)
		.split(columns_area)
		.iter()
		.map(|rect| rect.width)
		.collect()
}
