//! Filter prompt with an inline loading indicator.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_textarea::TextArea;
use unicode_width::UnicodeWidthStr;

use crate::style::Theme;

/// What to draw in the prompt row.
pub struct InputContext<'a> {
	pub input: &'a TextArea<'static>,
	pub label: &'a str,
	pub area: Rect,
	pub theme: &'a Theme,
}

/// Status text drawn at the right edge of the prompt row.
pub struct ProgressState<'a> {
	pub text: &'a str,
	pub loading: bool,
	pub throbber_state: &'a ThrobberState,
}

/// Render the label, the text input and the status text on one row.
pub fn render_input(frame: &mut Frame, input: InputContext<'_>, progress: ProgressState<'_>) {
	let InputContext {
		input,
		label,
		area,
		theme,
	} = input;
	if area.width == 0 || area.height == 0 {
		return;
	}

	let label_width = if label.is_empty() {
		0
	} else {
		UnicodeWidthStr::width(label) as u16 + 3
	};
	let [label_area, input_area] =
		Layout::horizontal([Constraint::Length(label_width), Constraint::Fill(1)]).areas(area);

	if !label.is_empty() {
		let prompt = Paragraph::new(format!("{label} > ")).style(theme.prompt);
		frame.render_widget(prompt, label_area);
	}
	frame.render_widget(input, input_area);
	render_progress(frame, input_area, progress, theme);
}

fn render_progress(frame: &mut Frame, area: Rect, progress: ProgressState<'_>, theme: &Theme) {
	if area.width == 0 || area.height == 0 || (progress.text.is_empty() && !progress.loading) {
		return;
	}

	let muted_style = theme.empty;
	let mut line = Line::default();
	if progress.loading {
		let spinner = Throbber::default()
			.style(muted_style)
			.throbber_style(muted_style);
		line.spans.push(spinner.to_symbol_span(progress.throbber_state));
	}
	line.spans.push(Span::styled(progress.text.to_string(), muted_style));

	let line_width = line.width() as u16;
	if line_width == 0 {
		return;
	}

	let buffer = frame.buffer_mut();
	let mut start_x = if line_width >= area.width {
		area.left()
	} else {
		area.right().saturating_sub(line_width)
	};

	let input_row = area.top();
	let mut last_char_x: Option<u16> = None;
	for x in area.left()..area.right() {
		if let Some(cell) = buffer.cell((x, input_row))
			&& !cell.symbol().trim().is_empty()
		{
			last_char_x = Some(x);
		}
	}

	// Keep two columns between typed text and the status.
	if let Some(last_x) = last_char_x {
		let min_start = last_x.saturating_add(3);
		if min_start > start_x {
			start_x = min_start;
		}
	}

	if start_x >= area.right() {
		return;
	}

	let max_width = area
		.right()
		.saturating_sub(start_x)
		.min(line_width)
		.min(area.width);
	if max_width == 0 {
		return;
	}

	buffer.set_line(start_x, input_row, &line, max_width);
}
