//! Scrollbar for the windowed result list.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::style::Theme;
use crate::window::{max_scroll, total_extent};

/// Precomputed scrolling metrics for a windowed viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollMetrics {
	/// Total extent of the content, including rows that are never materialized.
	pub content_length: usize,
	/// Extent of the viewport.
	pub viewport_len: usize,
	/// Maximum scroll offset.
	pub max_scroll: usize,
	/// Whether content overflows and needs a scrollbar.
	pub needs_scrollbar: bool,
}

impl ScrollMetrics {
	/// Compute scroll metrics for `item_count` rows of `item_height`.
	///
	/// Returns default (empty) metrics if there is nothing to scroll.
	#[must_use]
	pub fn compute(item_count: usize, item_height: usize, viewport_height: usize) -> Self {
		let content_length = total_extent(item_count, item_height);
		if content_length == 0 || viewport_height == 0 {
			return Self::default();
		}

		let viewport_len = viewport_height.min(content_length).max(1);
		Self {
			content_length,
			viewport_len,
			max_scroll: max_scroll(item_count, item_height, viewport_height),
			needs_scrollbar: content_length > viewport_len,
		}
	}

	/// Convert a scroll offset to a scrollbar position.
	#[must_use]
	pub fn scrollbar_position(&self, scroll: usize) -> usize {
		if self.max_scroll == 0 || self.content_length == 0 {
			0
		} else {
			scroll.min(self.max_scroll).saturating_mul(self.content_length.saturating_sub(1))
				/ self.max_scroll
		}
	}

	/// Build ratatui scrollbar state for the given scroll offset.
	#[must_use]
	pub fn state(&self, scroll: usize) -> ScrollbarState {
		ScrollbarState::new(self.content_length)
			.viewport_content_length(self.viewport_len)
			.position(self.scrollbar_position(scroll))
	}
}

/// Render a themed vertical scrollbar on the right edge of `area` and return
/// the area left for content.
pub fn render_scrollbar(
	frame: &mut Frame,
	area: Rect,
	scrollbar_state: &mut ScrollbarState,
	theme: &Theme,
) -> Rect {
	let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
		.begin_symbol(None)
		.end_symbol(None)
		.track_symbol(Some("│"))
		.style(Style::default().fg(theme.header.fg.unwrap_or(ratatui::style::Color::Reset)));

	let sb_area = Rect {
		x: area.x + area.width.saturating_sub(1),
		y: area.y,
		width: 1,
		height: area.height,
	};
	frame.render_stateful_widget(scrollbar, sb_area, scrollbar_state);

	Rect {
		x: area.x,
		y: area.y,
		width: area.width.saturating_sub(1),
		height: area.height,
	}
}
