//! Windowing arithmetic for large result lists.
//!
//! Only the rows intersecting the viewport (plus an overscan margin) are ever
//! materialized. Every other row is represented by reserved space, so the
//! scrollable extent always equals `item_count * item_height`. Units are
//! arbitrary (terminal rows, pixels) as long as they are used consistently.

use std::ops::RangeInclusive;

/// Inclusive span of item indices to materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
	pub start_index: usize,
	pub end_index: usize,
}

impl VisibleRange {
	#[must_use]
	pub fn len(&self) -> usize {
		self.end_index - self.start_index + 1
	}

	/// A range always holds at least one index.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		false
	}

	#[must_use]
	pub fn contains(&self, index: usize) -> bool {
		(self.start_index..=self.end_index).contains(&index)
	}

	#[must_use]
	pub fn indices(&self) -> RangeInclusive<usize> {
		self.start_index..=self.end_index
	}
}

/// Total scrollable extent of `item_count` rows.
#[must_use]
pub fn total_extent(item_count: usize, item_height: usize) -> usize {
	item_count.saturating_mul(item_height)
}

/// Absolute position of the row at `index`.
#[must_use]
pub fn row_offset(index: usize, item_height: usize) -> usize {
	index.saturating_mul(item_height)
}

/// Largest scroll offset that still fills the viewport.
#[must_use]
pub fn max_scroll(item_count: usize, item_height: usize, viewport_height: usize) -> usize {
	total_extent(item_count, item_height).saturating_sub(viewport_height)
}

/// Upper bound on [`VisibleRange::len`] for a given viewport.
///
/// A viewport can straddle one extra partially visible row when the scroll
/// offset is not aligned to a row boundary.
#[must_use]
pub fn max_window_len(viewport_height: usize, item_height: usize, overscan: usize) -> usize {
	if item_height == 0 {
		return 0;
	}
	viewport_height.div_ceil(item_height) + 1 + overscan.saturating_mul(2)
}

/// Compute which rows to render for the given scroll position.
///
/// Returns `None` when nothing can be shown. Scroll offsets past the end are
/// clamped to the last full viewport rather than rejected.
#[must_use]
pub fn compute_visible_range(
	scroll_offset: usize,
	viewport_height: usize,
	item_height: usize,
	overscan: usize,
	item_count: usize,
) -> Option<VisibleRange> {
	if item_count == 0 || item_height == 0 || viewport_height == 0 {
		return None;
	}

	let extent = total_extent(item_count, item_height);
	let scroll = scroll_offset.min(max_scroll(item_count, item_height, viewport_height));
	let first_visible = scroll / item_height;
	let last_unit = scroll.saturating_add(viewport_height).min(extent) - 1;
	let last_visible = last_unit / item_height;

	Some(VisibleRange {
		start_index: first_visible.saturating_sub(overscan),
		end_index: last_visible.saturating_add(overscan).min(item_count - 1),
	})
}

/// Pair each index in `range` with its absolute offset.
pub fn layout_rows(range: VisibleRange, item_height: usize) -> impl Iterator<Item = (usize, usize)> {
	range
		.indices()
		.map(move |index| (index, row_offset(index, item_height)))
}

/// Scroll position, viewport size and selection of a windowed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowState {
	scroll_offset: usize,
	viewport_height: usize,
	item_height: usize,
	overscan: usize,
	selected: Option<usize>,
}

impl Default for WindowState {
	fn default() -> Self {
		Self::new(1, 0)
	}
}

impl WindowState {
	#[must_use]
	pub fn new(item_height: usize, overscan: usize) -> Self {
		Self {
			scroll_offset: 0,
			viewport_height: 0,
			item_height: item_height.max(1),
			overscan,
			selected: None,
		}
	}

	pub fn scroll_offset(&self) -> usize {
		self.scroll_offset
	}

	pub fn viewport_height(&self) -> usize {
		self.viewport_height
	}

	pub fn item_height(&self) -> usize {
		self.item_height
	}

	pub fn overscan(&self) -> usize {
		self.overscan
	}

	pub fn selected(&self) -> Option<usize> {
		self.selected
	}

	/// Number of whole rows that fit in the viewport.
	pub fn viewport_rows(&self) -> usize {
		self.viewport_height / self.item_height
	}

	/// Record a new viewport size and keep the selection on screen.
	pub fn set_viewport_height(&mut self, height: usize, item_count: usize) {
		self.viewport_height = height;
		self.clamp(item_count);
		self.reveal_selected();
	}

	pub fn visible_range(&self, item_count: usize) -> Option<VisibleRange> {
		compute_visible_range(
			self.scroll_offset,
			self.viewport_height,
			self.item_height,
			self.overscan,
			item_count,
		)
	}

	/// Distance between the bottom of the viewport and the end of the list.
	pub fn distance_to_end(&self, item_count: usize) -> usize {
		total_extent(item_count, self.item_height)
			.saturating_sub(self.scroll_offset)
			.saturating_sub(self.viewport_height)
	}

	/// Return to the top with the first row selected.
	pub fn reset(&mut self, item_count: usize) {
		self.scroll_offset = 0;
		self.selected = (item_count > 0).then_some(0);
	}

	/// Pull scroll and selection back inside the list bounds.
	pub fn clamp(&mut self, item_count: usize) {
		self.scroll_offset = self
			.scroll_offset
			.min(max_scroll(item_count, self.item_height, self.viewport_height));
		self.selected = match (item_count, self.selected) {
			(0, _) => None,
			(_, None) => Some(0),
			(count, Some(index)) => Some(index.min(count - 1)),
		};
	}

	/// Select `index` (clamped) and scroll just enough to show it.
	pub fn select(&mut self, index: usize, item_count: usize) {
		if item_count == 0 {
			self.selected = None;
			return;
		}
		self.selected = Some(index.min(item_count - 1));
		self.reveal_selected();
	}

	/// Move the selection by `delta` rows, returning whether it moved.
	pub fn move_selection(&mut self, delta: isize, item_count: usize) -> bool {
		let Some(current) = self.selected else {
			self.select(0, item_count);
			return self.selected.is_some();
		};
		let target = current.saturating_add_signed(delta);
		let before = self.selected;
		self.select(target, item_count);
		before != self.selected
	}

	/// Scroll by `delta` units without moving the selection.
	pub fn scroll_by(&mut self, delta: isize, item_count: usize) {
		self.scroll_offset = self
			.scroll_offset
			.saturating_add_signed(delta)
			.min(max_scroll(item_count, self.item_height, self.viewport_height));
	}

	fn reveal_selected(&mut self) {
		let Some(index) = self.selected else {
			return;
		};
		let top = row_offset(index, self.item_height);
		let bottom = top + self.item_height;
		if top < self.scroll_offset {
			self.scroll_offset = top;
		} else if bottom > self.scroll_offset + self.viewport_height {
			self.scroll_offset = bottom.saturating_sub(self.viewport_height);
		}
	}
}
