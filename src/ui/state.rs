use docket_query::{FilterValue, SearchResult};
use docket_tui::{NearEndTrigger, WindowState};
use indexmap::IndexMap;
use ratatui::style::Style;
use serde::Serialize;
use serde_json::Value;
use throbber_widgets_tui::ThrobberState;
use tui_textarea::TextArea;

use super::config::UiConfig;
use crate::search::{SearchBackend, SearchController};

/// Result of an interactive session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
	/// `false` when the user quit without choosing.
	pub accepted: bool,
	/// Active filters as a query object.
	pub query: IndexMap<String, Value>,
	pub selection: Option<SearchResult>,
}

/// Which widget receives typed keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
	Prompt,
	Results,
}

pub struct App<B: SearchBackend> {
	pub(crate) controller: SearchController<B>,
	pub(crate) window: WindowState,
	pub(crate) trigger: NearEndTrigger,
	pub(crate) input: TextArea<'static>,
	pub(crate) focus: Focus,
	pub(crate) config: UiConfig,
	pub(crate) throbber_state: ThrobberState,
	/// Local message shown instead of the search status, cleared on the next key.
	pub(crate) notice: Option<String>,
	seen_generation: u64,
}

impl<B: SearchBackend> App<B> {
	pub fn new(controller: SearchController<B>, config: UiConfig) -> Self {
		let initial_text = match controller.params().filters.get(&config.text_field) {
			Some(FilterValue::Matches(text) | FilterValue::Like(text) | FilterValue::Contains(text)) => {
				text.clone()
			}
			_ => String::new(),
		};
		let seen_generation = controller.generation();

		Self {
			window: WindowState::new(1, config.overscan),
			trigger: NearEndTrigger::new(config.prefetch_threshold),
			input: new_input(&initial_text),
			focus: Focus::Prompt,
			throbber_state: ThrobberState::default(),
			notice: None,
			seen_generation,
			controller,
			config,
		}
	}

	pub fn controller(&self) -> &SearchController<B> {
		&self.controller
	}

	pub fn focus(&self) -> Focus {
		self.focus
	}

	pub(crate) fn input_text(&self) -> String {
		self.input.lines().join("\n")
	}

	pub(crate) fn reset_input(&mut self) {
		self.input = new_input("");
	}

	pub(crate) fn result_count(&self) -> usize {
		self.controller.view().results().len()
	}

	pub(crate) fn current_selection(&self) -> Option<SearchResult> {
		let index = self.window.selected()?;
		self.controller.view().results().get(index).cloned()
	}

	pub(crate) fn outcome(&self, accepted: bool) -> SearchOutcome {
		SearchOutcome {
			accepted,
			query: self.controller.params().filters.to_query_object(),
			selection: if accepted {
				self.current_selection()
			} else {
				None
			},
		}
	}

	/// Drain controller outcomes and bring the window in line with the page
	/// now on display. A new generation starts again at the top.
	pub(crate) fn pump_search(&mut self) -> bool {
		let changed = self.controller.pump();
		let count = self.result_count();
		let generation = self.controller.view().generation;
		if generation != self.seen_generation {
			self.seen_generation = generation;
			self.window.reset(count);
			self.trigger.reset();
		} else if changed {
			self.window.clamp(count);
			self.trigger.reset();
		}
		changed
	}

	/// Feed the window position to the near-end trigger after a draw and
	/// prefetch the next page when it fires.
	pub(crate) fn observe_scroll(&mut self) {
		let count = self.result_count();
		if count == 0 {
			return;
		}
		let extent = docket_tui::window::total_extent(count, self.window.item_height());
		let threshold_hit = self.trigger.observe(
			extent,
			self.window.scroll_offset(),
			self.window.viewport_height(),
		);
		if threshold_hit && self.controller.prefetch_next_page() {
			tracing::debug!(
				offset = self.controller.params().offset,
				"near end of page, prefetching"
			);
		}
	}
}

fn new_input(text: &str) -> TextArea<'static> {
	let mut input = TextArea::new(vec![text.to_string()]);
	input.set_cursor_line_style(Style::default());
	input.move_cursor(tui_textarea::CursorMove::End);
	input
}
