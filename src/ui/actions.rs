use anyhow::Result;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{App, Focus, SearchOutcome};
use crate::search::SearchBackend;

impl<B: SearchBackend> App<B> {
	pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Result<Option<SearchOutcome>> {
		self.notice = None;
		match key.code {
			KeyCode::Esc => return Ok(Some(self.outcome(false))),
			KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
				return Ok(Some(self.outcome(false)));
			}
			KeyCode::Tab | KeyCode::BackTab => self.toggle_focus(),
			KeyCode::Up => self.move_selection(-1),
			KeyCode::Down => self.move_selection(1),
			KeyCode::PageUp => self.move_selection(-self.page_rows()),
			KeyCode::PageDown => self.move_selection(self.page_rows()),
			_ => match self.focus {
				Focus::Prompt => self.handle_prompt_key(key),
				Focus::Results => return Ok(self.handle_results_key(key)),
			},
		}
		Ok(None)
	}

	fn handle_prompt_key(&mut self, key: KeyEvent) {
		if key.code == KeyCode::Enter {
			match self.controller.apply_staged() {
				Ok(_) => self.focus = Focus::Results,
				Err(err) => self.notice = Some(err.to_string()),
			}
			return;
		}
		if self.input.input(key) {
			let text = self.input_text();
			let field = self.config.text_field.clone();
			self.controller.stage_text_filter(&field, &text);
		}
	}

	fn handle_results_key(&mut self, key: KeyEvent) -> Option<SearchOutcome> {
		let count = self.result_count();
		match key.code {
			KeyCode::Enter => return Some(self.outcome(true)),
			KeyCode::Home => self.window.select(0, count),
			KeyCode::End => self.window.select(count.saturating_sub(1), count),
			KeyCode::Char('n') => {
				if !self.controller.next_page() {
					self.notice = Some("already on the last page".to_string());
				}
			}
			KeyCode::Char('p') => {
				if !self.controller.previous_page() {
					self.notice = Some("already on the first page".to_string());
				}
			}
			KeyCode::Char('r') => self.controller.refresh(),
			KeyCode::Char('x') => {
				self.reset_input();
				self.controller.clear_filters();
			}
			_ => {}
		}
		None
	}

	fn toggle_focus(&mut self) {
		self.focus = match self.focus {
			Focus::Prompt => Focus::Results,
			Focus::Results => Focus::Prompt,
		};
	}

	/// Move the selection; stepping past the last row turns the page.
	fn move_selection(&mut self, delta: isize) {
		let count = self.result_count();
		let at_end = self
			.window
			.selected()
			.is_some_and(|index| index + 1 >= count);
		if delta > 0 && at_end {
			self.controller.next_page();
			return;
		}
		self.window.move_selection(delta, count);
	}

	fn page_rows(&self) -> isize {
		self.window.viewport_rows().max(1) as isize
	}
}
