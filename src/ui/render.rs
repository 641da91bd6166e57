use docket_tui::components::{InputContext, ProgressState, ResultTable, render_input, render_result_window};
use ratatui::{
	Frame,
	layout::{Constraint, Layout, Margin},
};

use super::state::{App, Focus};
use crate::search::{SearchBackend, Status};

impl<B: SearchBackend> App<B> {
	pub(crate) fn draw(&mut self, frame: &mut Frame) {
		let area = frame.area().inner(Margin {
			vertical: 0,
			horizontal: 1,
		});
		let [prompt_area, results_area] =
			Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(area);

		let status = self.status_text();
		let loading = self.notice.is_none() && self.controller.view().is_loading();
		let label = match self.focus {
			Focus::Prompt => self.config.input_label.clone(),
			Focus::Results => format!("({})", self.config.input_label),
		};
		render_input(
			frame,
			InputContext {
				input: &self.input,
				label: &label,
				area: prompt_area,
				theme: &self.config.theme,
			},
			ProgressState {
				text: &status,
				loading,
				throbber_state: &self.throbber_state,
			},
		);

		let title = self.table_title();
		let results = self.controller.view().results();
		render_result_window(
			frame,
			results_area,
			&mut self.window,
			ResultTable::new(results).title(title),
			&self.config.theme,
		);
	}

	/// Status shown at the right of the prompt: a local notice, the error of
	/// the current generation, or the pagination of the page on display.
	pub(crate) fn status_text(&self) -> String {
		if let Some(notice) = &self.notice {
			return notice.clone();
		}
		let view = self.controller.view();
		if let Some(error) = &view.error {
			return format!("error: {error}");
		}
		match (&view.data, view.status) {
			(_, Status::Pending) => "searching".to_string(),
			(Some(page), _) => {
				let pagination = &page.pagination;
				if pagination.total == 0 {
					"no matches".to_string()
				} else {
					format!(
						"page {}/{} · {} documents",
						pagination.current_page, pagination.total_pages, pagination.total
					)
				}
			}
			(None, _) => String::new(),
		}
	}

	fn table_title(&self) -> String {
		let filters = &self.controller.params().filters;
		if filters.is_empty() {
			return " Documents ".to_string();
		}
		let keys: Vec<_> = filters.iter().map(|(key, _)| key).collect();
		format!(" Documents [{}] ", keys.join(", "))
	}
}
