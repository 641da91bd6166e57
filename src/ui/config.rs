use docket_query::field::FILENAME;
use docket_tui::Theme;

/// Presentation settings for [`App`](super::App).
#[derive(Debug, Clone, PartialEq)]
pub struct UiConfig {
	pub theme: Theme,
	/// Label drawn before the text input.
	pub input_label: String,
	/// Textual field edited through the prompt.
	pub text_field: String,
	pub overscan: usize,
	/// Rows from the end at which the next page is prefetched.
	pub prefetch_threshold: usize,
}

impl Default for UiConfig {
	fn default() -> Self {
		Self {
			theme: Theme::default(),
			input_label: "Filename".to_string(),
			text_field: FILENAME.to_string(),
			overscan: 3,
			prefetch_threshold: 5,
		}
	}
}
