//! Colour themes for the result browser.

mod builtins;

use ratatui::style::Style;

pub use builtins::{LIGHT, SLATE, SOLARIZED};

/// Styles applied to the different parts of the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
	/// Table header, borders and scrollbar.
	pub header: Style,
	/// Selected row.
	pub row_highlight: Style,
	/// Filter prompt.
	pub prompt: Style,
	/// Placeholders and secondary text.
	pub empty: Style,
	/// Active filters and other emphasized text.
	pub highlight: Style,
	/// Error banners.
	pub error: Style,
}

impl Default for Theme {
	fn default() -> Self {
		default_theme()
	}
}

/// Theme used when none is configured.
#[must_use]
pub fn default_theme() -> Theme {
	SLATE
}

/// Lookup a built-in theme by case-insensitive name.
#[must_use]
pub fn by_name(name: &str) -> Option<Theme> {
	let name = name.trim();
	builtins::BUILTINS
		.iter()
		.find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
		.map(|(_, theme)| *theme)
}

/// Names of the built-in themes, sorted.
#[must_use]
pub fn names() -> Vec<&'static str> {
	builtins::BUILTINS.iter().map(|(name, _)| *name).collect()
}
