//! Widgets used by the result browser.

/// Filter prompt and loading indicator.
pub mod prompt;
/// Table row construction.
pub mod rows;
/// Scrollbar for windowed viewports.
pub mod scrollbar;
/// Windowed result table.
pub mod tables;

pub use prompt::{InputContext, ProgressState, render_input};
pub use scrollbar::{ScrollMetrics, render_scrollbar};
pub use tables::{ResultTable, render_result_window};
