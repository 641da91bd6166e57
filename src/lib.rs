//! Faceted document search: a cached, generation-ordered search controller
//! over an HTTP document backend and a windowed terminal browser for its
//! results.
//!
//! The filter model and query compiler live in [`query`] (`docket-query`);
//! the rendering primitives live in [`tui`] (`docket-tui`).

pub mod app_dirs;
pub mod logging;
pub mod search;
pub mod ui;

pub use docket_query as query;
pub use docket_tui as tui;

pub use search::{HttpBackend, SearchController, SearchView, Status};
pub use tui::{Theme, default_theme};
pub use ui::{App, SearchOutcome, UiConfig, run};
