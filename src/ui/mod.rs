//! Interactive terminal browser over a [`SearchController`](crate::search::SearchController).
//!
//! [`App`] owns the controller together with the window and prompt state.
//! The runtime pumps terminal input and controller outcomes on one thread.

mod actions;
mod config;
mod render;
mod runtime;
mod state;

pub use config::UiConfig;
pub use runtime::run;
pub use state::{App, Focus, SearchOutcome};
