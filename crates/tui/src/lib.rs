//! Terminal widgets and windowing primitives for browsing large result lists.
//!
//! [`window`] holds the scroll arithmetic that decides which rows exist at
//! all, [`trigger`] decides when the next page should be requested, and
//! [`components`] draws the materialized rows with ratatui.

pub mod components;
pub mod style;
pub mod trigger;
pub mod window;

pub use crate::components::{rows as utils, tables};
pub use crate::style::{Theme, default_theme};
pub use crate::trigger::NearEndTrigger;
pub use crate::window::{VisibleRange, WindowState, compute_visible_range};
