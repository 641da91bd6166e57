//! Configuration loading and resolution.
//!
//! `load` layers config files, `DOCKET__*` environment variables and CLI flags,
//! then resolves the result into a validated [`ResolvedConfig`].

mod loader;
mod raw;
mod resolved;
mod sources;

pub use loader::load;
pub use resolved::{ResolvedConfig, ViewOptions};
