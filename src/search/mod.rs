//! Search execution against the document backend.
//!
//! [`SearchController`] turns filter edits into generation-tagged requests,
//! serves repeat requests from [`QueryCache`], and warms the next page ahead
//! of the user. [`HttpBackend`] is the production [`SearchBackend`].

mod backend;
mod cache;
mod controller;
mod debounce;
mod error;
mod http;
mod retry;
mod view;

pub use backend::{CredentialProvider, SearchBackend, StaticToken};
pub use cache::{Freshness, QueryCache};
pub use controller::{ControllerOptions, ParamsUpdate, SearchController};
pub use error::SearchError;
pub use http::{BackendConfig, DEFAULT_CONTENT_SEARCH_PATH, DEFAULT_SEARCH_PATH, HttpBackend};
pub use retry::{RetryPolicy, search_with_retry};
pub use view::{SearchView, Status};
