use std::future::Future;

use docket_query::{SearchRequest, SearchResponse};

use super::SearchError;

/// Something that can answer a compiled search request.
///
/// Implementations are shared across spawned fetch tasks, so they must be
/// `Send + Sync` and their futures `Send`.
pub trait SearchBackend: Send + Sync + 'static {
	fn search(
		&self,
		request: &SearchRequest,
	) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send;
}

/// Supplies the bearer credential attached to each request.
pub trait CredentialProvider: Send + Sync + 'static {
	fn bearer_token(&self) -> Option<String>;
}

/// A credential fixed at startup, read from config, `DOCKET_TOKEN` or a token file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticToken(Option<String>);

impl StaticToken {
	#[must_use]
	pub fn new(token: Option<String>) -> Self {
		Self(token.map(|token| token.trim().to_string()).filter(|token| !token.is_empty()))
	}

	pub fn is_set(&self) -> bool {
		self.0.is_some()
	}
}

impl CredentialProvider for StaticToken {
	fn bearer_token(&self) -> Option<String> {
		self.0.clone()
	}
}
