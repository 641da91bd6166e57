//! reqwest implementation of [`SearchBackend`].

use std::time::Duration;

use docket_query::{SearchRequest, SearchResponse};
use reqwest::Client;

use super::{CredentialProvider, SearchBackend, SearchError, StaticToken};

pub const DEFAULT_SEARCH_PATH: &str = "/api/documents/search";
pub const DEFAULT_CONTENT_SEARCH_PATH: &str = "/api/documents/content-search";
const MAX_ERROR_BODY: usize = 512;

/// Connection settings for [`HttpBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
	pub base_url: String,
	pub search_path: String,
	pub content_search_path: String,
	pub timeout: Option<Duration>,
}

impl BackendConfig {
	#[must_use]
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			search_path: DEFAULT_SEARCH_PATH.to_string(),
			content_search_path: DEFAULT_CONTENT_SEARCH_PATH.to_string(),
			timeout: None,
		}
	}

	/// Full URL for `request`, routing full-text queries to the content endpoint.
	#[must_use]
	pub fn endpoint(&self, request: &SearchRequest) -> String {
		let path = if request.uses_content_search() {
			&self.content_search_path
		} else {
			&self.search_path
		};
		join_url(&self.base_url, path)
	}
}

fn join_url(base: &str, path: &str) -> String {
	let base = base.trim_end_matches('/');
	let path = path.trim_start_matches('/');
	format!("{base}/{path}")
}

/// POSTs compiled requests as JSON to the document backend.
#[derive(Debug, Clone)]
pub struct HttpBackend<C = StaticToken> {
	client: Client,
	config: BackendConfig,
	credentials: C,
}

impl<C: CredentialProvider> HttpBackend<C> {
	pub fn new(config: BackendConfig, credentials: C) -> Result<Self, SearchError> {
		let mut builder = Client::builder();
		if let Some(timeout) = config.timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|err| SearchError::Network(format!("failed to build HTTP client: {err}")))?;
		Ok(Self {
			client,
			config,
			credentials,
		})
	}

	pub fn config(&self) -> &BackendConfig {
		&self.config
	}

	async fn post(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
		let url = self.config.endpoint(request);
		let mut builder = self.client.post(&url).json(request);
		if let Some(token) = self.credentials.bearer_token() {
			builder = builder.bearer_auth(token);
		}

		let response = builder
			.send()
			.await
			.map_err(|err| SearchError::Network(err.to_string()))?;
		let status = response.status();
		if !status.is_success() {
			let mut message = response.text().await.unwrap_or_default();
			if message.len() > MAX_ERROR_BODY {
				let mut end = MAX_ERROR_BODY;
				while !message.is_char_boundary(end) {
					end -= 1;
				}
				message.truncate(end);
			}
			return Err(SearchError::Server {
				status: status.as_u16(),
				message,
			});
		}

		let body = response
			.bytes()
			.await
			.map_err(|err| SearchError::Network(err.to_string()))?;
		serde_json::from_slice(&body).map_err(|err| SearchError::Decode(err.to_string()))
	}
}

impl<C: CredentialProvider> SearchBackend for HttpBackend<C> {
	fn search(
		&self,
		request: &SearchRequest,
	) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send {
		self.post(request)
	}
}

#[cfg(test)]
mod tests {
	use docket_query::{Compiler, FieldRegistry, FilterSet, FilterValue, QueryParams, QueryType};

	use super::*;

	fn request_with(key: &str, value: FilterValue) -> SearchRequest {
		let registry = FieldRegistry::default();
		let mut filters = FilterSet::new();
		filters.apply(&registry, key, value).unwrap();
		Compiler::default()
			.compile(&QueryParams::default().with_filters(filters))
			.unwrap()
	}

	#[test]
	fn urls_are_joined_without_double_slashes() {
		assert_eq!(join_url("http://host/", "/api/x"), "http://host/api/x");
		assert_eq!(join_url("http://host", "api/x"), "http://host/api/x");
	}

	#[test]
	fn content_filters_route_to_the_content_endpoint() {
		let config = BackendConfig::new("http://docs.local");
		let plain = request_with(
			"filename",
			FilterValue::text(QueryType::Like, "report").unwrap(),
		);
		let content = request_with(
			"content",
			FilterValue::text(QueryType::Contains, "invoice").unwrap(),
		);
		assert_eq!(config.endpoint(&plain), "http://docs.local/api/documents/search");
		assert_eq!(
			config.endpoint(&content),
			"http://docs.local/api/documents/content-search"
		);
	}
}
