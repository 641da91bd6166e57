//! Response payloads returned by the document backend.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::compile::SearchRequest;
use crate::pagination::Pagination;

/// Pagination block as reported by the backend. Only the total is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationPayload {
	#[serde(default)]
	pub total: u64,
}

/// Raw body of a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	#[serde(default)]
	pub pagination: PaginationPayload,
	#[serde(default)]
	pub results: Vec<SearchResult>,
}

/// A document hit. Display fields are optional; anything else the backend
/// sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	#[serde(deserialize_with = "string_or_number")]
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filename: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file_type: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_system: Option<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl SearchResult {
	#[must_use]
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			filename: None,
			content_type: None,
			created_at: None,
			file_type: None,
			client_id: None,
			source_system: None,
			extra: Map::new(),
		}
	}

	#[must_use]
	pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
		self.filename = Some(filename.into());
		self
	}

	#[must_use]
	pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
		self.content_type = Some(content_type.into());
		self
	}

	#[must_use]
	pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
		self.created_at = Some(created_at.into());
		self
	}

	/// Label shown for the document, falling back to its id.
	#[must_use]
	pub fn display_name(&self) -> &str {
		self.filename.as_deref().unwrap_or(&self.id)
	}
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	match Value::deserialize(deserializer)? {
		Value::String(text) => Ok(text),
		Value::Number(number) => Ok(number.to_string()),
		other => Err(de::Error::custom(format!(
			"expected a string or number id, found {other}"
		))),
	}
}

/// One page of results with pagination derived from the request window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
	pub pagination: Pagination,
	pub results: Vec<SearchResult>,
}

impl SearchPage {
	/// Combine a backend response with the request that produced it.
	#[must_use]
	pub fn from_response(response: SearchResponse, request: &SearchRequest) -> Self {
		Self {
			pagination: Pagination::derive(response.pagination.total, request.count, request.offset),
			results: response.results,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}
}
