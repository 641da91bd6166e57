//! Field keys understood by the document backend and the comparison each one
//! uses.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const SOURCE_SYSTEM: &str = "sourceSystem";
pub const FILENAME: &str = "filename";
pub const CONTENT_TYPE: &str = "contentType";
pub const FILE_TYPE: &str = "fileType";
pub const CLIENT_ID: &str = "clientId";
pub const CREATED_AT: &str = "createdAt";
/// Free-text field routed to the content search endpoint.
pub const CONTENT: &str = "content";

/// Comparison semantics of a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
	/// Exact match against a single string.
	Matches,
	/// Substring match.
	Like,
	/// Membership in a set of strings.
	In,
	/// Inclusive date range with optional bounds.
	Range,
	/// Full-text search over document content.
	Contains,
}

impl QueryType {
	pub const ALL: [QueryType; 5] = [
		QueryType::Matches,
		QueryType::Like,
		QueryType::In,
		QueryType::Range,
		QueryType::Contains,
	];

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			QueryType::Matches => "matches",
			QueryType::Like => "like",
			QueryType::In => "in",
			QueryType::Range => "range",
			QueryType::Contains => "contains",
		}
	}

	/// Whether the type carries a single free-form string.
	#[must_use]
	pub fn is_textual(self) -> bool {
		matches!(
			self,
			QueryType::Matches | QueryType::Like | QueryType::Contains
		)
	}
}

impl fmt::Display for QueryType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for QueryType {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		let normalized = value.trim().to_ascii_lowercase();
		QueryType::ALL
			.into_iter()
			.find(|kind| kind.as_str() == normalized)
			.ok_or_else(|| format!("unknown query type '{}'", value.trim()))
	}
}

/// Registry assigning exactly one [`QueryType`] to every known field key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
	fields: IndexMap<String, QueryType>,
}

impl FieldRegistry {
	/// Create a registry without any fields.
	#[must_use]
	pub fn empty() -> Self {
		Self {
			fields: IndexMap::new(),
		}
	}

	/// Register `key`, replacing any type it previously had.
	pub fn register(&mut self, key: impl Into<String>, query_type: QueryType) -> &mut Self {
		self.fields.insert(key.into(), query_type);
		self
	}

	#[must_use]
	pub fn with(mut self, key: impl Into<String>, query_type: QueryType) -> Self {
		self.register(key, query_type);
		self
	}

	/// Return the type registered for `key`.
	#[must_use]
	pub fn query_type(&self, key: &str) -> Option<QueryType> {
		self.fields.get(key).copied()
	}

	/// Like [`Self::query_type`] but reports unknown keys as a validation error.
	pub fn expect(&self, key: &str) -> Result<QueryType, ValidationError> {
		self.query_type(key)
			.ok_or_else(|| ValidationError::UnknownField {
				key: key.to_string(),
			})
	}

	pub fn contains(&self, key: &str) -> bool {
		self.fields.contains_key(key)
	}

	/// Iterate over the registered fields in registration order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, QueryType)> {
		self.fields.iter().map(|(key, kind)| (key.as_str(), *kind))
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

impl Default for FieldRegistry {
	fn default() -> Self {
		Self::empty()
			.with(SOURCE_SYSTEM, QueryType::Matches)
			.with(FILENAME, QueryType::Like)
			.with(CONTENT_TYPE, QueryType::In)
			.with(FILE_TYPE, QueryType::In)
			.with(CLIENT_ID, QueryType::Matches)
			.with(CREATED_AT, QueryType::Range)
			.with(CONTENT, QueryType::Contains)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_registry_knows_backend_fields() {
		let registry = FieldRegistry::default();
		assert_eq!(registry.query_type(SOURCE_SYSTEM), Some(QueryType::Matches));
		assert_eq!(registry.query_type(CONTENT_TYPE), Some(QueryType::In));
		assert_eq!(registry.query_type(CREATED_AT), Some(QueryType::Range));
		assert_eq!(registry.query_type(CONTENT), Some(QueryType::Contains));
		assert_eq!(registry.len(), 7);
	}

	#[test]
	fn registering_again_overrides_the_type() {
		let mut registry = FieldRegistry::default();
		registry.register(CLIENT_ID, QueryType::Like);
		assert_eq!(registry.query_type(CLIENT_ID), Some(QueryType::Like));
		assert_eq!(registry.len(), 7);
	}

	#[test]
	fn unknown_fields_are_reported() {
		let registry = FieldRegistry::default();
		assert_eq!(
			registry.expect("owner"),
			Err(ValidationError::UnknownField {
				key: "owner".into()
			})
		);
	}

	#[test]
	fn query_type_parses_case_insensitively() {
		assert_eq!("LIKE".parse::<QueryType>(), Ok(QueryType::Like));
		assert_eq!(" range ".parse::<QueryType>(), Ok(QueryType::Range));
		assert!("between".parse::<QueryType>().is_err());
	}
}
