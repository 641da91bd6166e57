//! Compilation of filter state into the exact request payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::field::{CONTENT, FieldRegistry, SOURCE_SYSTEM};
use crate::filter::{Filter, FilterSet, FilterValue, validate};

/// Fallback partition used when the user has not chosen a source system.
pub const DEFAULT_SOURCE_SYSTEM: &str = "genius";
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// User-facing search parameters before defaults are injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
	pub filters: FilterSet,
	pub offset: u64,
	pub count: u64,
	pub projection: Vec<String>,
}

impl Default for QueryParams {
	fn default() -> Self {
		Self {
			filters: FilterSet::new(),
			offset: 0,
			count: DEFAULT_PAGE_SIZE,
			projection: Vec::new(),
		}
	}
}

impl QueryParams {
	#[must_use]
	pub fn new(count: u64) -> Self {
		Self {
			count,
			..Self::default()
		}
	}

	/// Replace the filters. Any change restarts pagination at offset zero.
	#[must_use]
	pub fn with_filters(mut self, filters: FilterSet) -> Self {
		if filters != self.filters {
			self.offset = 0;
		}
		self.filters = filters;
		self
	}

	/// Move to another offset while keeping every filter untouched.
	#[must_use]
	pub fn with_offset(mut self, offset: u64) -> Self {
		self.offset = offset;
		self
	}

	#[must_use]
	pub fn with_projection<I, S>(mut self, projection: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.projection = projection.into_iter().map(Into::into).collect();
		self
	}
}

/// What the compiler does when a required facet is missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefaultFacetPolicy {
	/// Append the configured fallback value.
	#[default]
	Inject,
	/// Refuse to compile until the user picks a value.
	Reject,
}

impl FromStr for DefaultFacetPolicy {
	type Err = String;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		match value.trim().to_ascii_lowercase().as_str() {
			"inject" => Ok(Self::Inject),
			"reject" => Ok(Self::Reject),
			other => Err(format!("unknown default facet policy '{other}'")),
		}
	}
}

impl fmt::Display for DefaultFacetPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Inject => f.write_str("inject"),
			Self::Reject => f.write_str("reject"),
		}
	}
}

/// A facet that must be present in every compiled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredDefault {
	pub key: String,
	pub value: FilterValue,
}

impl RequiredDefault {
	#[must_use]
	pub fn new(key: impl Into<String>, value: FilterValue) -> Self {
		Self {
			key: key.into(),
			value,
		}
	}
}

/// Payload posted to the document backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchRequest {
	pub query: Vec<Filter>,
	pub count: u64,
	pub offset: u64,
	pub projection: Vec<String>,
}

impl SearchRequest {
	/// Deterministic key identifying this exact parameter set.
	#[must_use]
	pub fn cache_key(&self) -> String {
		// Every field serializes with string keys, so this cannot fail in practice.
		serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
	}

	/// The same request moved to another offset.
	#[must_use]
	pub fn at_offset(&self, offset: u64) -> Self {
		Self {
			offset,
			..self.clone()
		}
	}

	/// Whether the request carries a free-text content constraint.
	#[must_use]
	pub fn uses_content_search(&self) -> bool {
		self.query.iter().any(|filter| filter.key == CONTENT)
	}

	#[must_use]
	pub fn filter(&self, key: &str) -> Option<&Filter> {
		self.query.iter().find(|filter| filter.key == key)
	}
}

/// Turns [`QueryParams`] into a validated [`SearchRequest`].
#[derive(Debug, Clone)]
pub struct Compiler {
	registry: FieldRegistry,
	defaults: Vec<RequiredDefault>,
	policy: DefaultFacetPolicy,
}

impl Default for Compiler {
	fn default() -> Self {
		Self::new(FieldRegistry::default()).with_default(
			SOURCE_SYSTEM,
			FilterValue::Matches(DEFAULT_SOURCE_SYSTEM.to_string()),
		)
	}
}

impl Compiler {
	/// Create a compiler without required defaults.
	#[must_use]
	pub fn new(registry: FieldRegistry) -> Self {
		Self {
			registry,
			defaults: Vec::new(),
			policy: DefaultFacetPolicy::Inject,
		}
	}

	#[must_use]
	pub fn with_default(mut self, key: impl Into<String>, value: FilterValue) -> Self {
		let key = key.into();
		self.defaults.retain(|existing| existing.key != key);
		self.defaults.push(RequiredDefault::new(key, value));
		self
	}

	#[must_use]
	pub fn with_policy(mut self, policy: DefaultFacetPolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn registry(&self) -> &FieldRegistry {
		&self.registry
	}

	pub fn defaults(&self) -> &[RequiredDefault] {
		&self.defaults
	}

	pub fn policy(&self) -> DefaultFacetPolicy {
		self.policy
	}

	/// Compile `params` into a request payload.
	///
	/// Filters keep their first-applied order; missing required facets are
	/// appended after them in declaration order.
	pub fn compile(&self, params: &QueryParams) -> Result<SearchRequest, CompileError> {
		if params.count == 0 {
			return Err(CompileError::ZeroCount);
		}

		let mut query = Vec::with_capacity(params.filters.len() + self.defaults.len());
		for (key, value) in params.filters.iter() {
			validate(&self.registry, key, value)?;
			query.push(Filter::new(key, value.clone()));
		}

		for default in &self.defaults {
			if params.filters.contains_key(&default.key) {
				continue;
			}
			match self.policy {
				DefaultFacetPolicy::Inject => {
					validate(&self.registry, &default.key, &default.value)?;
					query.push(Filter::new(default.key.clone(), default.value.clone()));
				}
				DefaultFacetPolicy::Reject => {
					return Err(CompileError::MissingDefaultFacet {
						key: default.key.clone(),
					});
				}
			}
		}

		Ok(SearchRequest {
			query,
			count: params.count,
			offset: params.offset,
			projection: params.projection.clone(),
		})
	}
}
