//! Canonical filter representation and the rules for editing a filter set.
//!
//! A [`FilterSet`] holds at most one value per field key. Keys keep the
//! position at which they were first applied, so two sets built through the
//! same sequence of edits always serialize to the same request.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::field::{FieldRegistry, QueryType};

/// Optional lower and upper bounds of a date filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub from: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub to: Option<String>,
}

impl DateRange {
	#[must_use]
	pub fn new(from: Option<impl Into<String>>, to: Option<impl Into<String>>) -> Self {
		Self {
			from: from.map(Into::into),
			to: to.map(Into::into),
		}
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.from.is_none() && self.to.is_none()
	}

	fn normalized(self) -> Self {
		Self {
			from: normalize_text(self.from),
			to: normalize_text(self.to),
		}
	}
}

/// Which side of a [`DateRange`] an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
	From,
	To,
}

/// Value of a filter, tagged by its comparison semantics.
///
/// Serializes adjacently tagged, so a [`Filter`] flattens into
/// `{"key": .., "type": .., "value": ..}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum FilterValue {
	Matches(String),
	Like(String),
	In(BTreeSet<String>),
	Range(DateRange),
	Contains(String),
}

impl FilterValue {
	#[must_use]
	pub fn query_type(&self) -> QueryType {
		match self {
			FilterValue::Matches(_) => QueryType::Matches,
			FilterValue::Like(_) => QueryType::Like,
			FilterValue::In(_) => QueryType::In,
			FilterValue::Range(_) => QueryType::Range,
			FilterValue::Contains(_) => QueryType::Contains,
		}
	}

	/// Build a set-membership value from any collection of strings.
	pub fn members<I, S>(values: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		FilterValue::In(values.into_iter().map(Into::into).collect())
	}

	/// Build a textual value of the given type.
	///
	/// Returns `None` when `query_type` does not carry a single string.
	#[must_use]
	pub fn text(query_type: QueryType, value: impl Into<String>) -> Option<Self> {
		let value = value.into();
		match query_type {
			QueryType::Matches => Some(FilterValue::Matches(value)),
			QueryType::Like => Some(FilterValue::Like(value)),
			QueryType::Contains => Some(FilterValue::Contains(value)),
			QueryType::In | QueryType::Range => None,
		}
	}

	/// An empty value is never stored; applying one removes the filter.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		match self {
			FilterValue::Matches(text) | FilterValue::Like(text) | FilterValue::Contains(text) => {
				text.trim().is_empty()
			}
			FilterValue::In(values) => values.iter().all(|value| value.trim().is_empty()),
			FilterValue::Range(range) => range.clone().normalized().is_empty(),
		}
	}

	/// Trim surrounding whitespace and drop blank set members or bounds.
	#[must_use]
	pub fn normalized(self) -> Self {
		match self {
			FilterValue::Matches(text) => FilterValue::Matches(text.trim().to_string()),
			FilterValue::Like(text) => FilterValue::Like(text.trim().to_string()),
			FilterValue::Contains(text) => FilterValue::Contains(text.trim().to_string()),
			FilterValue::In(values) => FilterValue::In(
				values
					.into_iter()
					.map(|value| value.trim().to_string())
					.filter(|value| !value.is_empty())
					.collect(),
			),
			FilterValue::Range(range) => FilterValue::Range(range.normalized()),
		}
	}

	/// Parse command-line syntax for a field of type `query_type`.
	///
	/// Sets are comma separated. Ranges use `FROM..TO` where either side may
	/// be omitted; a bare date selects that single day.
	pub fn parse(key: &str, query_type: QueryType, raw: &str) -> Result<Self, ValidationError> {
		let value = match query_type {
			QueryType::Matches | QueryType::Like | QueryType::Contains => {
				FilterValue::text(query_type, raw).ok_or_else(|| {
					ValidationError::invalid_value(key, "a textual value")
				})?
			}
			QueryType::In => FilterValue::members(raw.split(',')),
			QueryType::Range => {
				let range = match raw.split_once("..") {
					Some((from, to)) => DateRange::new(Some(from), Some(to)),
					None => DateRange::new(Some(raw), Some(raw)),
				};
				FilterValue::Range(range)
			}
		};
		let value = value.normalized();
		validate_value(key, &value)?;
		Ok(value)
	}

	/// Render the value as it appears in a query object.
	#[must_use]
	pub fn to_json(&self) -> Value {
		match self {
			FilterValue::Matches(text) | FilterValue::Like(text) | FilterValue::Contains(text) => {
				Value::String(text.clone())
			}
			FilterValue::In(values) => {
				Value::Array(values.iter().cloned().map(Value::String).collect())
			}
			FilterValue::Range(range) => {
				let mut object = Map::new();
				if let Some(from) = &range.from {
					object.insert("from".into(), Value::String(from.clone()));
				}
				if let Some(to) = &range.to {
					object.insert("to".into(), Value::String(to.clone()));
				}
				Value::Object(object)
			}
		}
	}

	/// Interpret a query object entry according to the field's registered type.
	pub fn from_json(key: &str, query_type: QueryType, value: &Value) -> Result<Self, ValidationError> {
		let parsed = match (query_type, value) {
			(_, Value::Null) => return Ok(empty_of(query_type)),
			(kind, Value::String(text)) if kind.is_textual() => {
				FilterValue::text(kind, text.as_str())
					.ok_or_else(|| ValidationError::invalid_value(key, "a textual value"))?
			}
			(QueryType::In, Value::Array(items)) => {
				let mut members = BTreeSet::new();
				for item in items {
					let Value::String(text) = item else {
						return Err(ValidationError::invalid_value(
							key,
							"a set containing non-string members",
						));
					};
					members.insert(text.clone());
				}
				FilterValue::In(members)
			}
			(QueryType::Range, Value::Object(object)) => {
				let bound = |name: &str| -> Result<Option<String>, ValidationError> {
					match object.get(name) {
						None | Some(Value::Null) => Ok(None),
						Some(Value::String(text)) => Ok(Some(text.clone())),
						Some(_) => Err(ValidationError::invalid_value(
							key,
							format!("a non-string '{name}' bound"),
						)),
					}
				};
				FilterValue::Range(DateRange {
					from: bound("from")?,
					to: bound("to")?,
				})
			}
			(kind, other) => {
				return Err(ValidationError::invalid_value(
					key,
					format!("{} for a {kind} field", describe_json(other)),
				));
			}
		};
		Ok(parsed.normalized())
	}
}

fn empty_of(query_type: QueryType) -> FilterValue {
	match query_type {
		QueryType::Matches => FilterValue::Matches(String::new()),
		QueryType::Like => FilterValue::Like(String::new()),
		QueryType::Contains => FilterValue::Contains(String::new()),
		QueryType::In => FilterValue::In(BTreeSet::new()),
		QueryType::Range => FilterValue::Range(DateRange::default()),
	}
}

fn describe_json(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

fn normalize_text(value: Option<String>) -> Option<String> {
	value
		.map(|text| text.trim().to_string())
		.filter(|text| !text.is_empty())
}

/// Parse an ISO date or RFC 3339 timestamp into a comparable instant.
///
/// A bare date covers the whole day, so it resolves to the start of the day
/// as a lower bound and to its last second as an upper bound.
fn parse_instant(key: &str, value: &str, bound: RangeBound) -> Result<NaiveDateTime, ValidationError> {
	if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
		let instant = match bound {
			RangeBound::From => date.and_hms_opt(0, 0, 0),
			RangeBound::To => date.and_hms_opt(23, 59, 59),
		};
		return Ok(instant.unwrap_or_default());
	}
	DateTime::parse_from_rfc3339(value)
		.map(|stamp| stamp.naive_utc())
		.map_err(|_| ValidationError::InvalidDate {
			key: key.to_string(),
			value: value.to_string(),
		})
}

/// Check the parts of a value that do not depend on the registry.
pub(crate) fn validate_value(key: &str, value: &FilterValue) -> Result<(), ValidationError> {
	let FilterValue::Range(range) = value else {
		return Ok(());
	};
	let from = range
		.from
		.as_deref()
		.map(|text| parse_instant(key, text, RangeBound::From))
		.transpose()?;
	let to = range
		.to
		.as_deref()
		.map(|text| parse_instant(key, text, RangeBound::To))
		.transpose()?;
	if let (Some(start), Some(end)) = (from, to)
		&& start > end
	{
		return Err(ValidationError::InvertedRange {
			key: key.to_string(),
			from: range.from.clone().unwrap_or_default(),
			to: range.to.clone().unwrap_or_default(),
		});
	}
	Ok(())
}

/// Validate `value` against the type registered for `key`.
pub fn validate(registry: &FieldRegistry, key: &str, value: &FilterValue) -> Result<(), ValidationError> {
	let expected = registry.expect(key)?;
	let actual = value.query_type();
	if expected != actual {
		return Err(ValidationError::TypeMismatch {
			key: key.to_string(),
			expected,
			actual,
		});
	}
	validate_value(key, value)
}

/// One named, typed search constraint as sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
	pub key: String,
	#[serde(flatten)]
	pub value: FilterValue,
}

impl Filter {
	#[must_use]
	pub fn new(key: impl Into<String>, value: FilterValue) -> Self {
		Self {
			key: key.into(),
			value,
		}
	}

	#[must_use]
	pub fn query_type(&self) -> QueryType {
		self.value.query_type()
	}

	/// Parse a `KEY=VALUE` assignment using the type registered for `KEY`.
	pub fn parse_assignment(registry: &FieldRegistry, raw: &str) -> Result<Self, ValidationError> {
		let Some((key, value)) = raw.split_once('=') else {
			return Err(ValidationError::invalid_value(
				raw.trim(),
				"an assignment without '='",
			));
		};
		let key = key.trim();
		let query_type = registry.expect(key)?;
		let value = FilterValue::parse(key, query_type, value)?;
		Ok(Self::new(key, value))
	}
}

/// Ordered collection of active filters, at most one per key.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
	entries: IndexMap<String, FilterValue>,
}

impl PartialEq for FilterSet {
	fn eq(&self, other: &Self) -> bool {
		self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
	}
}

impl Eq for FilterSet {}

impl FilterSet {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a set from already-constructed filters, validating each one.
	pub fn from_filters<I>(registry: &FieldRegistry, filters: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = Filter>,
	{
		let mut set = Self::new();
		for filter in filters {
			set.apply(registry, &filter.key, filter.value)?;
		}
		Ok(set)
	}

	/// Replace, insert or remove the entry for `key`.
	///
	/// Applying an empty value removes the key. A replaced key keeps its
	/// original position. Returns whether the set changed.
	pub fn apply(
		&mut self,
		registry: &FieldRegistry,
		key: &str,
		value: FilterValue,
	) -> Result<bool, ValidationError> {
		let value = value.normalized();
		if value.is_empty() {
			registry.expect(key)?;
			return Ok(self.remove(key));
		}
		validate(registry, key, &value)?;
		if self.entries.get(key) == Some(&value) {
			return Ok(false);
		}
		self.entries.insert(key.to_string(), value);
		Ok(true)
	}

	/// Remove the entry for `key`, returning whether one existed.
	pub fn remove(&mut self, key: &str) -> bool {
		self.entries.shift_remove(key).is_some()
	}

	/// Flip membership of `member` inside the set filter for `key`.
	///
	/// Removing the last member removes the filter altogether.
	pub fn toggle(
		&mut self,
		registry: &FieldRegistry,
		key: &str,
		member: &str,
	) -> Result<bool, ValidationError> {
		let expected = registry.expect(key)?;
		if expected != QueryType::In {
			return Err(ValidationError::TypeMismatch {
				key: key.to_string(),
				expected,
				actual: QueryType::In,
			});
		}
		let mut members = match self.entries.get(key) {
			Some(FilterValue::In(members)) => members.clone(),
			_ => BTreeSet::new(),
		};
		let member = member.trim().to_string();
		if !members.remove(&member) {
			members.insert(member);
		}
		self.apply(registry, key, FilterValue::In(members))
	}

	/// Edit one side of the range filter for `key`, keeping the other side.
	pub fn set_range_bound(
		&mut self,
		registry: &FieldRegistry,
		key: &str,
		bound: RangeBound,
		date: Option<String>,
	) -> Result<bool, ValidationError> {
		let mut range = match self.entries.get(key) {
			Some(FilterValue::Range(range)) => range.clone(),
			_ => DateRange::default(),
		};
		match bound {
			RangeBound::From => range.from = date,
			RangeBound::To => range.to = date,
		}
		self.apply(registry, key, FilterValue::Range(range))
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&FilterValue> {
		self.entries.get(key)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterate over the entries in first-applied order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
		self.entries.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Materialize the entries as wire filters in first-applied order.
	#[must_use]
	pub fn to_filters(&self) -> Vec<Filter> {
		self.entries
			.iter()
			.map(|(key, value)| Filter::new(key.clone(), value.clone()))
			.collect()
	}

	/// Flatten the set into a `key -> value` record.
	#[must_use]
	pub fn to_query_object(&self) -> IndexMap<String, Value> {
		self.entries
			.iter()
			.map(|(key, value)| (key.clone(), value.to_json()))
			.collect()
	}

	/// Rebuild a set from a `key -> value` record, typing each entry through
	/// the registry. Empty entries are skipped.
	pub fn from_query_object(
		object: &IndexMap<String, Value>,
		registry: &FieldRegistry,
	) -> Result<Self, ValidationError> {
		let mut set = Self::new();
		for (key, raw) in object {
			let query_type = registry.expect(key)?;
			let value = FilterValue::from_json(key, query_type, raw)?;
			set.apply(registry, key, value)?;
		}
		Ok(set)
	}
}
