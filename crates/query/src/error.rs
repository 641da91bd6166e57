use thiserror::Error;

use crate::field::QueryType;

/// Reasons a filter is refused before it can reach the compiler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
	/// The key has no entry in the [`FieldRegistry`](crate::FieldRegistry).
	#[error("unknown filter field '{key}'")]
	UnknownField { key: String },

	/// The value shape disagrees with the type registered for the field.
	#[error("field '{key}' is registered as {expected} but received a {actual} value")]
	TypeMismatch {
		key: String,
		expected: QueryType,
		actual: QueryType,
	},

	/// A range bound could not be read as an ISO date or timestamp.
	#[error("field '{key}' has an invalid date '{value}'")]
	InvalidDate { key: String, value: String },

	/// A range whose lower bound lies after its upper bound.
	#[error("field '{key}' has a range starting at {from} after it ends at {to}")]
	InvertedRange { key: String, from: String, to: String },

	/// A raw value that cannot be interpreted for the field's type.
	#[error("field '{key}' cannot accept {reason}")]
	InvalidValue { key: String, reason: String },
}

/// Failures raised while turning filter state into a request payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// A required facet was absent while the policy forbids silent defaults.
	#[error("required facet '{key}' is not set")]
	MissingDefaultFacet { key: String },

	#[error("page size must be greater than zero")]
	ZeroCount,
}

impl ValidationError {
	pub(crate) fn invalid_value(key: &str, reason: impl Into<String>) -> Self {
		Self::InvalidValue {
			key: key.to_string(),
			reason: reason.into(),
		}
	}
}
