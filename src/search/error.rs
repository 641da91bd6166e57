use docket_query::{CompileError, ValidationError};
use thiserror::Error;

/// Failure of one search request.
///
/// Superseded requests are never reported through this type; they are
/// dropped by generation instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
	#[error("network error: {0}")]
	Network(String),
	#[error("backend returned {status}: {message}")]
	Server { status: u16, message: String },
	#[error("failed to decode search response: {0}")]
	Decode(String),
	#[error(transparent)]
	Compile(#[from] CompileError),
}

impl SearchError {
	/// Whether retrying the same request may succeed.
	#[must_use]
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Network(_) => true,
			Self::Server { status, .. } => *status >= 500 || *status == 408 || *status == 429,
			Self::Decode(_) | Self::Compile(_) => false,
		}
	}
}

impl From<ValidationError> for SearchError {
	fn from(err: ValidationError) -> Self {
		Self::Compile(CompileError::Validation(err))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn server(status: u16) -> SearchError {
		SearchError::Server {
			status,
			message: String::new(),
		}
	}

	#[test]
	fn transient_classification() {
		assert!(SearchError::Network("reset".into()).is_transient());
		assert!(server(503).is_transient());
		assert!(server(429).is_transient());
		assert!(server(408).is_transient());
		assert!(!server(400).is_transient());
		assert!(!server(401).is_transient());
		assert!(!SearchError::Decode("eof".into()).is_transient());
		assert!(!SearchError::Compile(CompileError::ZeroCount).is_transient());
	}
}
