use std::fmt;

use docket_query::SearchPage;

use super::SearchError;

/// Lifecycle of the current request generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
	/// Nothing has been executed yet.
	#[default]
	Idle,
	Pending,
	Success,
	Error,
	/// Left by [`SearchController::cancel`](super::SearchController::cancel)
	/// on a fetch that had nothing to show yet. Requests superseded by new
	/// parameters move straight to the next `Pending` instead.
	Aborted,
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let label = match self {
			Self::Idle => "idle",
			Self::Pending => "pending",
			Self::Success => "success",
			Self::Error => "error",
			Self::Aborted => "aborted",
		};
		f.write_str(label)
	}
}

/// What a front end renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchView {
	pub status: Status,
	/// The page for the current parameters, possibly stale while revalidating.
	pub data: Option<SearchPage>,
	/// The last error of the current generation.
	pub error: Option<SearchError>,
	pub generation: u64,
	/// A revalidating fetch runs behind `data`.
	pub is_refetching: bool,
}

impl SearchView {
	pub fn is_loading(&self) -> bool {
		self.status == Status::Pending || self.is_refetching
	}

	pub fn results(&self) -> &[docket_query::SearchResult] {
		self.data
			.as_ref()
			.map(|page| page.results.as_slice())
			.unwrap_or_default()
	}
}
