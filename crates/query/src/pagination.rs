use serde::{Deserialize, Serialize};

/// Page bookkeeping derived from a response total and the request window.
///
/// Never mutated in place: every response produces a fresh value through
/// [`Pagination::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
	pub total: u64,
	pub page_size: u64,
	pub current_offset: u64,
	pub next_offset: Option<u64>,
	pub previous_offset: Option<u64>,
	pub has_more: bool,
	pub total_pages: u64,
	pub current_page: u64,
}

impl Pagination {
	/// Derive the full pagination record.
	///
	/// A zero `page_size` is treated as one so the arithmetic stays defined;
	/// the compiler refuses such requests before they are sent.
	#[must_use]
	pub fn derive(total: u64, page_size: u64, current_offset: u64) -> Self {
		let page_size = page_size.max(1);
		let has_more = current_offset.saturating_add(page_size) < total;
		let next_offset = has_more.then(|| current_offset + page_size);
		let previous_offset = (current_offset > 0).then(|| current_offset.saturating_sub(page_size));

		Self {
			total,
			page_size,
			current_offset,
			next_offset,
			previous_offset,
			has_more,
			total_pages: total.div_ceil(page_size),
			current_page: current_offset / page_size + 1,
		}
	}

	/// Number of results the page can hold past `current_offset`.
	#[must_use]
	pub fn remaining(&self) -> u64 {
		self.total.saturating_sub(self.current_offset)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_page_of_many() {
		let page = Pagination::derive(152, 10, 0);
		assert!(page.has_more);
		assert_eq!(page.next_offset, Some(10));
		assert_eq!(page.previous_offset, None);
		assert_eq!(page.current_page, 1);
		assert_eq!(page.total_pages, 16);
	}

	#[test]
	fn last_partial_page() {
		let page = Pagination::derive(152, 10, 150);
		assert!(!page.has_more);
		assert_eq!(page.next_offset, None);
		assert_eq!(page.previous_offset, Some(140));
		assert_eq!(page.current_page, 16);
		assert_eq!(page.remaining(), 2);
	}

	#[test]
	fn unaligned_offset_clamps_previous_to_zero() {
		let page = Pagination::derive(50, 20, 5);
		assert_eq!(page.previous_offset, Some(0));
		assert_eq!(page.next_offset, Some(25));
		assert_eq!(page.current_page, 1);
	}

	#[test]
	fn empty_result_set() {
		let page = Pagination::derive(0, 20, 0);
		assert!(!page.has_more);
		assert_eq!(page.total_pages, 0);
		assert_eq!(page.current_page, 1);
		assert_eq!(page.next_offset, None);
	}

	#[test]
	fn next_offset_tracks_has_more_across_totals() {
		for total in [0u64, 1, 9, 10, 11, 99, 100, 101] {
			for offset in (0..=total + 10).step_by(5) {
				let page = Pagination::derive(total, 10, offset);
				assert_eq!(page.next_offset.is_some(), page.has_more);
				if let Some(next) = page.next_offset {
					assert_eq!(next, offset + 10);
				}
				assert_eq!(page.current_page, offset / 10 + 1);
			}
		}
	}
}
