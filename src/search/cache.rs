//! Response cache keyed by serialized request.

use std::collections::HashMap;
use std::time::Duration;

use docket_query::SearchPage;
use tokio::time::Instant;

/// How a cached page may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
	/// Within the staleness window; serve without a network call.
	Fresh,
	/// Displayable while a revalidating fetch runs.
	Stale,
}

#[derive(Debug, Clone)]
struct CacheEntry {
	page: SearchPage,
	fetched_at: Instant,
	last_used: Instant,
}

/// Pages indexed by [`SearchRequest::cache_key`](docket_query::SearchRequest::cache_key).
///
/// Writes are last-write-wins per key. Entries untouched for `gc_time` are
/// evicted by [`QueryCache::collect_garbage`].
#[derive(Debug, Clone)]
pub struct QueryCache {
	entries: HashMap<String, CacheEntry>,
	stale_time: Duration,
	gc_time: Duration,
}

impl QueryCache {
	#[must_use]
	pub fn new(stale_time: Duration, gc_time: Duration) -> Self {
		Self {
			entries: HashMap::new(),
			stale_time,
			gc_time,
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	/// Fetch a page for display, refreshing its GC clock.
	pub fn lookup(&mut self, key: &str, now: Instant) -> Option<(SearchPage, Freshness)> {
		let stale_time = self.stale_time;
		let entry = self.entries.get_mut(key)?;
		entry.last_used = now;
		let freshness = if now.saturating_duration_since(entry.fetched_at) < stale_time {
			Freshness::Fresh
		} else {
			Freshness::Stale
		};
		Some((entry.page.clone(), freshness))
	}

	pub fn is_fresh(&self, key: &str, now: Instant) -> bool {
		self.entries
			.get(key)
			.is_some_and(|entry| now.saturating_duration_since(entry.fetched_at) < self.stale_time)
	}

	pub fn insert(&mut self, key: String, page: SearchPage, now: Instant) {
		self.entries.insert(
			key,
			CacheEntry {
				page,
				fetched_at: now,
				last_used: now,
			},
		);
	}

	pub fn remove(&mut self, key: &str) -> bool {
		self.entries.remove(key).is_some()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Evict entries unused for `gc_time`, never touching `keep`.
	pub fn collect_garbage(&mut self, now: Instant, keep: Option<&str>) -> usize {
		let gc_time = self.gc_time;
		let before = self.entries.len();
		self.entries.retain(|key, entry| {
			Some(key.as_str()) == keep || now.saturating_duration_since(entry.last_used) < gc_time
		});
		before - self.entries.len()
	}
}

#[cfg(test)]
mod tests {
	use docket_query::Pagination;

	use super::*;

	fn page(total: u64) -> SearchPage {
		SearchPage {
			pagination: Pagination::derive(total, 20, 0),
			results: Vec::new(),
		}
	}

	fn cache() -> QueryCache {
		QueryCache::new(Duration::from_secs(30), Duration::from_secs(300))
	}

	#[test]
	fn entries_go_stale_after_the_window() {
		let start = Instant::now();
		let mut cache = cache();
		cache.insert("a".into(), page(3), start);

		let (hit, freshness) = cache.lookup("a", start + Duration::from_secs(29)).unwrap();
		assert_eq!(hit.pagination.total, 3);
		assert_eq!(freshness, Freshness::Fresh);
		assert!(cache.is_fresh("a", start + Duration::from_secs(29)));

		let (_, freshness) = cache.lookup("a", start + Duration::from_secs(30)).unwrap();
		assert_eq!(freshness, Freshness::Stale);
		assert!(!cache.is_fresh("a", start + Duration::from_secs(30)));
		assert!(cache.lookup("missing", start).is_none());
	}

	#[test]
	fn last_write_wins() {
		let start = Instant::now();
		let mut cache = cache();
		cache.insert("a".into(), page(1), start);
		cache.insert("a".into(), page(2), start + Duration::from_secs(1));
		assert_eq!(cache.len(), 1);
		assert_eq!(cache.lookup("a", start).unwrap().0.pagination.total, 2);
	}

	#[test]
	fn garbage_collection_spares_used_and_kept_entries() {
		let start = Instant::now();
		let mut cache = cache();
		cache.insert("old".into(), page(1), start);
		cache.insert("shown".into(), page(2), start);
		cache.insert("recent".into(), page(3), start);
		cache.lookup("recent", start + Duration::from_secs(200));

		let evicted = cache.collect_garbage(start + Duration::from_secs(301), Some("shown"));
		assert_eq!(evicted, 1);
		assert!(!cache.contains("old"));
		assert!(cache.contains("shown"));
		assert!(cache.contains("recent"));
	}
}
