//! Generation-tagged search execution with caching and prefetch.
//!
//! The controller lives on the UI thread. Network calls run as tokio tasks on
//! the supplied runtime handle and report back over an unbounded channel that
//! [`SearchController::pump`] drains, so every state change happens on the
//! owning thread and results are applied by generation rather than by
//! completion order.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use docket_query::{
	Compiler, CompileError, FilterSet, FilterValue, QueryParams, QueryType, SearchPage,
	SearchRequest, SearchResponse, ValidationError,
};
use indexmap::IndexMap;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::cache::{Freshness, QueryCache};
use super::debounce::Debouncer;
use super::retry::{RetryPolicy, search_with_retry};
use super::view::{SearchView, Status};
use super::{SearchBackend, SearchError};

/// Tunables for [`SearchController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
	pub stale_time: Duration,
	pub gc_time: Duration,
	pub retry: RetryPolicy,
	pub debounce: Duration,
	/// Apply staged text filters automatically after `debounce`.
	pub auto_apply: bool,
}

impl Default for ControllerOptions {
	fn default() -> Self {
		Self {
			stale_time: Duration::from_secs(30),
			gc_time: Duration::from_secs(300),
			retry: RetryPolicy::default(),
			debounce: Duration::from_millis(500),
			auto_apply: true,
		}
	}
}

/// Partial change to the current [`QueryParams`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamsUpdate {
	pub filters: Option<FilterSet>,
	pub offset: Option<u64>,
	pub count: Option<u64>,
	pub projection: Option<Vec<String>>,
}

impl ParamsUpdate {
	#[must_use]
	pub fn filters(mut self, filters: FilterSet) -> Self {
		self.filters = Some(filters);
		self
	}

	#[must_use]
	pub fn offset(mut self, offset: u64) -> Self {
		self.offset = Some(offset);
		self
	}

	#[must_use]
	pub fn count(mut self, count: u64) -> Self {
		self.count = Some(count);
		self
	}

	#[must_use]
	pub fn projection(mut self, projection: Vec<String>) -> Self {
		self.projection = Some(projection);
		self
	}
}

/// Messages from spawned tasks back to the controller.
#[derive(Debug)]
pub(crate) enum FetchEvent {
	Primary {
		generation: u64,
		key: String,
		request: SearchRequest,
		result: Result<SearchResponse, SearchError>,
	},
	Prefetch {
		key: String,
		request: SearchRequest,
		result: Result<SearchResponse, SearchError>,
	},
	Debounced {
		key: String,
		seq: u64,
		value: String,
	},
}

struct InFlight {
	generation: u64,
	task: JoinHandle<()>,
}

/// Owns the search parameters, the response cache and the request lifecycle.
pub struct SearchController<B: SearchBackend> {
	backend: Arc<B>,
	compiler: Compiler,
	runtime: Handle,
	options: ControllerOptions,
	params: QueryParams,
	armed: bool,
	generation: u64,
	view: SearchView,
	displayed_key: Option<String>,
	cache: QueryCache,
	in_flight: Option<InFlight>,
	prefetches: HashMap<String, JoinHandle<()>>,
	staged: IndexMap<String, String>,
	debouncer: Debouncer,
	tx: UnboundedSender<FetchEvent>,
	rx: UnboundedReceiver<FetchEvent>,
}

impl<B: SearchBackend> SearchController<B> {
	pub fn new(
		backend: B,
		compiler: Compiler,
		params: QueryParams,
		options: ControllerOptions,
		runtime: Handle,
	) -> Self {
		let (tx, rx) = mpsc::unbounded_channel();
		Self {
			backend: Arc::new(backend),
			compiler,
			runtime,
			options,
			params,
			armed: false,
			generation: 0,
			view: SearchView::default(),
			displayed_key: None,
			cache: QueryCache::new(options.stale_time, options.gc_time),
			in_flight: None,
			prefetches: HashMap::new(),
			staged: IndexMap::new(),
			debouncer: Debouncer::new(options.debounce, tx.clone()),
			tx,
			rx,
		}
	}

	pub fn view(&self) -> &SearchView {
		&self.view
	}

	pub fn params(&self) -> &QueryParams {
		&self.params
	}

	pub fn compiler(&self) -> &Compiler {
		&self.compiler
	}

	pub fn options(&self) -> &ControllerOptions {
		&self.options
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_armed(&self) -> bool {
		self.armed
	}

	pub fn cache(&self) -> &QueryCache {
		&self.cache
	}

	/// Text waiting for [`SearchController::apply_staged`].
	pub fn staged(&self) -> impl Iterator<Item = (&str, &str)> {
		self.staged
			.iter()
			.map(|(key, value)| (key.as_str(), value.as_str()))
	}

	/// Whether any spawned task may still report back.
	pub fn is_busy(&self) -> bool {
		self.in_flight.is_some() || !self.prefetches.is_empty() || self.debouncer.has_pending()
	}

	/// Merge `update` into the parameters and start a new generation.
	///
	/// A filter change resets the offset and cancels outstanding prefetches.
	/// Once armed, the new parameters are fetched straight away.
	pub fn update_params(&mut self, update: ParamsUpdate) {
		let filters_changed = update
			.filters
			.as_ref()
			.is_some_and(|filters| *filters != self.params.filters);

		let mut params = self.params.clone();
		if let Some(count) = update.count {
			params.count = count;
		}
		if let Some(projection) = update.projection {
			params.projection = projection;
		}
		if let Some(offset) = update.offset {
			params = params.with_offset(offset);
		}
		if let Some(filters) = update.filters {
			params = params.with_filters(filters);
		}

		self.generation += 1;
		self.abort_primary();
		if filters_changed {
			self.abort_prefetches();
		}
		self.params = params;
		self.view.generation = self.generation;

		if self.armed {
			self.begin();
		}
	}

	/// Arm the controller and fetch the current parameters unless a fresh
	/// page is cached.
	pub fn execute_search(&mut self) {
		self.armed = true;
		self.generation += 1;
		self.abort_primary();
		self.begin();
	}

	/// Warm the cache with the page after the displayed one.
	///
	/// Returns whether a fetch was issued.
	pub fn prefetch_next_page(&mut self) -> bool {
		let Some(next_offset) = self
			.view
			.data
			.as_ref()
			.and_then(|page| page.pagination.next_offset)
		else {
			return false;
		};
		let params = self.params.clone().with_offset(next_offset);
		let Ok(request) = self.compiler.compile(&params) else {
			return false;
		};
		let key = request.cache_key();
		if self.cache.is_fresh(&key, Instant::now()) || self.prefetches.contains_key(&key) {
			return false;
		}

		tracing::debug!(offset = next_offset, "prefetching next page");
		let backend = Arc::clone(&self.backend);
		let tx = self.tx.clone();
		let retry = self.options.retry;
		let task_key = key.clone();
		let task = self.runtime.spawn(async move {
			let result = search_with_retry(backend.as_ref(), &request, retry).await;
			let _ = tx.send(FetchEvent::Prefetch {
				key: task_key,
				request,
				result,
			});
		});
		self.prefetches.insert(key, task);
		true
	}

	/// Show the next page, if any.
	pub fn next_page(&mut self) -> bool {
		match self.view.data.as_ref().and_then(|page| page.pagination.next_offset) {
			Some(offset) => {
				self.navigate(offset);
				true
			}
			None => false,
		}
	}

	/// Show the previous page, if any.
	pub fn previous_page(&mut self) -> bool {
		match self
			.view
			.data
			.as_ref()
			.and_then(|page| page.pagination.previous_offset)
		{
			Some(offset) => {
				self.navigate(offset);
				true
			}
			None => false,
		}
	}

	/// Drop the cached page for the current parameters and fetch it again.
	pub fn refresh(&mut self) {
		if let Ok(request) = self.compiler.compile(&self.params) {
			self.cache.remove(&request.cache_key());
		}
		self.execute_search();
	}

	/// Apply (or remove, when empty) a filter value.
	pub fn apply_filter(&mut self, key: &str, value: FilterValue) -> Result<bool, ValidationError> {
		let mut filters = self.params.filters.clone();
		if !filters.apply(self.compiler.registry(), key, value)? {
			return Ok(false);
		}
		self.update_params(ParamsUpdate::default().filters(filters));
		Ok(true)
	}

	/// Drop the filter for `key` along with any input still waiting for it.
	pub fn remove_filter(&mut self, key: &str) -> bool {
		self.debouncer.cancel(key);
		self.staged.shift_remove(key);
		let mut filters = self.params.filters.clone();
		if !filters.remove(key) {
			return false;
		}
		self.update_params(ParamsUpdate::default().filters(filters));
		true
	}

	pub fn toggle_filter(&mut self, key: &str, member: &str) -> Result<bool, ValidationError> {
		let mut filters = self.params.filters.clone();
		if !filters.toggle(self.compiler.registry(), key, member)? {
			return Ok(false);
		}
		self.update_params(ParamsUpdate::default().filters(filters));
		Ok(true)
	}

	/// Remove every user filter; required defaults are injected again on compile.
	pub fn clear_filters(&mut self) -> bool {
		self.debouncer.cancel_all();
		self.staged.clear();
		if self.params.filters.is_empty() {
			return false;
		}
		self.update_params(ParamsUpdate::default().filters(FilterSet::new()));
		true
	}

	/// Record typed text for a textual filter.
	///
	/// With auto-apply on, the value is applied once `debounce` passes without
	/// another keystroke for the same key. Otherwise it waits for
	/// [`SearchController::apply_staged`].
	pub fn stage_text_filter(&mut self, key: &str, text: &str) {
		if self.options.auto_apply {
			self.debouncer.schedule(&self.runtime, key, text.to_string());
		} else {
			self.staged.insert(key.to_string(), text.to_string());
		}
	}

	/// Apply every staged text filter in one parameter update.
	///
	/// Input still waiting out its debounce is applied now as well.
	pub fn apply_staged(&mut self) -> Result<bool, ValidationError> {
		let mut staged = self.debouncer.flush();
		staged.extend(self.staged.drain(..));
		let mut filters = self.params.filters.clone();
		let mut changed = false;
		for (key, text) in staged {
			let value = text_value(&self.compiler, &key, text)?;
			changed |= filters.apply(self.compiler.registry(), &key, value)?;
		}
		if changed {
			self.update_params(ParamsUpdate::default().filters(filters));
		}
		Ok(changed)
	}

	/// Apply every outcome that has arrived. Returns whether the view changed.
	pub fn pump(&mut self) -> bool {
		let mut changed = false;
		while let Ok(event) = self.rx.try_recv() {
			changed |= self.handle_event(event);
		}
		self.collect_garbage();
		changed
	}

	/// Wait for the next outcome and apply it.
	///
	/// Returns immediately with `false` when nothing is outstanding.
	pub async fn settle(&mut self) -> bool {
		if let Ok(event) = self.rx.try_recv() {
			return self.handle_event(event);
		}
		if !self.is_busy() {
			return false;
		}
		let changed = match self.rx.recv().await {
			Some(event) => self.handle_event(event),
			None => false,
		};
		self.collect_garbage();
		changed
	}

	/// Abort the outstanding fetch for the current parameters.
	///
	/// A pending view is left `Aborted`; a revalidating one keeps its page.
	/// Returns whether anything was in flight.
	pub fn cancel(&mut self) -> bool {
		if self.in_flight.is_none() {
			return false;
		}
		self.generation += 1;
		self.view.generation = self.generation;
		self.abort_primary();
		true
	}

	fn navigate(&mut self, offset: u64) {
		self.armed = true;
		self.update_params(ParamsUpdate::default().offset(offset));
	}

	fn begin(&mut self) {
		let generation = self.generation;
		self.view.generation = generation;
		let request = match self.compiler.compile(&self.params) {
			Ok(request) => request,
			Err(err) => {
				tracing::debug!(generation, error = %err, "search parameters rejected");
				self.displayed_key = None;
				self.view.status = Status::Error;
				self.view.error = Some(err.into());
				self.view.data = None;
				self.view.is_refetching = false;
				return;
			}
		};
		let key = request.cache_key();

		match self.cache.lookup(&key, Instant::now()) {
			Some((page, Freshness::Fresh)) => {
				tracing::debug!(generation, offset = request.offset, "cache hit");
				self.show(key, page);
			}
			Some((page, Freshness::Stale)) => {
				tracing::debug!(generation, offset = request.offset, "serving stale page while revalidating");
				self.show(key.clone(), page);
				self.view.is_refetching = true;
				self.spawn_primary(generation, key, request);
			}
			None => {
				self.displayed_key = Some(key.clone());
				self.view.status = Status::Pending;
				self.view.data = None;
				self.view.error = None;
				self.view.is_refetching = false;
				self.spawn_primary(generation, key, request);
			}
		}
	}

	fn show(&mut self, key: String, page: SearchPage) {
		self.displayed_key = Some(key);
		self.view.status = Status::Success;
		self.view.data = Some(page);
		self.view.error = None;
		self.view.is_refetching = false;
	}

	fn spawn_primary(&mut self, generation: u64, key: String, request: SearchRequest) {
		// The primary fetch supersedes a prefetch of the same page.
		if let Some(prefetch) = self.prefetches.remove(&key) {
			prefetch.abort();
		}
		tracing::debug!(generation, offset = request.offset, count = request.count, "issuing search");
		let backend = Arc::clone(&self.backend);
		let tx = self.tx.clone();
		let retry = self.options.retry;
		let task = self.runtime.spawn(async move {
			let result = search_with_retry(backend.as_ref(), &request, retry).await;
			let _ = tx.send(FetchEvent::Primary {
				generation,
				key,
				request,
				result,
			});
		});
		self.in_flight = Some(InFlight { generation, task });
	}

	fn abort_primary(&mut self) {
		if let Some(in_flight) = self.in_flight.take() {
			in_flight.task.abort();
			tracing::debug!(generation = in_flight.generation, "aborted search");
			// Superseding callers start a new generation right after, which
			// replaces this status.
			if self.view.status == Status::Pending {
				self.view.status = Status::Aborted;
			}
			self.view.is_refetching = false;
		}
	}

	fn abort_prefetches(&mut self) {
		for (_, task) in self.prefetches.drain() {
			task.abort();
		}
	}

	fn collect_garbage(&mut self) {
		let evicted = self
			.cache
			.collect_garbage(Instant::now(), self.displayed_key.as_deref());
		if evicted > 0 {
			tracing::debug!(evicted, "evicted unused cache entries");
		}
	}

	pub(crate) fn handle_event(&mut self, event: FetchEvent) -> bool {
		match event {
			FetchEvent::Primary {
				generation,
				key,
				request,
				result,
			} => {
				if self
					.in_flight
					.as_ref()
					.is_some_and(|in_flight| in_flight.generation == generation)
				{
					self.in_flight = None;
				}
				let current = generation == self.generation;
				match result {
					Ok(response) => {
						let page = SearchPage::from_response(response, &request);
						self.cache.insert(key.clone(), page.clone(), Instant::now());
						if !current {
							tracing::debug!(generation, current = self.generation, "dropping stale response");
							return false;
						}
						self.show(key, page);
						true
					}
					Err(err) => {
						if !current {
							tracing::debug!(generation, current = self.generation, "dropping stale failure");
							return false;
						}
						self.view.status = Status::Error;
						self.view.error = Some(err);
						self.view.is_refetching = false;
						true
					}
				}
			}
			FetchEvent::Prefetch {
				key,
				request,
				result,
			} => {
				self.prefetches.remove(&key);
				match result {
					Ok(response) => {
						let page = SearchPage::from_response(response, &request);
						self.cache.insert(key, page, Instant::now());
						tracing::debug!(offset = request.offset, "prefetched page cached");
					}
					Err(err) => {
						tracing::debug!(offset = request.offset, error = %err, "prefetch failed");
					}
				}
				false
			}
			FetchEvent::Debounced { key, seq, value } => {
				if !self.debouncer.complete(&key, seq) {
					return false;
				}
				let applied = text_value(&self.compiler, &key, value)
					.and_then(|value| self.apply_filter(&key, value));
				match applied {
					Ok(changed) => changed,
					Err(err) => {
						tracing::warn!(key = %key, error = %err, "rejected filter input");
						self.view.status = Status::Error;
						self.view.error = Some(SearchError::from(CompileError::from(err)));
						true
					}
				}
			}
		}
	}
}

impl<B: SearchBackend> Drop for SearchController<B> {
	fn drop(&mut self) {
		if let Some(in_flight) = self.in_flight.take() {
			in_flight.task.abort();
		}
		self.abort_prefetches();
		self.debouncer.cancel_all();
	}
}

fn text_value(compiler: &Compiler, key: &str, text: String) -> Result<FilterValue, ValidationError> {
	let query_type = compiler.registry().expect(key)?;
	FilterValue::text(query_type, text).ok_or_else(|| ValidationError::TypeMismatch {
		key: key.to_string(),
		expected: query_type,
		actual: QueryType::Like,
	})
}

#[cfg(test)]
mod tests;
