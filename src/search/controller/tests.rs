use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use docket_query::{DefaultFacetPolicy, FieldRegistry, PaginationPayload, SearchResult};

use super::*;

struct Reply {
	delay: Duration,
	outcome: Result<SearchResponse, SearchError>,
}

/// Answers from a script first, then synthesizes pages over `total` documents.
#[derive(Clone)]
struct ScriptedBackend {
	calls: Arc<Mutex<Vec<SearchRequest>>>,
	script: Arc<Mutex<VecDeque<(Duration, Option<SearchError>)>>>,
	total: u64,
	delay: Duration,
}

impl ScriptedBackend {
	fn new(total: u64) -> Self {
		Self {
			calls: Arc::default(),
			script: Arc::default(),
			total,
			delay: Duration::from_millis(50),
		}
	}

	fn then_fail(self, error: SearchError) -> Self {
		self.script
			.lock()
			.unwrap()
			.push_back((Duration::from_millis(10), Some(error)));
		self
	}

	fn then_delay(self, delay: Duration) -> Self {
		self.script.lock().unwrap().push_back((delay, None));
		self
	}

	fn calls(&self) -> Vec<SearchRequest> {
		self.calls.lock().unwrap().clone()
	}
}

fn page_for(request: &SearchRequest, total: u64) -> SearchResponse {
	let end = (request.offset + request.count).min(total);
	SearchResponse {
		pagination: PaginationPayload { total },
		results: (request.offset..end)
			.map(|index| SearchResult::new(index.to_string()).with_filename(format!("doc-{index}.pdf")))
			.collect(),
	}
}

impl SearchBackend for ScriptedBackend {
	fn search(
		&self,
		request: &SearchRequest,
	) -> impl Future<Output = Result<SearchResponse, SearchError>> + Send {
		self.calls.lock().unwrap().push(request.clone());
		let scripted = self.script.lock().unwrap().pop_front();
		let reply = match scripted {
			Some((delay, Some(error))) => Reply {
				delay,
				outcome: Err(error),
			},
			Some((delay, None)) => Reply {
				delay,
				outcome: Ok(page_for(request, self.total)),
			},
			None => Reply {
				delay: self.delay,
				outcome: Ok(page_for(request, self.total)),
			},
		};
		async move {
			tokio::time::sleep(reply.delay).await;
			reply.outcome
		}
	}
}

fn controller_with(
	backend: &ScriptedBackend,
	options: ControllerOptions,
) -> SearchController<ScriptedBackend> {
	SearchController::new(
		backend.clone(),
		Compiler::default(),
		QueryParams::new(20),
		options,
		Handle::current(),
	)
}

fn controller(backend: &ScriptedBackend) -> SearchController<ScriptedBackend> {
	controller_with(backend, ControllerOptions::default())
}

async fn settle_all(controller: &mut SearchController<ScriptedBackend>) {
	while controller.is_busy() {
		controller.settle().await;
	}
}

fn server_error(status: u16) -> SearchError {
	SearchError::Server {
		status,
		message: "unavailable".into(),
	}
}

fn like(text: &str) -> FilterValue {
	FilterValue::text(QueryType::Like, text).unwrap()
}

#[tokio::test(start_paused = true)]
async fn nothing_is_fetched_until_armed() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);

	controller.update_params(ParamsUpdate::default().offset(20));
	assert_eq!(controller.view().status, Status::Idle);
	assert!(!controller.is_busy());
	assert!(!controller.settle().await);
	assert!(backend.calls().is_empty());
	assert_eq!(controller.params().offset, 20);
}

#[tokio::test(start_paused = true)]
async fn fresh_cache_hit_skips_the_network() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);

	controller.execute_search();
	assert_eq!(controller.view().status, Status::Pending);
	assert!(controller.settle().await);

	let view = controller.view();
	assert_eq!(view.status, Status::Success);
	assert_eq!(view.results().len(), 20);
	assert_eq!(view.data.as_ref().unwrap().pagination.next_offset, Some(20));
	assert_eq!(backend.calls().len(), 1);

	controller.execute_search();
	assert_eq!(controller.view().status, Status::Success);
	assert!(!controller.is_busy());
	assert_eq!(backend.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_pages_are_shown_while_revalidating() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;

	tokio::time::advance(Duration::from_secs(31)).await;
	controller.execute_search();
	let view = controller.view();
	assert_eq!(view.status, Status::Success);
	assert!(view.is_refetching);
	assert!(view.data.is_some());

	settle_all(&mut controller).await;
	assert!(!controller.view().is_refetching);
	assert_eq!(backend.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn only_the_latest_generation_is_displayed() {
	let backend = ScriptedBackend::new(45).then_delay(Duration::from_millis(500));
	let mut controller = controller(&backend);

	controller.execute_search();
	controller.apply_filter("filename", like("report")).unwrap();
	assert_eq!(controller.view().status, Status::Pending);
	assert_eq!(controller.view().error, None);
	settle_all(&mut controller).await;

	let view = controller.view();
	assert_eq!(view.status, Status::Success);
	assert_eq!(view.generation, controller.generation());
	let last = backend.calls().pop().unwrap();
	assert!(last.filter("filename").is_some());
}

#[tokio::test(start_paused = true)]
async fn late_response_for_old_generation_only_fills_the_cache() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;
	let shown = controller.view().clone();

	let old_request = controller
		.compiler()
		.compile(&QueryParams::new(20).with_offset(40))
		.unwrap();
	let changed = controller.handle_event(FetchEvent::Primary {
		generation: controller.generation() - 1,
		key: old_request.cache_key(),
		request: old_request.clone(),
		result: Ok(page_for(&old_request, 45)),
	});

	assert!(!changed);
	assert_eq!(controller.view(), &shown);
	assert!(controller.cache().contains(&old_request.cache_key()));
}

#[tokio::test(start_paused = true)]
async fn superseded_requests_never_surface_errors() {
	let backend = ScriptedBackend::new(45).then_fail(server_error(400));
	let mut controller = controller(&backend);

	controller.execute_search();
	controller.apply_filter("filename", like("report")).unwrap();
	settle_all(&mut controller).await;
	assert_eq!(controller.view().status, Status::Success);
	assert_eq!(controller.view().error, None);

	let old_request = controller.compiler().compile(&QueryParams::new(20)).unwrap();
	let changed = controller.handle_event(FetchEvent::Primary {
		generation: controller.generation() - 1,
		key: old_request.cache_key(),
		request: old_request,
		result: Err(server_error(400)),
	});
	assert!(!changed);
	assert_eq!(controller.view().status, Status::Success);
	assert_eq!(controller.view().error, None);
}

#[tokio::test(start_paused = true)]
async fn cancelling_a_pending_search_leaves_it_aborted() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	assert!(!controller.cancel());

	controller.execute_search();
	assert_eq!(controller.view().status, Status::Pending);
	assert!(controller.cancel());
	assert_eq!(controller.view().status, Status::Aborted);
	assert!(!controller.is_busy());

	tokio::time::sleep(Duration::from_secs(1)).await;
	assert!(!controller.pump());
	let view = controller.view();
	assert_eq!(view.status, Status::Aborted);
	assert_eq!(view.error, None);
	assert!(view.data.is_none());

	controller.execute_search();
	settle_all(&mut controller).await;
	assert_eq!(controller.view().status, Status::Success);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_are_retried_with_backoff() {
	let backend = ScriptedBackend::new(45)
		.then_fail(server_error(503))
		.then_fail(SearchError::Network("connection reset".into()));
	let mut controller = controller(&backend);
	let start = Instant::now();

	controller.execute_search();
	settle_all(&mut controller).await;

	assert_eq!(controller.view().status, Status::Success);
	assert_eq!(backend.calls().len(), 3);
	assert!(Instant::now() - start >= Duration::from_millis(750));
}

#[tokio::test(start_paused = true)]
async fn client_errors_fail_without_retry() {
	let backend = ScriptedBackend::new(45).then_fail(server_error(400));
	let mut controller = controller(&backend);

	controller.execute_search();
	settle_all(&mut controller).await;

	assert_eq!(controller.view().status, Status::Error);
	assert_eq!(controller.view().error, Some(server_error(400)));
	assert_eq!(backend.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_the_last_error() {
	let backend = ScriptedBackend::new(45)
		.then_fail(server_error(500))
		.then_fail(server_error(502))
		.then_fail(server_error(503))
		.then_fail(server_error(504));
	let mut controller = controller(&backend);

	controller.execute_search();
	settle_all(&mut controller).await;

	assert_eq!(controller.view().status, Status::Error);
	assert_eq!(controller.view().error, Some(server_error(504)));
	assert_eq!(backend.calls().len(), 4);
}

#[tokio::test(start_paused = true)]
async fn prefetch_warms_the_next_page_once() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;

	assert!(controller.prefetch_next_page());
	assert!(!controller.prefetch_next_page());
	settle_all(&mut controller).await;
	assert_eq!(controller.cache().len(), 2);
	assert!(!controller.prefetch_next_page());
	assert_eq!(controller.view().data.as_ref().unwrap().pagination.current_offset, 0);

	assert!(controller.next_page());
	let view = controller.view();
	assert_eq!(view.status, Status::Success);
	assert_eq!(view.data.as_ref().unwrap().pagination.current_offset, 20);
	assert_eq!(backend.calls().len(), 2);

	assert!(controller.previous_page());
	assert_eq!(controller.params().offset, 0);
	assert_eq!(backend.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn last_page_has_nothing_to_prefetch() {
	let backend = ScriptedBackend::new(5);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;

	assert!(!controller.prefetch_next_page());
	assert!(!controller.next_page());
	assert!(!controller.previous_page());
}

#[tokio::test(start_paused = true)]
async fn filter_change_resets_offset_and_cancels_prefetch() {
	let backend = ScriptedBackend::new(100);
	let mut controller = controller(&backend);
	controller.execute_search();
	controller.update_params(ParamsUpdate::default().offset(40));
	settle_all(&mut controller).await;
	assert_eq!(controller.view().data.as_ref().unwrap().pagination.current_offset, 40);

	assert!(controller.prefetch_next_page());
	controller
		.toggle_filter("contentType", "application/pdf")
		.unwrap();
	assert_eq!(controller.params().offset, 0);
	settle_all(&mut controller).await;

	let calls = backend.calls();
	assert!(calls.iter().all(|request| request.offset != 60));
	let last = calls.last().unwrap();
	assert_eq!(last.offset, 0);
	assert!(last.filter("contentType").is_some());
}

#[tokio::test(start_paused = true)]
async fn debounced_input_applies_only_the_last_keystroke() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;

	controller.stage_text_filter("filename", "r");
	tokio::time::sleep(Duration::from_millis(200)).await;
	controller.stage_text_filter("filename", "re");
	tokio::time::sleep(Duration::from_millis(200)).await;
	controller.stage_text_filter("filename", "rep");
	assert!(!controller.pump());
	assert_eq!(backend.calls().len(), 1);

	settle_all(&mut controller).await;
	assert_eq!(controller.params().filters.get("filename"), Some(&like("rep")));
	let calls = backend.calls();
	assert_eq!(calls.len(), 2);
	assert_eq!(calls[1].filter("filename").map(|filter| &filter.value), Some(&like("rep")));
}

#[tokio::test(start_paused = true)]
async fn removing_a_filter_drops_input_still_in_its_debounce_window() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;

	controller.stage_text_filter("filename", "rep");
	assert!(!controller.remove_filter("filename"));
	assert!(!controller.is_busy());

	tokio::time::sleep(Duration::from_secs(1)).await;
	assert!(!controller.pump());
	assert_eq!(controller.params().filters.get("filename"), None);
	assert_eq!(backend.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn applying_staged_input_skips_the_debounce_wait() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;

	controller.stage_text_filter("filename", "inv");
	assert!(controller.apply_staged().unwrap());
	assert_eq!(controller.params().filters.get("filename"), Some(&like("inv")));

	settle_all(&mut controller).await;
	assert_eq!(backend.calls().len(), 2);
	tokio::time::sleep(Duration::from_secs(1)).await;
	assert!(!controller.pump());
	assert_eq!(backend.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn manual_apply_waits_for_confirmation() {
	let backend = ScriptedBackend::new(45);
	let options = ControllerOptions {
		auto_apply: false,
		..ControllerOptions::default()
	};
	let mut controller = controller_with(&backend, options);
	controller.execute_search();
	settle_all(&mut controller).await;

	controller.stage_text_filter("filename", "invoice");
	tokio::time::sleep(Duration::from_secs(2)).await;
	assert!(!controller.pump());
	assert_eq!(controller.staged().count(), 1);
	assert!(controller.params().filters.is_empty());

	assert!(controller.apply_staged().unwrap());
	settle_all(&mut controller).await;
	assert_eq!(controller.staged().count(), 0);
	assert_eq!(controller.params().filters.get("filename"), Some(&like("invoice")));
	assert_eq!(backend.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn invalid_typed_filters_surface_as_errors() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;

	controller.stage_text_filter("owner", "me");
	settle_all(&mut controller).await;

	assert_eq!(controller.view().status, Status::Error);
	assert!(matches!(
		controller.view().error,
		Some(SearchError::Compile(CompileError::Validation(
			ValidationError::UnknownField { .. }
		)))
	));
	assert_eq!(backend.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn removing_the_last_filter_keeps_the_default_facet() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	controller
		.toggle_filter("contentType", "application/pdf")
		.unwrap();
	settle_all(&mut controller).await;

	assert!(controller.remove_filter("contentType"));
	settle_all(&mut controller).await;

	let last = backend.calls().pop().unwrap();
	assert_eq!(last.query.len(), 1);
	assert_eq!(last.query[0].key, "sourceSystem");
	assert!(!controller.clear_filters());
}

#[tokio::test(start_paused = true)]
async fn unused_pages_are_evicted_but_the_shown_page_is_kept() {
	let backend = ScriptedBackend::new(100);
	let options = ControllerOptions {
		stale_time: Duration::from_secs(10),
		gc_time: Duration::from_secs(60),
		..ControllerOptions::default()
	};
	let mut controller = controller_with(&backend, options);
	controller.execute_search();
	settle_all(&mut controller).await;
	assert!(controller.next_page());
	settle_all(&mut controller).await;
	assert_eq!(controller.cache().len(), 2);

	tokio::time::advance(Duration::from_secs(61)).await;
	controller.pump();
	assert_eq!(controller.cache().len(), 1);
	assert_eq!(controller.view().data.as_ref().unwrap().pagination.current_offset, 20);
}

#[tokio::test(start_paused = true)]
async fn refresh_bypasses_a_fresh_cache_entry() {
	let backend = ScriptedBackend::new(45);
	let mut controller = controller(&backend);
	controller.execute_search();
	settle_all(&mut controller).await;

	controller.refresh();
	assert_eq!(controller.view().status, Status::Pending);
	settle_all(&mut controller).await;
	assert_eq!(controller.view().status, Status::Success);
	assert_eq!(backend.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn compile_errors_never_reach_the_backend() {
	let backend = ScriptedBackend::new(45);
	let compiler = Compiler::new(FieldRegistry::default())
		.with_default("sourceSystem", FilterValue::text(QueryType::Matches, "genius").unwrap())
		.with_policy(DefaultFacetPolicy::Reject);
	let mut controller = SearchController::new(
		backend.clone(),
		compiler,
		QueryParams::new(20),
		ControllerOptions::default(),
		Handle::current(),
	);

	controller.execute_search();
	assert_eq!(controller.view().status, Status::Error);
	assert!(matches!(
		controller.view().error,
		Some(SearchError::Compile(CompileError::MissingDefaultFacet { .. }))
	));
	assert!(!controller.is_busy());
	assert!(backend.calls().is_empty());
}
