use std::sync::{Arc, Mutex};

use axum::{Json, Router};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use axum::routing::post;
use docket::query::field::{CONTENT, CONTENT_TYPE};
use docket::query::{Compiler, FilterSet, FilterValue, QueryParams, SearchRequest};
use docket::search::{
	BackendConfig, ControllerOptions, HttpBackend, SearchBackend, SearchController, SearchError,
	StaticToken,
};
use serde_json::{Value, json};
use tokio::runtime::Handle;

#[derive(Debug, Clone, PartialEq)]
struct Received {
	route: &'static str,
	authorization: Option<String>,
	body: Value,
}

#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<Received>>>);

impl Seen {
	fn record(&self, route: &'static str, headers: &HeaderMap, body: Value) {
		let authorization = headers
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.map(str::to_string);
		self.0.lock().unwrap().push(Received {
			route,
			authorization,
			body,
		});
	}

	fn all(&self) -> Vec<Received> {
		self.0.lock().unwrap().clone()
	}
}

fn page_body() -> Value {
	json!({
		"pagination": {"total": 42, "pageSize": 20, "currentOffset": 0},
		"results": [
			{"id": 1, "filename": "q3.pdf", "contentType": "application/pdf"},
			{"id": "2", "filename": "notes.txt"}
		]
	})
}

async fn spawn_backend() -> (String, Seen) {
	let seen = Seen::default();
	let app = Router::new()
		.route(
			"/api/documents/search",
			post(
				|State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
					seen.record("search", &headers, body);
					Json(page_body())
				},
			),
		)
		.route(
			"/api/documents/content-search",
			post(
				|State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
					seen.record("content", &headers, body);
					Json(page_body())
				},
			),
		)
		.route(
			"/broken",
			post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance window") }),
		)
		.route(
			"/rejects",
			post(|| async { (StatusCode::BAD_REQUEST, "unknown field") }),
		)
		.route("/garbage", post(|| async { "this is not json" }))
		.with_state(seen.clone());

	let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
		.await
		.expect("failed to bind");
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, app).await.unwrap();
	});

	(format!("http://{addr}"), seen)
}

fn compile(filters: &[(&str, FilterValue)]) -> SearchRequest {
	let compiler = Compiler::default();
	let mut set = FilterSet::new();
	for (key, value) in filters {
		set.apply(compiler.registry(), key, value.clone()).unwrap();
	}
	compiler
		.compile(&QueryParams::new(20).with_filters(set))
		.unwrap()
}

fn backend(base_url: &str, token: Option<&str>) -> HttpBackend<StaticToken> {
	HttpBackend::new(
		BackendConfig::new(base_url),
		StaticToken::new(token.map(str::to_string)),
	)
	.unwrap()
}

#[tokio::test]
async fn search_posts_the_compiled_request_with_a_bearer_token() {
	let (base_url, seen) = spawn_backend().await;
	let request = compile(&[(CONTENT_TYPE, FilterValue::members(["application/pdf"]))]);

	let response = backend(&base_url, Some("secret")).search(&request).await.unwrap();
	assert_eq!(response.pagination.total, 42);
	assert_eq!(response.results[0].id, "1");
	assert_eq!(response.results[1].display_name(), "notes.txt");

	let received = seen.all();
	assert_eq!(received.len(), 1);
	assert_eq!(received[0].route, "search");
	assert_eq!(received[0].authorization.as_deref(), Some("Bearer secret"));
	assert_eq!(received[0].body, serde_json::to_value(&request).unwrap());
	assert_eq!(
		received[0].body["query"],
		json!([
			{"key": "contentType", "type": "in", "value": ["application/pdf"]},
			{"key": "sourceSystem", "type": "matches", "value": "genius"}
		])
	);
	assert_eq!(received[0].body["count"], 20);
	assert_eq!(received[0].body["offset"], 0);
}

#[tokio::test]
async fn content_filters_go_to_the_content_endpoint_anonymously() {
	let (base_url, seen) = spawn_backend().await;
	let request = compile(&[(CONTENT, FilterValue::Contains("quarterly revenue".into()))]);

	backend(&base_url, None).search(&request).await.unwrap();

	let received = seen.all();
	assert_eq!(received[0].route, "content");
	assert_eq!(received[0].authorization, None);
}

#[tokio::test]
async fn server_failures_keep_status_and_body() {
	let (base_url, _) = spawn_backend().await;
	let request = compile(&[]);

	let mut config = BackendConfig::new(&base_url);
	config.search_path = "/broken".into();
	let err = HttpBackend::new(config, StaticToken::default())
		.unwrap()
		.search(&request)
		.await
		.unwrap_err();
	assert_eq!(
		err,
		SearchError::Server {
			status: 503,
			message: "maintenance window".into(),
		}
	);
	assert!(err.is_transient());

	let mut config = BackendConfig::new(&base_url);
	config.search_path = "/rejects".into();
	let err = HttpBackend::new(config, StaticToken::default())
		.unwrap()
		.search(&request)
		.await
		.unwrap_err();
	assert!(!err.is_transient());
}

#[tokio::test]
async fn undecodable_bodies_are_decode_errors() {
	let (base_url, _) = spawn_backend().await;
	let mut config = BackendConfig::new(&base_url);
	config.search_path = "/garbage".into();

	let err = HttpBackend::new(config, StaticToken::default())
		.unwrap()
		.search(&compile(&[]))
		.await
		.unwrap_err();
	assert!(matches!(err, SearchError::Decode(_)));
	assert!(!err.is_transient());
}

#[tokio::test]
async fn unreachable_backends_are_network_errors() {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);

	let err = backend(&format!("http://{addr}"), None)
		.search(&compile(&[]))
		.await
		.unwrap_err();
	assert!(matches!(err, SearchError::Network(_)));
	assert!(err.is_transient());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn controller_fetches_pages_over_http() {
	let (base_url, seen) = spawn_backend().await;
	let mut controller = SearchController::new(
		backend(&base_url, Some("secret")),
		Compiler::default(),
		QueryParams::new(20),
		ControllerOptions::default(),
		Handle::current(),
	);

	controller.execute_search();
	while controller.is_busy() {
		controller.settle().await;
	}

	let page = controller.view().data.clone().expect("page");
	assert_eq!(page.pagination.total, 42);
	assert_eq!(page.pagination.total_pages, 3);
	assert!(page.pagination.has_more);
	assert_eq!(page.results.len(), 2);
	assert_eq!(seen.all().len(), 1);
}
