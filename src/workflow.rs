use anyhow::{Context, Result, anyhow, bail};
use docket::query::SearchPage;
use docket::search::{HttpBackend, SearchController, StaticToken};
use docket::tui::style;
use docket::{App, SearchOutcome, UiConfig};
use tokio::runtime::{Builder, Runtime};

use crate::settings::ResolvedConfig;

/// Wires the resolved configuration into a controller and runs it either in
/// the terminal browser or as a single blocking search.
pub(crate) struct SearchWorkflow {
	// Dropped before the runtime so outstanding tasks are aborted first.
	controller: SearchController<HttpBackend<StaticToken>>,
	ui: UiConfig,
	runtime: Runtime,
}

impl SearchWorkflow {
	pub(crate) fn from_config(config: ResolvedConfig) -> Result<Self> {
		let ResolvedConfig {
			backend,
			token,
			compiler,
			params,
			controller,
			view,
		} = config;

		let runtime = Builder::new_multi_thread()
			.worker_threads(2)
			.thread_name("docket-fetch")
			.enable_all()
			.build()
			.context("failed to start the async runtime")?;
		let backend = HttpBackend::new(backend, token)?;
		let controller =
			SearchController::new(backend, compiler, params, controller, runtime.handle().clone());

		let mut ui = UiConfig {
			overscan: view.overscan,
			prefetch_threshold: view.prefetch_threshold,
			..UiConfig::default()
		};
		if let Some(name) = view.theme.as_deref() {
			ui.theme = style::by_name(name).ok_or_else(|| anyhow!("unknown theme '{name}'"))?;
		}

		Ok(Self {
			controller,
			ui,
			runtime,
		})
	}

	/// Browse interactively until the user selects a document or quits.
	pub(crate) fn run(self) -> Result<SearchOutcome> {
		let Self {
			controller,
			ui,
			runtime,
		} = self;
		let outcome = docket::run(App::new(controller, ui));
		drop(runtime);
		outcome
	}

	/// Execute the configured search once and wait for its page.
	pub(crate) fn run_once(mut self) -> Result<SearchPage> {
		let controller = &mut self.controller;
		controller.execute_search();
		self.runtime.block_on(async {
			while controller.is_busy() {
				controller.settle().await;
			}
		});

		let view = self.controller.view();
		if let Some(error) = &view.error {
			return Err(error.clone()).context("search failed");
		}
		match &view.data {
			Some(page) => Ok(page.clone()),
			None => bail!("search finished without a result ({})", view.status),
		}
	}
}
