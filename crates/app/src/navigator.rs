//! Page lifecycle.
//!
//! Navigating unmounts the current page before mounting the next one, so a
//! pending request whose page goes away is cancelled through its observer.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use qcr_fetch::{DiagnosticSink, FetchConfig, LogCancellation, RepoQuery, TracingSink, Transport};

use crate::RepoClient;
use crate::page::{Frame, Page, ProblemPage};
use crate::render::Renderer;
use crate::route::Route;

/// Builds the query function for each problem page mount.
#[derive(Clone)]
pub struct QueryFactory {
	transport: Arc<dyn Transport>,
	config: FetchConfig,
	sink: Arc<dyn DiagnosticSink>,
}

impl QueryFactory {
	/// Factory logging intercepted cancellations through `tracing`.
	pub fn new(transport: Arc<dyn Transport>, config: FetchConfig) -> Self {
		Self {
			transport,
			config,
			sink: Arc::new(TracingSink),
		}
	}

	pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
		self.sink = sink;
		self
	}

	pub fn build(&self) -> LogCancellation<RepoQuery> {
		LogCancellation::new(RepoQuery::new(Arc::clone(&self.transport), &self.config))
			.with_policy(self.config.cancel_log)
			.with_sink(Arc::clone(&self.sink))
	}
}

/// Owns the mounted page and switches routes.
pub struct Navigator {
	client: RepoClient,
	factory: QueryFactory,
	strict_mode: bool,
	current: Page,
}

impl Navigator {
	/// Starts at the homepage.
	pub fn new(client: RepoClient, factory: QueryFactory, strict_mode: bool) -> Self {
		Self {
			client,
			factory,
			strict_mode,
			current: Page::Home,
		}
	}

	pub fn route(&self) -> Route {
		self.current.route()
	}

	pub fn client(&self) -> &RepoClient {
		&self.client
	}

	pub fn view(&mut self) -> Frame {
		self.current.view()
	}

	/// Unmounts the current page, mounts the page for `route` and returns
	/// its first view.
	pub fn navigate(&mut self, route: Route) -> Frame {
		let previous = std::mem::replace(&mut self.current, Page::Home);
		tracing::debug!(from = %previous.route(), to = %route, "navigate");
		drop(previous);

		self.current = match route {
			Route::Home => Page::Home,
			Route::Problem => Page::Problem(self.mount_problem()),
		};
		self.current.view()
	}

	/// Follows the single link on the current page.
	pub fn follow_link(&mut self) -> Frame {
		self.navigate(self.route().link_target())
	}

	/// Waits for the mounted page to change and returns its new view.
	///
	/// Returns `None` when the page has nothing left to wait for.
	pub async fn next_view(&mut self) -> Option<Frame> {
		match &mut self.current {
			Page::Home => None,
			Page::Problem(page) => page.next_view().await,
		}
	}

	/// Renders the current page, follows its link and renders every
	/// transition of the mounted page.
	///
	/// With `back_after`, navigates back home once that much time has passed
	/// since the link was followed, cancelling the request if it is still
	/// pending. A request that settles earlier is shown until then.
	pub async fn play<W: Write>(&mut self, renderer: &mut Renderer<W>, back_after: Option<Duration>) -> io::Result<()> {
		renderer.render(&self.view())?;
		tracing::info!("Following link to {}", self.route().link_target());
		renderer.render(&self.follow_link())?;

		let Some(back_after) = back_after else {
			return self.watch(renderer).await;
		};
		let deadline = tokio::time::Instant::now() + back_after;
		tokio::select! {
			_ = tokio::time::sleep_until(deadline) => {}
			watched = self.watch(renderer) => {
				watched?;
				tokio::time::sleep_until(deadline).await;
			}
		}

		let back = self.route().link_target();
		tracing::info!("Navigating back to {back}");
		renderer.render(&self.navigate(back))?;
		Ok(())
	}

	async fn watch<W: Write>(&mut self, renderer: &mut Renderer<W>) -> io::Result<()> {
		while let Some(frame) = self.next_view().await {
			renderer.render(&frame)?;
		}
		Ok(())
	}

	fn mount_problem(&self) -> ProblemPage {
		if self.strict_mode {
			let probe = ProblemPage::mount(&self.client, self.factory.build());
			tracing::debug!(generation = probe.generation(), "strict_mode.unmount");
			drop(probe);
		}
		ProblemPage::mount(&self.client, self.factory.build())
	}
}
