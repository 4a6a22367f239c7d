//! Page lifecycle against a scripted transport.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use qcr_app::{Frame, Navigator, QueryFactory, RepoClient, Renderer, Route, repo_key};
use qcr_fetch::testing::{RecordingSink, ScriptedTransport};
use qcr_fetch::{CANCELLATION_LOG_MESSAGE, CancelLogPolicy, DiagnosticSink, FetchConfig, FetchError, Transport};
use qcr_query::QueryOutcome;
use serde_json::json;
// Dependencies of the library and binary targets.
use {anyhow as _, clap as _, serde as _, tempfile as _, thiserror as _, toml as _, tracing as _, tracing_subscriber as _};

struct Harness {
	navigator: Navigator,
	transport: Arc<ScriptedTransport>,
	sink: Arc<RecordingSink>,
}

fn harness(transport: ScriptedTransport, strict_mode: bool, cancel_log: CancelLogPolicy) -> Harness {
	let transport = Arc::new(transport);
	let sink = Arc::new(RecordingSink::default());
	let config = FetchConfig {
		cancel_log,
		..FetchConfig::default()
	};
	let factory = QueryFactory::new(Arc::clone(&transport) as Arc<dyn Transport>, config)
		.with_sink(Arc::clone(&sink) as Arc<dyn DiagnosticSink>);
	Harness {
		navigator: Navigator::new(RepoClient::new(), factory, strict_mode),
		transport,
		sink,
	}
}

fn repo_ok() -> ScriptedTransport {
	ScriptedTransport::new().json(200, json!({ "name": "query" }))
}

/// Follows the homepage link and collects frames until the page settles.
async fn visit_problem_page(navigator: &mut Navigator) -> Vec<Frame> {
	assert_eq!(navigator.route(), Route::Home);
	let mut frames = vec![navigator.follow_link()];
	while let Some(frame) = navigator.next_view().await {
		frames.push(frame);
	}
	frames
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn strict_mode_shows_only_the_second_instance() {
	let mut h = harness(repo_ok(), true, CancelLogPolicy::Log);
	let frames = visit_problem_page(&mut h.navigator).await;

	assert!(frames[0].contains("Loading..."));
	assert!(frames.last().is_some_and(|f| f.contains("Repo Name: query")));
	assert!(!frames.iter().any(|f| f.contains("Error:")), "no error flash: {frames:#?}");

	h.navigator.client().idle().await;
	assert_eq!(h.transport.requests().len(), 2, "both mounts reach the transport");
	let entries = h.sink.entries();
	assert_eq!(entries.len(), 1, "the superseded instance logs its cancellation");
	assert_eq!(entries[0].message, CANCELLATION_LOG_MESSAGE);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn single_mount_logs_nothing() {
	let mut h = harness(repo_ok(), false, CancelLogPolicy::Log);
	let frames = visit_problem_page(&mut h.navigator).await;

	assert_eq!(frames.len(), 2);
	h.navigator.client().idle().await;
	assert_eq!(h.transport.requests().len(), 1);
	assert!(h.sink.entries().is_empty());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn silent_policy_still_supersedes_without_logging() {
	let mut h = harness(repo_ok(), true, CancelLogPolicy::Silent);
	let frames = visit_problem_page(&mut h.navigator).await;

	assert!(frames.last().is_some_and(|f| f.contains("Repo Name: query")));
	h.navigator.client().idle().await;
	assert!(h.sink.entries().is_empty());
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn not_found_renders_request_failed() {
	let mut h = harness(ScriptedTransport::new().status(404), false, CancelLogPolicy::Log);
	let frames = visit_problem_page(&mut h.navigator).await;

	assert!(frames.last().is_some_and(|f| f.contains("Error: Network response was not ok")));
	h.navigator.client().idle().await;
	assert!(h.sink.entries().is_empty(), "request failures are not intercepted");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn leaving_the_page_cancels_the_pending_request() {
	let mut h = harness(repo_ok(), true, CancelLogPolicy::Log);
	h.navigator.follow_link();
	tokio::time::sleep(Duration::from_millis(1000)).await;

	let home = h.navigator.navigate(Route::Home);
	assert_eq!(home.route, Route::Home);
	assert!(h.navigator.next_view().await.is_none());

	h.navigator.client().idle().await;
	assert_eq!(
		h.navigator.client().outcome(&repo_key()),
		Some(QueryOutcome::Error(FetchError::Cancelled))
	);
	assert_eq!(h.sink.entries().len(), 2);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn reentering_the_page_restarts_at_pending() {
	let mut h = harness(repo_ok(), false, CancelLogPolicy::Log);
	visit_problem_page(&mut h.navigator).await;
	let first_generation = h.navigator.client().generation(&repo_key());

	h.navigator.navigate(Route::Home);
	let frames = visit_problem_page(&mut h.navigator).await;

	assert!(frames[0].contains("Loading..."));
	assert!(frames.last().is_some_and(|f| f.contains("Repo Name: query")));
	assert_ne!(h.navigator.client().generation(&repo_key()), first_generation);
	assert_eq!(h.transport.requests().len(), 2);
}

/// Writer refusing any write that carries `poison`.
struct RefusingWriter {
	poison: &'static str,
	out: Vec<u8>,
}

impl Write for RefusingWriter {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		if String::from_utf8_lossy(buf).contains(self.poison) {
			return Err(io::Error::other("terminal closed"));
		}
		self.out.extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn play_renders_until_the_request_settles() {
	let mut h = harness(repo_ok(), true, CancelLogPolicy::Log);
	let mut renderer = Renderer::new(Vec::new());

	h.navigator.play(&mut renderer, None).await.expect("frames are written");

	let out = String::from_utf8(renderer.into_inner()).expect("utf-8 frames");
	assert!(out.contains("[Go to Problem Page](/problem-page)"));
	assert!(out.contains("Loading..."));
	assert!(out.ends_with("Repo Name: query\n\n"), "{out}");
	assert_eq!(h.navigator.route(), Route::Problem);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn play_propagates_write_failures_while_watching() {
	let mut h = harness(repo_ok(), false, CancelLogPolicy::Log);
	let mut renderer = Renderer::new(RefusingWriter {
		poison: "Repo Name",
		out: Vec::new(),
	});

	let err = h.navigator.play(&mut renderer, None).await.expect_err("the success frame cannot be written");

	assert_eq!(err.to_string(), "terminal closed");
	let out = String::from_utf8(renderer.into_inner().out).expect("utf-8 frames");
	assert!(out.contains("Loading..."));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn back_after_settlement_still_returns_home_on_time() {
	let mut h = harness(repo_ok(), false, CancelLogPolicy::Log);
	let mut renderer = Renderer::new(Vec::new());
	let started = tokio::time::Instant::now();

	h.navigator
		.play(&mut renderer, Some(Duration::from_millis(5000)))
		.await
		.expect("frames are written");

	assert!(started.elapsed() >= Duration::from_millis(5000));
	assert_eq!(h.navigator.route(), Route::Home);
	let out = String::from_utf8(renderer.into_inner()).expect("utf-8 frames");
	assert!(out.contains("Repo Name: query"), "the settled page is shown before leaving");
	assert!(out.ends_with("[Go to Problem Page](/problem-page)\n\n"), "{out}");
	assert_eq!(
		h.navigator.client().outcome(&repo_key()),
		Some(QueryOutcome::Success(qcr_fetch::RepoData {
			name: "query".into(),
			full_name: None,
			description: None,
			stargazers_count: None,
		}))
	);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn back_before_settlement_cancels_the_request() {
	let mut h = harness(repo_ok(), false, CancelLogPolicy::Log);
	let mut renderer = Renderer::new(Vec::new());

	h.navigator
		.play(&mut renderer, Some(Duration::from_millis(1000)))
		.await
		.expect("frames are written");

	assert_eq!(h.navigator.route(), Route::Home);
	h.navigator.client().idle().await;
	assert_eq!(
		h.navigator.client().outcome(&repo_key()),
		Some(QueryOutcome::Error(FetchError::Cancelled))
	);
	assert_eq!(h.sink.entries().len(), 1);
}
