//! HttpTransport against a local HTTP server.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use qcr_fetch::{CancelLogPolicy, FetchConfig, FetchError, HttpTransport, LogCancellation, RepoQuery, Transport};
use qcr_query::{CancelSignal, QueryFn};
// Dependencies of the library target.
use {
	async_trait as _, bytes as _, parking_lot as _, reqwest as _, serde as _, serde_json as _, thiserror as _, tracing as _,
	tracing_subscriber as _,
};

/// Serves exactly one request with `status` and `body` after `delay`.
fn serve_once(status: u16, body: &'static str, delay: Duration) -> String {
	let server = tiny_http::Server::http("127.0.0.1:0").expect("bind test server");
	let addr = server.server_addr().to_ip().expect("tcp listen address");
	thread::spawn(move || {
		if let Ok(request) = server.recv() {
			thread::sleep(delay);
			let response = tiny_http::Response::from_string(body).with_status_code(status);
			let _ = request.respond(response);
		}
	});
	format!("http://{addr}/repos/tanstack/query")
}

fn repo_query(url: String) -> RepoQuery {
	let config = FetchConfig {
		url,
		delay: Duration::ZERO,
		timeout: Some(Duration::from_secs(10)),
		..FetchConfig::default()
	};
	let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config).expect("build http client"));
	RepoQuery::new(transport, &config)
}

#[tokio::test]
async fn ok_response_decodes_name() {
	let url = serve_once(200, r#"{"name": "query", "full_name": "TanStack/query"}"#, Duration::ZERO);
	let data = repo_query(url).fetch(&CancelSignal::new()).await.expect("fetch should succeed");

	assert_eq!(data.name, "query");
	assert_eq!(data.full_name.as_deref(), Some("TanStack/query"));
}

#[tokio::test]
async fn not_found_is_request_failed() {
	let url = serve_once(404, r#"{"message": "Not Found"}"#, Duration::ZERO);
	let result = repo_query(url).fetch(&CancelSignal::new()).await;

	assert_eq!(result, Err(FetchError::RequestFailed("Network response was not ok".into())));
}

#[tokio::test]
async fn cancelling_mid_flight_aborts_the_request() {
	let url = serve_once(200, r#"{"name": "query"}"#, Duration::from_secs(5));
	let signal = CancelSignal::new();
	let query = LogCancellation::new(repo_query(url)).with_policy(CancelLogPolicy::Silent);

	let canceller = signal.clone();
	tokio::spawn(async move {
		tokio::time::sleep(Duration::from_millis(100)).await;
		canceller.cancel();
	});

	let result = tokio::time::timeout(Duration::from_secs(2), query.call(signal)).await;
	assert_eq!(result.ok(), Some(Err(FetchError::Cancelled)), "cancellation should not wait for the server");
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
	let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind probe socket");
	let addr = listener.local_addr().expect("probe address");
	drop(listener);

	let result = repo_query(format!("http://{addr}/")).fetch(&CancelSignal::new()).await;
	assert!(matches!(result, Err(FetchError::Transport(_))), "{result:?}");
}
