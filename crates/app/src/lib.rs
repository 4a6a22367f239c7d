//! Navigation shell for the query cancellation reproduction.
//!
//! The homepage links to a page that fetches repository metadata through the
//! query client. In strict mode every page mount runs mount, unmount, mount,
//! the way development builds double-invoke component lifecycles, so the
//! first request instance is cancelled and superseded by the second.

use qcr_fetch::{FetchError, RepoData};
use qcr_query::QueryClient;
// Used by the binary target only.
use {anyhow as _, clap as _};
// Used by the integration tests only.
#[cfg(test)]
use serde_json as _;

/// Application configuration and its file format.
pub mod config;
/// Subscriber setup for the binary.
pub mod logging;
/// Page lifecycle and route switching.
pub mod navigator;
/// Page views.
pub mod page;
/// Text frames written to the terminal.
pub mod render;
/// Known routes.
pub mod route;

pub use config::{AppConfig, ConfigError};
pub use navigator::{Navigator, QueryFactory};
pub use page::{Frame, Page, ProblemPage, repo_key};
pub use render::Renderer;
pub use route::Route;

/// Query client shared by every page, installed once at the root.
pub type RepoClient = QueryClient<RepoData, FetchError>;

/// Document title shown above every frame.
pub const TITLE: &str = "Query Cancel Repro";
