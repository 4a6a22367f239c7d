use std::fmt;

use qcr_fetch::{FetchError, RepoData};
use qcr_query::{QueryFn, QueryKey, QueryObserver, QueryOutcome};

use crate::route::Route;
use crate::{RepoClient, TITLE};

/// Descriptor of the problem page's request.
pub fn repo_key() -> QueryKey {
	QueryKey::from("repoData")
}

/// One rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
	pub route: Route,
	pub lines: Vec<String>,
}

impl Frame {
	/// Returns true if any line contains `needle`.
	pub fn contains(&self, needle: &str) -> bool {
		self.lines.iter().any(|line| line.contains(needle))
	}
}

impl fmt::Display for Frame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "== {TITLE} ({}) ==", self.route)?;
		for line in &self.lines {
			writeln!(f, "{line}")?;
		}
		Ok(())
	}
}

fn link(label: &str, target: Route) -> String {
	format!("[{label}]({target})")
}

/// The page mounted at the current route.
pub enum Page {
	Home,
	Problem(ProblemPage),
}

impl Page {
	pub fn route(&self) -> Route {
		match self {
			Self::Home => Route::Home,
			Self::Problem(_) => Route::Problem,
		}
	}

	pub fn view(&mut self) -> Frame {
		match self {
			Self::Home => home_view(),
			Self::Problem(page) => page.view(),
		}
	}
}

fn home_view() -> Frame {
	Frame {
		route: Route::Home,
		lines: vec![
			"# Homepage".to_string(),
			"Following the link below opens a page that queries repository data.".to_string(),
			"With strict mode on, the page mounts twice and the first request is cancelled.".to_string(),
			link("Go to Problem Page", Route::Problem),
		],
	}
}

/// Page subscribed to the repository query.
pub struct ProblemPage {
	observer: QueryObserver<RepoData, FetchError>,
}

impl ProblemPage {
	/// Mounts the page, attaching to or starting the request instance.
	pub fn mount<Q>(client: &RepoClient, query: Q) -> Self
	where
		Q: QueryFn<Output = RepoData, Error = FetchError>,
	{
		Self {
			observer: client.observe(repo_key(), query),
		}
	}

	/// Generation of the request instance this mount observes.
	pub fn generation(&self) -> u64 {
		self.observer.generation()
	}

	pub fn view(&mut self) -> Frame {
		let mut lines = vec![link("<- Go Back Home", Route::Home), "# Problem Page".to_string()];
		lines.extend(outcome_lines(&self.observer.outcome()));
		Frame {
			route: Route::Problem,
			lines,
		}
	}

	/// Waits for the next outcome transition and returns the new view, or
	/// `None` once the instance has settled for good.
	pub async fn next_view(&mut self) -> Option<Frame> {
		self.observer.changed().await?;
		Some(self.view())
	}
}

/// Lines for exactly one of the three outcome states.
pub fn outcome_lines(outcome: &QueryOutcome<RepoData, FetchError>) -> Vec<String> {
	match outcome {
		QueryOutcome::Pending => vec!["Loading...".to_string()],
		QueryOutcome::Error(err) => vec![format!("Error: {err}")],
		QueryOutcome::Success(data) => {
			let mut lines = vec!["Data loaded successfully!".to_string(), format!("Repo Name: {}", data.name)];
			if let Some(description) = &data.description {
				lines.push(format!("Description: {description}"));
			}
			if let Some(stars) = data.stargazers_count {
				lines.push(format!("Stars: {stars}"));
			}
			lines
		}
	}
}
