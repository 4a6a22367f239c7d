use std::fmt;

/// The two routes of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
	Home,
	Problem,
}

impl Route {
	pub const fn path(self) -> &'static str {
		match self {
			Self::Home => "/",
			Self::Problem => "/problem-page",
		}
	}

	/// Parses a path, ignoring a trailing slash.
	pub fn parse(path: &str) -> Option<Self> {
		match path.trim_end_matches('/') {
			"" => Some(Self::Home),
			"/problem-page" => Some(Self::Problem),
			_ => None,
		}
	}

	/// Target of the page's single navigation link.
	pub const fn link_target(self) -> Self {
		match self {
			Self::Home => Self::Problem,
			Self::Problem => Self::Home,
		}
	}
}

impl fmt::Display for Route {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.path())
	}
}
