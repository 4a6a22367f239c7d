use std::fmt;

/// Opaque descriptor identifying one logical request.
///
/// Two keys built from the same parts compare equal, so a page that rebuilds
/// its key on every render still dedupes against the live instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
	parts: Vec<String>,
}

impl QueryKey {
	/// Builds a key from its ordered parts.
	pub fn new<I, S>(parts: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			parts: parts.into_iter().map(Into::into).collect(),
		}
	}
}

impl From<&str> for QueryKey {
	fn from(part: &str) -> Self {
		Self::new([part])
	}
}

impl fmt::Display for QueryKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("[")?;
		for (idx, part) in self.parts.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}
			write!(f, "{part:?}")?;
		}
		f.write_str("]")
	}
}
