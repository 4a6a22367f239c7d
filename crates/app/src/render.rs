use std::io::{self, Write};

use crate::page::Frame;

/// Writes frames, skipping a frame identical to the previous one.
pub struct Renderer<W> {
	out: W,
	last: Option<Frame>,
}

impl<W: Write> Renderer<W> {
	pub fn new(out: W) -> Self {
		Self { out, last: None }
	}

	/// Writes `frame` unless it repeats the last one. Returns whether it was
	/// written.
	pub fn render(&mut self, frame: &Frame) -> io::Result<bool> {
		if self.last.as_ref() == Some(frame) {
			return Ok(false);
		}
		writeln!(self.out, "{frame}")?;
		self.out.flush()?;
		self.last = Some(frame.clone());
		Ok(true)
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}
