//! Bounded stream views.
//!
//! Archive members are read through a [`PartialView`], which restricts an
//! underlying `Read + Seek` source to a `[start, start + size)` window. Reads
//! never cross the end of the window and positions are reported relative to
//! its start, so a member can be handed out as if it were a file of its own.

use std::io::{self, Read, Seek, SeekFrom};

/// A seekable, read-only window over a sub-range of another stream
#[derive(Debug)]
pub struct PartialView<R> {
	inner: R,
	start: u64,
	size: u64,
	pos: u64,
}

impl<R: Seek> PartialView<R> {
	/// Creates a view of `size` bytes starting at the current position of `inner`
	pub fn new(mut inner: R, size: u64) -> io::Result<Self> {
		let start = inner.stream_position()?;
		Ok(Self {
			inner,
			start,
			size,
			pos: 0,
		})
	}

	/// Creates a view of `size` bytes starting at absolute offset `start` of `inner`
	pub fn with_range(inner: R, start: u64, size: u64) -> Self {
		Self {
			inner,
			start,
			size,
			pos: 0,
		}
	}
}

impl<R> PartialView<R> {
	/// Absolute offset of the window inside the underlying stream
	pub fn start(&self) -> u64 {
		self.start
	}

	/// Size of the window in bytes
	pub fn len(&self) -> u64 {
		self.size
	}

	/// Returns `true` if the window is empty
	pub fn is_empty(&self) -> bool {
		self.size == 0
	}

	/// Current position relative to the window start
	pub fn position(&self) -> u64 {
		self.pos
	}

	/// Number of bytes left before the end of the window
	pub fn remaining(&self) -> u64 {
		self.size.saturating_sub(self.pos)
	}

	/// Returns a reference to the underlying stream
	pub fn get_ref(&self) -> &R {
		&self.inner
	}

	/// Consumes the view, returning the underlying stream
	pub fn into_inner(self) -> R {
		self.inner
	}
}

impl<R: Read + Seek> Read for PartialView<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let remaining = self.remaining();
		if remaining == 0 || buf.is_empty() {
			return Ok(0);
		}

		// The underlying stream may be shared, so always reposition before reading
		self.inner.seek(SeekFrom::Start(self.start + self.pos))?;

		let limit = usize::try_from(remaining).unwrap_or(usize::MAX).min(buf.len());
		let read = self.inner.read(&mut buf[..limit])?;
		self.pos += read as u64;
		Ok(read)
	}
}

impl<R: Seek> Seek for PartialView<R> {
	fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
		let target = match pos {
			SeekFrom::Start(offset) => Some(offset),
			SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
			SeekFrom::End(delta) => self.size.checked_add_signed(delta),
		};

		let Some(target) = target else {
			return Err(io::Error::new(
				io::ErrorKind::InvalidInput,
				"invalid seek to a negative or overflowing position",
			));
		};

		self.pos = target;
		Ok(self.pos)
	}

	fn stream_position(&mut self) -> io::Result<u64> {
		Ok(self.pos)
	}
}
