//! LZSS compression
//!
//! ## Strategy
//!
//! Greedy longest match: at every position the whole ring is searched for the
//! longest reference of 3 to 18 bytes. A literal is emitted when no reference
//! of at least 3 bytes exists or fewer than 3 input bytes remain.
//!
//! The encoder keeps a ring seeded exactly like the decoder's. Candidate
//! matches are measured by replaying the decoder's byte-by-byte copy, so a
//! reference that overlaps the bytes it produces is only chosen when the
//! decoder would reproduce the input from it.

use crate::file::{FileType, GobFileError, error::Result};

use super::Window;
use super::constants::{MAX_MATCH, MIN_MATCH, WINDOW_SIZE};
use super::decode::decompress_prefixed;

/// State structure for the compressor
#[derive(Debug)]
struct CompressorState<'a> {
	data: &'a [u8],
	read_position: usize,
	window: Window,
	output: Vec<u8>,
	/// Tokens of the group currently being assembled
	group: Vec<u8>,
	control: u8,
	tokens: u32,
}

impl<'a> CompressorState<'a> {
	fn new(data: &'a [u8], size: u32) -> Self {
		let mut output = Vec::with_capacity(data.len() / 2 + 8);
		output.extend_from_slice(&size.to_le_bytes());

		Self {
			data,
			read_position: 0,
			window: Window::new(),
			output,
			group: Vec::with_capacity(16),
			control: 0,
			tokens: 0,
		}
	}

	/// Length of the match the decoder would produce from ring `position`
	fn match_length(&self, position: usize, max_length: usize) -> usize {
		let head = self.window.head();
		let mut length = 0;

		while length < max_length {
			let source = (position + length) % WINDOW_SIZE;
			// Distance from the write head: below `length` means the byte is
			// one this very reference has already produced
			let produced = (source + WINDOW_SIZE - head) % WINDOW_SIZE;
			let byte = if produced < length {
				self.data[self.read_position + produced]
			} else {
				self.window.get(source)
			};

			if byte != self.data[self.read_position + length] {
				break;
			}
			length += 1;
		}

		length
	}

	/// Finds the longest usable reference at the current position
	///
	/// Returns `(offset, length)`; candidates are scanned from the most recently
	/// written ring byte backwards, and the first longest one wins.
	fn find_best_match(&self) -> Option<(usize, usize)> {
		let remaining = self.data.len() - self.read_position;
		let max_length = remaining.min(MAX_MATCH);
		if max_length < MIN_MATCH {
			return None;
		}

		let first = self.data[self.read_position];
		let head = self.window.head();
		let mut best: Option<(usize, usize)> = None;

		for distance in 1..=WINDOW_SIZE {
			let position = (head + WINDOW_SIZE - distance) % WINDOW_SIZE;
			if self.window.get(position) != first {
				continue;
			}

			let length = self.match_length(position, max_length);
			if length >= MIN_MATCH && best.is_none_or(|(_, best_length)| length > best_length) {
				best = Some((position, length));
				if length == max_length {
					break;
				}
			}
		}

		best
	}

	fn push_token(&mut self) {
		self.tokens += 1;
		if self.tokens == 8 {
			self.flush_group();
		}
	}

	fn flush_group(&mut self) {
		if self.tokens == 0 {
			return;
		}
		self.output.push(self.control);
		self.output.append(&mut self.group);
		self.control = 0;
		self.tokens = 0;
	}

	fn encode_literal(&mut self) {
		let byte = self.data[self.read_position];
		self.control |= 1 << self.tokens;
		self.group.push(byte);
		self.window.push(byte);
		self.read_position += 1;
		self.push_token();
	}

	fn encode_reference(&mut self, offset: usize, length: usize) {
		self.group.push((offset & 0xFF) as u8);
		self.group.push((((offset >> 4) & 0xF0) | (length - MIN_MATCH)) as u8);

		for i in 0..length {
			self.window.push(self.data[self.read_position + i]);
		}
		self.read_position += length;
		self.push_token();
	}

	fn compress(mut self) -> Vec<u8> {
		let mut references = 0usize;

		while self.read_position < self.data.len() {
			if let Some((offset, length)) = self.find_best_match() {
				self.encode_reference(offset, length);
				references += 1;
			} else {
				self.encode_literal();
			}
		}
		self.flush_group();

		log::trace!(
			"LZSS packed {} bytes into {} ({references} references)",
			self.data.len(),
			self.output.len()
		);
		self.output
	}
}

/// Size prefix of the single-chunk framing
fn size_prefix(len: usize) -> Result<u32> {
	u32::try_from(len).map_err(|_| GobFileError::LimitExceeded {
		file_type: FileType::Lzss,
		message: format!("{len} bytes do not fit the 32-bit size prefix"),
	})
}

/// Checks that `packed` decodes back to `data`
fn verify(data: &[u8], packed: &[u8]) -> Result<()> {
	let unpacked = decompress_prefixed(packed).map_err(|e| {
		GobFileError::EncoderInvariantViolation {
			file_type: FileType::Lzss,
			message: format!("output does not decode: {e}"),
		}
	})?;

	if unpacked != data {
		let position = unpacked.iter().zip(data).position(|(a, b)| a != b).unwrap_or(data.len());
		return Err(GobFileError::EncoderInvariantViolation {
			file_type: FileType::Lzss,
			message: format!("round trip diverges at byte {position}"),
		});
	}

	Ok(())
}

/// Compresses `data` into the single-chunk framing (`u32` size prefix + stream)
///
/// Debug builds decode the output again and fail with
/// `EncoderInvariantViolation` if it does not reproduce `data`.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
	compress_with(data, cfg!(debug_assertions))
}

/// Compresses `data`, optionally verifying the round trip regardless of build profile
pub fn compress_with(data: &[u8], verify_output: bool) -> Result<Vec<u8>> {
	let packed = CompressorState::new(data, size_prefix(data.len())?).compress();
	if verify_output {
		verify(data, &packed)?;
	}
	Ok(packed)
}
