//! LZSS codec used by `.STK` archives and sprite resources.
//!
//! ## Overview
//!
//! The engine stores most compressed data with a classic LZSS scheme built
//! around a 4096-byte ring buffer. The first 4078 bytes of the ring start out
//! as spaces (`0x20`), the trailing 18 bytes start out as zeros, and the write
//! head starts at 4078.
//!
//! ## Stream Layout
//!
//! The stream is a sequence of groups. Each group starts with one control
//! byte whose bits are consumed least-significant first, one bit per token:
//!
//! | Bit | Token     | Bytes | Meaning                                        |
//! |-----|-----------|-------|------------------------------------------------|
//! | 1   | literal   | 1     | copy the byte to the output and the ring       |
//! | 0   | reference | 2     | copy `length` bytes from ring offset `offset`  |
//!
//! A reference is decoded as:
//!
//! ```text
//! offset = byte0 | ((byte1 & 0xF0) << 4)     // 0..=4095
//! length = (byte1 & 0x0F) + 3                // 3..=18
//! ```
//!
//! The ring is updated while a reference is being copied, so a reference can
//! read bytes it is producing (run-length behaviour).
//!
//! ## Framings
//!
//! - **Single chunk**: `u32` little-endian uncompressed size, then one stream.
//! - **Multi chunk**: repeated `(u16 chunk_size, u16 real_size, u16 reserved)`
//!   headers, each followed by a stream of `real_size` decoded bytes with a
//!   fresh ring. `chunk_size` counts the last four header bytes plus the
//!   stream. The chunk whose `chunk_size` is `0xFFFF` is the last one.

mod decode;
mod encode;

pub use decode::{decompress, decompress_chunked, decompress_prefixed};
pub use encode::{compress, compress_with};

pub(crate) use decode::decompress_block;

/// Constants of the LZSS scheme
pub mod constants {
	/// Size of the ring buffer
	pub const WINDOW_SIZE: usize = 4096;

	/// Number of ring bytes seeded with spaces, also the initial write head
	pub const WINDOW_FILL: usize = WINDOW_SIZE - MAX_MATCH;

	/// Byte the ring is seeded with
	pub const FILL_BYTE: u8 = 0x20;

	/// Shortest back-reference
	pub const MIN_MATCH: usize = 3;

	/// Longest back-reference
	pub const MAX_MATCH: usize = 18;

	/// Size of the uncompressed size prefix of the single-chunk framing
	pub const SIZE_PREFIX: usize = 4;

	/// Size of a multi-chunk header
	pub const CHUNK_HEADER_SIZE: usize = 6;

	/// `chunk_size` value marking the last chunk
	pub const LAST_CHUNK: u16 = 0xFFFF;
}

use constants::{FILL_BYTE, WINDOW_FILL, WINDOW_SIZE};

/// Ring buffer shared by the decoder and the encoder
#[derive(Debug, Clone)]
pub(crate) struct Window {
	buffer: [u8; WINDOW_SIZE],
	head: usize,
}

impl Window {
	pub(crate) fn new() -> Self {
		let mut buffer = [0u8; WINDOW_SIZE];
		buffer[..WINDOW_FILL].fill(FILL_BYTE);
		Self {
			buffer,
			head: WINDOW_FILL,
		}
	}

	#[inline(always)]
	pub(crate) fn get(&self, position: usize) -> u8 {
		self.buffer[position % WINDOW_SIZE]
	}

	#[inline(always)]
	pub(crate) fn push(&mut self, byte: u8) {
		self.buffer[self.head] = byte;
		self.head = (self.head + 1) % WINDOW_SIZE;
	}

	#[inline(always)]
	pub(crate) fn head(&self) -> usize {
		self.head
	}
}
