//! Sprite pixel codecs for `gob-rs` project.
//!
//! Sprites are flat `width * height` rasters of palette indices. The stored
//! blob uses one of two encodings, selected by its first two bytes.
//!
//! ## LZSS-wrapped
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0x00   | 2    | marker `0x01 0x02`                     |
//! | 0x02   | 1    | codec id, always `1`                   |
//! | 0x03   | 4    | uncompressed size, `width * height`    |
//! | 0x07   | …    | LZSS stream                            |
//!
//! ## Run-length
//!
//! A sequence of tokens. The high nibble of the first token byte is the
//! palette index (0..=15) to repeat:
//!
//! ```text
//! 1-byte token: cccc 1rrr             repeat = rrr + 1            (1..=8)
//! 2-byte token: cccc 0hhh llllllll    repeat = (hhh << 8 | l) + 1 (9..=2048)
//! ```

mod decode;
mod encode;

pub use decode::{decode, decode_lzss, decode_run_length};
pub use encode::{encode_lzss, encode_run_length};

use std::fmt::Display;

use crate::file::{FileType, GobFileError, error::Result};

/// Constants of the sprite codecs
pub mod constants {
	/// Leading bytes of LZSS-wrapped sprites
	pub const LZSS_MARKER: [u8; 2] = [0x01, 0x02];

	/// Only codec id known to follow the marker
	pub const LZSS_CODEC: u8 = 1;

	/// Marker, codec id and size prefix
	pub const LZSS_HEADER_SIZE: usize = 7;

	/// Longest run of a 1-byte token
	pub const MAX_SHORT_RUN: usize = 8;

	/// Longest run of a 2-byte token
	pub const MAX_LONG_RUN: usize = 2048;

	/// Largest palette index a run-length token can carry
	pub const MAX_RLE_COLOR: u8 = 0x0F;
}

/// Stored sprite encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
	/// Nibble run-length tokens, 16 colours
	RunLength,
	/// LZSS stream behind the `0x01 0x02` marker, 256 colours
	Lzss,
}

impl Encoding {
	/// Detects the encoding of a stored blob from its first two bytes
	pub fn detect(blob: &[u8]) -> Self {
		if blob.starts_with(&constants::LZSS_MARKER) {
			Self::Lzss
		} else {
			Self::RunLength
		}
	}
}

impl Display for Encoding {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Encoding::RunLength => write!(f, "RLE"),
			Encoding::Lzss => write!(f, "LZSS"),
		}
	}
}

/// A decoded sprite
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sprite {
	width: u16,
	height: u16,
	pixels: Vec<u8>,
}

impl Sprite {
	/// Creates a sprite, `pixels` must hold exactly `width * height` indices
	pub fn new(width: u16, height: u16, pixels: Vec<u8>) -> Result<Self> {
		let expected = usize::from(width) * usize::from(height);
		if pixels.len() != expected {
			return Err(GobFileError::insufficient_data(FileType::Sprite, expected, pixels.len()));
		}
		Ok(Self {
			width,
			height,
			pixels,
		})
	}

	/// Decodes a stored blob, detecting its encoding
	pub fn from_bytes(blob: &[u8], width: u16, height: u16) -> Result<Self> {
		let pixels = decode(blob, width, height)?;
		Ok(Self {
			width,
			height,
			pixels,
		})
	}

	/// Encodes the sprite with the given encoding
	///
	/// Run-length encoding fails with `InvalidPixel` for indices above 15.
	pub fn to_bytes(&self, encoding: Encoding) -> Result<Vec<u8>> {
		match encoding {
			Encoding::RunLength => encode_run_length(&self.pixels),
			Encoding::Lzss => encode_lzss(&self.pixels),
		}
	}

	/// Width in pixels
	pub fn width(&self) -> u16 {
		self.width
	}

	/// Height in pixels
	pub fn height(&self) -> u16 {
		self.height
	}

	/// Palette indices, row by row
	pub fn pixels(&self) -> &[u8] {
		&self.pixels
	}

	/// Palette index at `(x, y)`
	pub fn pixel(&self, x: u16, y: u16) -> Option<u8> {
		if x >= self.width || y >= self.height {
			return None;
		}
		self.pixels.get(usize::from(y) * usize::from(self.width) + usize::from(x)).copied()
	}

	/// Consumes the sprite, returning its palette indices
	pub fn into_pixels(self) -> Vec<u8> {
		self.pixels
	}
}
