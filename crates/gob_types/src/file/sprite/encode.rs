//! Sprite encoding
//!
//! Both encoders decode their own output again in debug builds and fail with
//! `EncoderInvariantViolation` if it does not reproduce the input.

use crate::file::lzss;
use crate::file::{FileType, GobFileError, error::Result};

use super::constants::{LZSS_CODEC, LZSS_MARKER, MAX_LONG_RUN, MAX_RLE_COLOR, MAX_SHORT_RUN};
use super::decode::{decode_lzss, decode_run_length};

/// Appends the tokens of one run of at most 2048 pixels
fn push_run(out: &mut Vec<u8>, color: u8, run: usize) {
	let repeat = run - 1;
	if run <= MAX_SHORT_RUN {
		out.push((color << 4) | 0x08 | repeat as u8);
	} else {
		out.push((color << 4) | ((repeat >> 8) & 0x07) as u8);
		out.push((repeat & 0xFF) as u8);
	}
}

fn check(pixels: &[u8], decoded: Result<Vec<u8>>) -> Result<()> {
	let decoded = decoded.map_err(|e| GobFileError::EncoderInvariantViolation {
		file_type: FileType::Sprite,
		message: format!("output does not decode: {e}"),
	})?;
	if decoded != pixels {
		return Err(GobFileError::EncoderInvariantViolation {
			file_type: FileType::Sprite,
			message: "round trip does not reproduce the raster".to_string(),
		});
	}
	Ok(())
}

/// Run-length encodes palette indices 0..=15
///
/// Runs longer than 2048 pixels are split. Fails with `InvalidPixel` for
/// larger indices.
pub fn encode_run_length(pixels: &[u8]) -> Result<Vec<u8>> {
	if let Some((index, &value)) = pixels.iter().enumerate().find(|(_, v)| **v > MAX_RLE_COLOR) {
		return Err(GobFileError::InvalidPixel {
			index,
			value,
		});
	}

	let mut out = Vec::new();
	let mut start = 0usize;
	while start < pixels.len() {
		let color = pixels[start];
		let mut run = pixels[start..].iter().take_while(|&&p| p == color).count();
		start += run;

		while run > 0 {
			let mut take = run.min(MAX_LONG_RUN);
			// a leading run of 259 black pixels would encode as the LZSS marker
			if out.is_empty() && color == 0 && take == 0x103 {
				take -= 1;
			}
			push_run(&mut out, color, take);
			run -= take;
		}
	}

	if cfg!(debug_assertions) {
		check(pixels, decode_run_length(&out, pixels.len()))?;
	}
	Ok(out)
}

/// Encodes palette indices into the LZSS-wrapped form, marker included
pub fn encode_lzss(pixels: &[u8]) -> Result<Vec<u8>> {
	let mut out = LZSS_MARKER.to_vec();
	out.push(LZSS_CODEC);
	// the packed form leads with the u32 size
	out.extend(lzss::compress(pixels)?);

	if cfg!(debug_assertions) {
		check(pixels, decode_lzss(&out, pixels.len()))?;
	}
	Ok(out)
}
