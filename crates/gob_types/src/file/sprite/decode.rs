//! Sprite decoding

use crate::file::lzss;
use crate::file::{FileType, GobFileError, error::Result};

use super::Encoding;
use super::constants::{LZSS_CODEC, LZSS_HEADER_SIZE, LZSS_MARKER, MAX_SHORT_RUN};

/// Decodes a stored sprite blob of `width * height` pixels, detecting its encoding
pub fn decode(blob: &[u8], width: u16, height: u16) -> Result<Vec<u8>> {
	let pixel_count = usize::from(width) * usize::from(height);
	match Encoding::detect(blob) {
		Encoding::Lzss => decode_lzss(blob, pixel_count),
		Encoding::RunLength => decode_run_length(blob, pixel_count),
	}
}

/// Decodes an LZSS-wrapped sprite, marker included
pub fn decode_lzss(blob: &[u8], pixel_count: usize) -> Result<Vec<u8>> {
	if blob.len() < LZSS_HEADER_SIZE {
		return Err(GobFileError::insufficient_data(FileType::Sprite, LZSS_HEADER_SIZE, blob.len()));
	}
	if !blob.starts_with(&LZSS_MARKER) {
		return Err(GobFileError::corrupt(FileType::Sprite, 0, "missing LZSS marker"));
	}

	let codec = blob[2];
	if codec != LZSS_CODEC {
		return Err(GobFileError::UnsupportedCodec {
			file_type: FileType::Sprite,
			codec: u32::from(codec),
		});
	}

	let size = u32::from_le_bytes([blob[3], blob[4], blob[5], blob[6]]) as usize;
	if size != pixel_count {
		return Err(GobFileError::corrupt(
			FileType::Sprite,
			3,
			format!("declares {size} pixels, sprite has {pixel_count}"),
		));
	}

	let (pixels, consumed) =
		lzss::decompress_block(&blob[LZSS_HEADER_SIZE..], size, LZSS_HEADER_SIZE as u64)?;
	let trailing = blob.len() - LZSS_HEADER_SIZE - consumed;
	if trailing > 0 {
		log::warn!("LZSS sprite has {trailing} trailing bytes");
	}

	Ok(pixels)
}

/// Decodes a run-length sprite of exactly `pixel_count` pixels
///
/// Fails with `CorruptStream` if the tokens end early, overshoot the pixel
/// count, or a 2-byte token carries a run a 1-byte token could hold.
pub fn decode_run_length(data: &[u8], pixel_count: usize) -> Result<Vec<u8>> {
	let mut pixels = Vec::with_capacity(pixel_count);
	let mut pos = 0usize;

	while pixels.len() < pixel_count {
		let Some(&token) = data.get(pos) else {
			return Err(GobFileError::corrupt(
				FileType::Sprite,
				pos as u64,
				format!("tokens end after {} of {pixel_count} pixels", pixels.len()),
			));
		};

		let color = token >> 4;
		let low = usize::from(token & 0x07);
		let repeat = if token & 0x08 != 0 {
			pos += 1;
			low + 1
		} else {
			let Some(&next) = data.get(pos + 1) else {
				return Err(GobFileError::corrupt(
					FileType::Sprite,
					pos as u64 + 1,
					"2-byte token cut short",
				));
			};
			let repeat = ((low << 8) | usize::from(next)) + 1;
			if repeat <= MAX_SHORT_RUN {
				return Err(GobFileError::corrupt(
					FileType::Sprite,
					pos as u64,
					format!("2-byte token for a run of {repeat}"),
				));
			}
			pos += 2;
			repeat
		};

		if pixels.len() + repeat > pixel_count {
			return Err(GobFileError::corrupt(
				FileType::Sprite,
				pos as u64,
				format!("run of {repeat} overshoots {pixel_count} pixels"),
			));
		}
		pixels.resize(pixels.len() + repeat, color);
	}

	if pos < data.len() {
		log::warn!("RLE sprite has {} trailing bytes", data.len() - pos);
	}

	Ok(pixels)
}
