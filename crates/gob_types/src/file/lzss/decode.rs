//! LZSS decompression

use crate::file::{FileType, GobFileError, error::Result};

use super::Window;
use super::constants::{CHUNK_HEADER_SIZE, LAST_CHUNK, MAX_MATCH, MIN_MATCH, SIZE_PREFIX};

/// State structure for the decompressor
#[derive(Debug)]
struct DecompressorState<'a> {
	input: &'a [u8],
	read_offset: usize,
	/// Offset of `input` inside the enclosing stream, for error reporting
	base_offset: u64,
	window: Window,
	output: Vec<u8>,
	total_size: usize,
	/// Control word, the high byte tracks how many bits are left
	command: u16,
}

impl<'a> DecompressorState<'a> {
	fn new(input: &'a [u8], total_size: usize, base_offset: u64) -> Self {
		Self {
			input,
			read_offset: 0,
			base_offset,
			window: Window::new(),
			// a 2-byte reference expands to at most 18 bytes
			output: Vec::with_capacity(total_size.min(input.len().saturating_mul(9) + MAX_MATCH)),
			total_size,
			command: 0,
		}
	}

	fn read_byte(&mut self) -> Result<u8> {
		let Some(&byte) = self.input.get(self.read_offset) else {
			return Err(GobFileError::corrupt(
				FileType::Lzss,
				self.base_offset + self.read_offset as u64,
				format!(
					"control stream exhausted after {} of {} bytes",
					self.output.len(),
					self.total_size
				),
			));
		};
		self.read_offset += 1;
		Ok(byte)
	}

	/// Returns the next control bit, fetching a new control byte when needed
	fn next_bit(&mut self) -> Result<bool> {
		self.command >>= 1;
		if self.command & 0x0100 == 0 {
			self.command = u16::from(self.read_byte()?) | 0xFF00;
		}
		Ok(self.command & 1 != 0)
	}

	fn emit(&mut self, byte: u8) {
		self.output.push(byte);
		self.window.push(byte);
	}

	fn decompress(mut self) -> Result<(Vec<u8>, usize)> {
		while self.output.len() < self.total_size {
			if self.next_bit()? {
				let byte = self.read_byte()?;
				self.emit(byte);
				continue;
			}

			let low = self.read_byte()?;
			let high = self.read_byte()?;
			let offset = usize::from(low) | (usize::from(high & 0xF0) << 4);
			let length = usize::from(high & 0x0F) + MIN_MATCH;

			for i in 0..length {
				if self.output.len() == self.total_size {
					break;
				}
				let byte = self.window.get(offset + i);
				self.emit(byte);
			}
		}

		Ok((self.output, self.read_offset))
	}
}

/// Decodes one LZSS stream of exactly `size` bytes
///
/// Returns the decoded bytes and the number of input bytes consumed.
pub(crate) fn decompress_block(
	input: &[u8],
	size: usize,
	base_offset: u64,
) -> Result<(Vec<u8>, usize)> {
	DecompressorState::new(input, size, base_offset).decompress()
}

/// Decompresses a bare LZSS stream into exactly `size` bytes
///
/// Fails with `CorruptStream` if the input ends before `size` bytes were produced.
pub fn decompress(input: &[u8], size: usize) -> Result<Vec<u8>> {
	decompress_block(input, size, 0).map(|(data, _)| data)
}

/// Decompresses the single-chunk framing: a `u32` size prefix followed by the stream
pub fn decompress_prefixed(input: &[u8]) -> Result<Vec<u8>> {
	if input.len() < SIZE_PREFIX {
		return Err(GobFileError::insufficient_data(FileType::Lzss, SIZE_PREFIX, input.len()));
	}
	let size = u32::from_le_bytes([input[0], input[1], input[2], input[3]]) as usize;
	decompress_block(&input[SIZE_PREFIX..], size, SIZE_PREFIX as u64).map(|(data, _)| data)
}

/// Decompresses the multi-chunk framing used by legacy `.0OT` members
///
/// When `expected` is given, the sum of all chunk sizes must match it.
pub fn decompress_chunked(input: &[u8], expected: Option<usize>) -> Result<Vec<u8>> {
	let mut output = Vec::with_capacity(expected.unwrap_or_default().min(input.len().saturating_mul(9)));
	let mut pos = 0usize;

	loop {
		let header = input.get(pos..pos + CHUNK_HEADER_SIZE).ok_or_else(|| {
			GobFileError::corrupt(FileType::Lzss, pos as u64, "truncated chunk header")
		})?;
		let chunk_size = u16::from_le_bytes([header[0], header[1]]);
		let real_size = u16::from_le_bytes([header[2], header[3]]);

		if chunk_size < 4 {
			return Err(GobFileError::corrupt(
				FileType::Lzss,
				pos as u64,
				format!("chunk size {chunk_size} is smaller than its header"),
			));
		}

		let body_offset = pos + CHUNK_HEADER_SIZE;
		let (chunk, consumed) =
			decompress_block(&input[body_offset..], usize::from(real_size), body_offset as u64)?;
		log::trace!(
			"LZSS chunk at {pos:#x}: chunk_size={chunk_size:#x} real_size={real_size} consumed={consumed}"
		);
		output.extend_from_slice(&chunk);

		if chunk_size == LAST_CHUNK {
			break;
		}

		// chunk_size excludes its own two bytes
		let next = pos + usize::from(chunk_size) + 2;
		if body_offset + consumed != next {
			return Err(GobFileError::corrupt(
				FileType::Lzss,
				(body_offset + consumed) as u64,
				format!("chunk declared to end at {next:#x}"),
			));
		}
		pos = next;
	}

	if let Some(expected) = expected
		&& output.len() != expected
	{
		return Err(GobFileError::corrupt(
			FileType::Lzss,
			input.len() as u64,
			format!("chunks decoded to {} bytes, expected {expected}", output.len()),
		));
	}

	Ok(output)
}
