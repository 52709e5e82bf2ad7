//! Benchmark helper utilities for gob-rs
//!
//! This module provides synthetic test data generators for the codec and
//! archive benchmarks. All generators are seeded, so every run measures the
//! same input.

use gob_types::file::lzss;
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Generates script-like text with the repetition typical of `.TOT` members
pub fn generate_script(len: usize) -> Vec<u8> {
	const WORDS: [&str; 8] = ["show", "wait", "fade", "goto", "title", "scene", "call", "load"];

	let mut rng = SmallRng::seed_from_u64(0x5C41);
	let mut text = Vec::with_capacity(len + 16);
	while text.len() < len {
		let word = WORDS[rng.random_range(0..WORDS.len())];
		text.extend_from_slice(word.as_bytes());
		text.push(b' ');
		text.extend_from_slice(rng.random_range(0..100u8).to_string().as_bytes());
		text.extend_from_slice(b";\n");
	}
	text.truncate(len);
	text
}

/// Generates a raster of horizontal runs with indices below `colors`
///
/// Run lengths vary between 1 and `max_run`, which keeps both token kinds of
/// the run-length encoder busy.
pub fn generate_sprite_pixels(width: u16, height: u16, colors: u8, max_run: usize) -> Vec<u8> {
	let total = usize::from(width) * usize::from(height);
	let mut rng = SmallRng::seed_from_u64((u64::from(width) << 16) | u64::from(height));
	let mut pixels = Vec::with_capacity(total);
	while pixels.len() < total {
		let color = rng.random_range(0..colors.max(1));
		let run = rng.random_range(1..=max_run.max(1));
		pixels.extend(std::iter::repeat_n(color, run));
	}
	pixels.truncate(total);
	pixels
}

/// Generates a V1 archive of `count` LZSS-compressed script members
pub fn generate_v1_archive(count: usize, member_size: usize) -> Vec<u8> {
	let table_size = 2 + 22 * count;
	let mut out = (count as u16).to_le_bytes().to_vec();
	let mut data = Vec::new();

	for i in 0..count {
		let payload = lzss::compress(&generate_script(member_size + i)).unwrap_or_default();

		let mut name = [0u8; 13];
		let text = format!("SCENE{i:03}.TOT");
		name[..text.len()].copy_from_slice(text.as_bytes());
		out.extend_from_slice(&name);
		out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
		out.extend_from_slice(&((table_size + data.len()) as u32).to_le_bytes());
		out.push(1);

		data.extend_from_slice(&payload);
		if payload.len() % 2 == 1 {
			data.push(0);
		}
	}

	out.extend(data);
	out
}

/// Common benchmark sizes for synthetic test data
pub mod sizes {
	/// Small sprite: 32x32 (1,024 pixels)
	pub const SMALL_SPRITE: (u16, u16) = (32, 32);
	/// Full screen: 320x200 (64,000 pixels), the engine's VGA mode
	pub const SCREEN: (u16, u16) = (320, 200);
	/// Typical script member: 16 KiB
	pub const SCRIPT: usize = 16 * 1024;
	/// Large member: 256 KiB
	pub const LARGE_MEMBER: usize = 256 * 1024;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generate_script() {
		let text = generate_script(1000);
		assert_eq!(text.len(), 1000);
		assert_eq!(text, generate_script(1000));
	}

	#[test]
	fn test_generate_sprite_pixels() {
		let pixels = generate_sprite_pixels(40, 10, 16, 30);
		assert_eq!(pixels.len(), 400);
		assert!(pixels.iter().all(|&p| p < 16));
	}

	#[test]
	fn test_generate_v1_archive() {
		let data = generate_v1_archive(3, 100);
		assert_eq!(u16::from_le_bytes([data[0], data[1]]), 3);
		assert_eq!(&data[2..14], b"SCENE000.TOT");
		assert_eq!(data[2 + 21], 1);
	}
}
