use std::collections::BTreeMap;

use anyhow::Result;
use gob_rs::file::lzss;
use gob_rs::prelude::*;

use crate::v21_container;

const PALETTE: &[u8] = &[10, 20, 30, 40, 50, 60];

/// A 4x2 run-length sprite followed by a raw palette
fn title_ext() -> Vec<u8> {
	let mut ext = 2i16.to_le_bytes().to_vec();
	ext.push(0x5A);
	// sprite: offset 0, 2 bytes, 4x2
	ext.extend_from_slice(&0i32.to_le_bytes());
	ext.extend_from_slice(&2u16.to_le_bytes());
	ext.extend_from_slice(&4u16.to_le_bytes());
	ext.extend_from_slice(&2u16.to_le_bytes());
	// palette: offset 2, 6 bytes, no dimensions
	ext.extend_from_slice(&2i32.to_le_bytes());
	ext.extend_from_slice(&6u16.to_le_bytes());
	ext.extend_from_slice(&[0, 0, 0, 0]);
	// colour 1 x4, colour 2 x4
	ext.extend_from_slice(&[0x1B, 0x2B]);
	ext.extend_from_slice(PALETTE);
	ext
}

#[test_log::test]
fn test_sprite_from_archived_table() -> Result<()> {
	let mut stk = crate::open(v21_container(&[("TITLE.EXT", &title_ext())]));
	let table = ResourceTable::from_bytes(&stk.read("TITLE.EXT")?)?;

	assert_eq!(table.len(), 2);
	assert!(table.items()[0].is_sprite());
	assert!(!table.items()[1].is_sprite());

	let sprite = table.sprite(0)?;
	assert_eq!((sprite.width(), sprite.height()), (4, 2));
	assert_eq!(sprite.pixels(), &[1, 1, 1, 1, 2, 2, 2, 2]);
	assert_eq!(table.item_data(1)?, PALETTE);
	Ok(())
}

#[test_log::test]
fn test_replace_sprite_inside_archive() -> Result<()> {
	let mut stk = crate::open(v21_container(&[("TITLE.EXT", &title_ext()), ("TITLE.TOT", b"script")]));
	let table = ResourceTable::from_bytes(&stk.read("TITLE.EXT")?)?;

	// full palette indices need the LZSS form
	let replacement = Sprite::new(4, 2, vec![0, 16, 32, 48, 64, 80, 96, 255])?;
	let mut items = BTreeMap::new();
	items.insert(0, replacement.to_bytes(SpriteEncoding::Lzss)?);

	let mut replacements = Replacements::new();
	replacements.insert("TITLE.EXT".to_string(), table.rebuild(&items)?);
	let rebuilt = stk.rebuild(&replacements, &RebuildOptions::default())?;

	let mut reopened = crate::open(rebuilt);
	assert_eq!(reopened.list(), vec!["TITLE.EXT", "TITLE.TOT"]);
	assert_eq!(reopened.read("TITLE.TOT")?, b"script");

	let table = ResourceTable::from_bytes(&reopened.read("TITLE.EXT")?)?;
	assert_eq!(table.sprite(0)?, replacement);
	assert_eq!(table.item_data(1)?, PALETTE);
	Ok(())
}

#[test_log::test]
fn test_rle_rejects_wide_palette() {
	let sprite = Sprite::new(2, 1, vec![3, 200]).unwrap();
	assert!(matches!(
		sprite.to_bytes(SpriteEncoding::RunLength),
		Err(GobFileError::InvalidPixel {
			index: 1,
			value: 200
		})
	));
}

#[test_log::test]
fn test_lzss_codec_from_facade() -> Result<()> {
	let text = b"the quick brown fox jumps over the lazy dog, the quick brown fox".repeat(16);
	let packed = lzss::compress(&text)?;
	assert!(packed.len() < text.len());
	assert_eq!(&packed[..4], &(text.len() as u32).to_le_bytes());
	assert_eq!(lzss::decompress_prefixed(&packed)?, text);
	assert_eq!(lzss::decompress(&packed[4..], text.len())?, text);
	Ok(())
}
