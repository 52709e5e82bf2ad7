//! `.EXT` resource table support for `gob-rs` project.
//!
//! An `.EXT` file (and the resource section trailing a `.TOT` script) holds
//! sprites and palettes referenced by index.
//!
//! # File Structure
//!
//! | Offset | Size      | Field                                  |
//! |--------|-----------|----------------------------------------|
//! | 0x00   | 2         | item count (signed)                    |
//! | 0x02   | 1         | unknown, kept verbatim                 |
//! | 0x03   | 10 × count| items                                  |
//! | …      | …         | item data                              |
//!
//! Each item:
//!
//! | Size | Field                                                  |
//! |------|--------------------------------------------------------|
//! | 4    | offset relative to the end of the table (signed)       |
//! | 2    | stored size                                            |
//! | 2    | width, bit 15 set if the item is LZSS packed            |
//! | 2    | height                                                 |
//!
//! A negative offset points into a shared `COMMUN.EX*` file, which this
//! module does not resolve.

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::file::lzss;
use crate::file::sprite::Sprite;
use crate::file::{FileType, GobFileError, error::Result};

/// Size of the table header
const HEADER_SIZE: usize = 3;

/// Size of one item record
const ITEM_SIZE: usize = 10;

/// Width bit marking packed items
const PACKED_FLAG: u16 = 0x8000;

/// One record of the resource table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceItem {
	/// Offset of the data after the table, negative for external items
	pub offset: i32,
	/// Stored size
	pub size: u16,
	/// Width in pixels, packed flag removed
	pub width: u16,
	/// Height in pixels
	pub height: u16,
	/// Data is a `u32` size followed by an LZSS stream
	pub packed: bool,
}

impl ResourceItem {
	fn from_bytes(bytes: &[u8]) -> Self {
		let width = u16::from_le_bytes([bytes[6], bytes[7]]);
		Self {
			offset: i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
			size: u16::from_le_bytes([bytes[4], bytes[5]]),
			width: width & !PACKED_FLAG,
			height: u16::from_le_bytes([bytes[8], bytes[9]]),
			packed: width & PACKED_FLAG != 0,
		}
	}

	fn to_bytes(self) -> [u8; ITEM_SIZE] {
		let mut bytes = [0u8; ITEM_SIZE];
		let width = if self.packed {
			self.width | PACKED_FLAG
		} else {
			self.width
		};
		bytes[0..4].copy_from_slice(&self.offset.to_le_bytes());
		bytes[4..6].copy_from_slice(&self.size.to_le_bytes());
		bytes[6..8].copy_from_slice(&width.to_le_bytes());
		bytes[8..10].copy_from_slice(&self.height.to_le_bytes());
		bytes
	}

	/// Returns `true` if the data lives in a shared external file
	pub fn is_external(&self) -> bool {
		self.offset < 0
	}

	/// Returns `true` if the item has sprite dimensions
	pub fn is_sprite(&self) -> bool {
		self.width > 0 && self.height > 0
	}
}

impl Display for ResourceItem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"ResourceItem {{ offset: {}, size: {}, {}x{}{} }}",
			self.offset,
			self.size,
			self.width,
			self.height,
			if self.packed {
				", packed"
			} else {
				""
			}
		)
	}
}

/// A parsed resource table with its data section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTable {
	unknown: u8,
	items: Vec<ResourceItem>,
	data: Vec<u8>,
}

impl ResourceTable {
	/// Parses a resource table
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		if bytes.len() < HEADER_SIZE {
			return Err(GobFileError::insufficient_data(FileType::Ext, HEADER_SIZE, bytes.len()));
		}

		let count = i16::from_le_bytes([bytes[0], bytes[1]]);
		let Ok(count) = usize::try_from(count) else {
			return Err(GobFileError::corrupt(FileType::Ext, 0, format!("negative item count {count}")));
		};

		let table_end = HEADER_SIZE + count * ITEM_SIZE;
		if bytes.len() < table_end {
			return Err(GobFileError::insufficient_data(FileType::Ext, table_end, bytes.len()));
		}

		let items: Vec<ResourceItem> =
			bytes[HEADER_SIZE..table_end].chunks_exact(ITEM_SIZE).map(ResourceItem::from_bytes).collect();
		log::debug!("EXT table with {count} items, {} data bytes", bytes.len() - table_end);

		Ok(Self {
			unknown: bytes[2],
			items,
			data: bytes[table_end..].to_vec(),
		})
	}

	/// Item records in table order
	pub fn items(&self) -> &[ResourceItem] {
		&self.items
	}

	/// Number of items
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns `true` if the table has no items
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	fn item(&self, index: usize) -> Result<ResourceItem> {
		self.items.get(index).copied().ok_or_else(|| GobFileError::MemberNotFound {
			file_type: FileType::Ext,
			name: format!("#{index}"),
		})
	}

	fn data_offset(index: usize, item: ResourceItem) -> Result<usize> {
		if item.is_external() {
			return Err(GobFileError::ExternalResource {
				file_type: FileType::Ext,
				index,
				offset: item.offset,
			});
		}
		Ok(item.offset as usize)
	}

	/// Content of an item, unpacked if needed
	pub fn item_data(&self, index: usize) -> Result<Vec<u8>> {
		let item = self.item(index)?;
		let start = Self::data_offset(index, item)?;
		let base = (HEADER_SIZE + self.items.len() * ITEM_SIZE + start) as u64;

		if item.packed {
			let prefix = self.data.get(start..start + lzss::constants::SIZE_PREFIX).ok_or_else(|| {
				GobFileError::corrupt(FileType::Ext, base, format!("packed item {index} out of bounds"))
			})?;
			let size = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
			let stream = &self.data[start + lzss::constants::SIZE_PREFIX..];
			return Ok(lzss::decompress_block(stream, size, base + 4)?.0);
		}

		self.data
			.get(start..start + usize::from(item.size))
			.map(<[u8]>::to_vec)
			.ok_or_else(|| GobFileError::corrupt(FileType::Ext, base, format!("item {index} out of bounds")))
	}

	/// Decodes an item as a sprite of its recorded dimensions
	pub fn sprite(&self, index: usize) -> Result<Sprite> {
		let item = self.item(index)?;
		Sprite::from_bytes(&self.item_data(index)?, item.width, item.height)
	}

	/// Serializes the table with some item payloads replaced
	///
	/// Items are laid out again in table order. Packed items fail with
	/// `UnsupportedCodec`; external items are kept as is, replacing one fails
	/// with `ExternalResource`.
	pub fn rebuild(&self, replacements: &BTreeMap<usize, Vec<u8>>) -> Result<Vec<u8>> {
		if let Some(&index) = replacements.keys().find(|&&i| i >= self.items.len()) {
			return Err(GobFileError::MemberNotFound {
				file_type: FileType::Ext,
				name: format!("#{index}"),
			});
		}

		let mut items = Vec::with_capacity(self.items.len());
		let mut data = Vec::new();

		for (index, item) in self.items.iter().copied().enumerate() {
			if item.is_external() {
				if replacements.contains_key(&index) {
					return Err(GobFileError::ExternalResource {
						file_type: FileType::Ext,
						index,
						offset: item.offset,
					});
				}
				items.push(item);
				continue;
			}
			if item.packed {
				return Err(GobFileError::UnsupportedCodec {
					file_type: FileType::Ext,
					codec: u32::from(PACKED_FLAG),
				});
			}

			let content = match replacements.get(&index) {
				Some(content) => content.clone(),
				None => self.item_data(index)?,
			};
			let size = u16::try_from(content.len()).map_err(|_| GobFileError::LimitExceeded {
				file_type: FileType::Ext,
				message: format!("item {index} has {} bytes", content.len()),
			})?;
			let offset = i32::try_from(data.len()).map_err(|_| GobFileError::LimitExceeded {
				file_type: FileType::Ext,
				message: "data section exceeds 2 GiB".to_string(),
			})?;

			items.push(ResourceItem {
				offset,
				size,
				..item
			});
			data.extend_from_slice(&content);
		}

		let mut out = Vec::with_capacity(HEADER_SIZE + items.len() * ITEM_SIZE + data.len());
		let count = i16::try_from(items.len()).map_err(|_| GobFileError::LimitExceeded {
			file_type: FileType::Ext,
			message: format!("{} items", items.len()),
		})?;
		out.extend_from_slice(&count.to_le_bytes());
		out.push(self.unknown);
		for item in items {
			out.extend_from_slice(&item.to_bytes());
		}
		out.extend_from_slice(&data);
		Ok(out)
	}
}
