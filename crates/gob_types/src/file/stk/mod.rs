//! `.STK` archive support for `gob-rs` project.
//!
//! STK containers (also shipped as `.ITK`, `.LTK` and `.JTK`) bundle every
//! resource of a game: scripts (`.TOT`), resource tables (`.EXT`), sounds,
//! fonts and so on. Two layouts exist.
//!
//! # V1 layout
//!
//! | Offset | Size       | Field                                         |
//! |--------|------------|-----------------------------------------------|
//! | 0x00   | 2          | member count                                  |
//! | 0x02   | 22 × count | records: `13s name`, `u32 size`, `u32 offset`, `u8 compressed` |
//! | …      | …          | payloads, odd-sized ones followed by one `0x00` |
//!
//! Offsets are absolute. Names ending in `.0OT` mark members stored in the
//! multi-chunk LZSS framing; they are exposed under a `.TOT` name.
//!
//! # V2.1 layout
//!
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0x00   | 6    | magic `"STK2.1"`                        |
//! | 0x06   | 14   | creation date, `ddMMyyyyHHmmss`         |
//! | 0x14   | 8    | creator tag                             |
//! | 0x1C   | 4    | offset of the file name table           |
//! | 0x20   | …    | payloads                                |
//!
//! The file name table starts with `u32 count` and `u32 misc_offset`. Each
//! member owns a 61-byte record at `misc_offset + index * 61`:
//!
//! | Size | Field                                   |
//! |------|-----------------------------------------|
//! | 4    | offset of the NUL-terminated name       |
//! | 14   | modification date                       |
//! | 14   | creation date                           |
//! | 8    | creator tag                             |
//! | 4    | stored size                             |
//! | 4    | uncompressed size                       |
//! | 5    | reserved                                |
//! | 4    | payload offset                          |
//! | 4    | compression code                        |
//!
//! # Examples
//!
//! ```no_run
//! use std::collections::BTreeMap;
//!
//! use gob_types::file::stk::{File, RebuildOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut stk = File::open("INTRO.STK")?;
//!
//! for name in stk.list() {
//!     println!("{name}");
//! }
//!
//! let script = stk.read("INTRO.TOT")?;
//!
//! let mut replacements = BTreeMap::new();
//! replacements.insert("INTRO.TOT".to_string(), script);
//! let rebuilt = stk.rebuild(&replacements, &RebuildOptions::default())?;
//! std::fs::write("INTRO.NEW.STK", rebuilt)?;
//! # Ok(())
//! # }
//! ```

mod file;
mod index;
mod names;
mod rebuild;
mod timestamp;

pub use file::{File, Member};
pub use names::normalize;
pub use rebuild::{RebuildOptions, Replacements};
pub use timestamp::Timestamp;

use std::fmt::Display;

use crate::file::{FileType, GobFileError, error::Result};

/// Constants of the STK layouts
pub mod constants {
	/// Magic of the V2.1 layout
	pub const V21_MAGIC: [u8; 6] = *b"STK2.1";

	/// Prefix shared by every versioned layout
	pub const VERSIONED_PREFIX: [u8; 3] = *b"STK";

	/// Size of the V2.1 header, payload offsets are relative to its end
	pub const V21_HEADER_SIZE: usize = 32;

	/// Size of the V1 member count
	pub const V1_COUNT_SIZE: usize = 2;

	/// Size of a V1 table record
	pub const V1_RECORD_SIZE: usize = 22;

	/// Size of the V1 name field
	pub const V1_NAME_SIZE: usize = 13;

	/// Size of a V2.1 misc record
	pub const V21_RECORD_SIZE: usize = 61;

	/// Size of a creator tag
	pub const CREATOR_SIZE: usize = 8;

	/// Size of the reserved bytes of a V2.1 record
	pub const RESERVED_SIZE: usize = 5;
}

/// Container layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
	/// Fixed-slot table at the start of the file
	V1,
	/// Trailing name and metadata tables, `"STK2.1"` magic
	V21,
}

impl Display for Variant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Variant::V1 => write!(f, "STK v1"),
			Variant::V21 => write!(f, "STK v2.1"),
		}
	}
}

/// How a member payload is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compression {
	/// Stored as is
	None,
	/// `u32` uncompressed size followed by one LZSS stream
	Lzss,
	/// Multi-chunk LZSS framing of legacy `.0OT` members
	LzssChunked,
}

impl Compression {
	/// Maps a V1 flag byte, any nonzero value means compressed
	pub fn from_v1_flag(flag: u8) -> Self {
		if flag == 0 {
			Self::None
		} else {
			Self::Lzss
		}
	}

	/// Maps a V2.1 compression code
	pub fn from_code(code: u32) -> Result<Self> {
		match code {
			0 => Ok(Self::None),
			1 => Ok(Self::Lzss),
			2 => Ok(Self::LzssChunked),
			_ => Err(GobFileError::UnsupportedCodec {
				file_type: FileType::Stk,
				codec: code,
			}),
		}
	}

	/// V2.1 compression code
	pub fn code(self) -> u32 {
		match self {
			Self::None => 0,
			Self::Lzss => 1,
			Self::LzssChunked => 2,
		}
	}

	/// Returns `true` for either LZSS framing
	pub fn is_compressed(self) -> bool {
		self != Self::None
	}
}

impl Display for Compression {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Compression::None => write!(f, "none"),
			Compression::Lzss => write!(f, "LZSS"),
			Compression::LzssChunked => write!(f, "LZSS (chunked)"),
		}
	}
}

/// Physical location of a payload, the part of a descriptor needed to read it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
	/// Absolute offset of the payload in the container
	pub offset: u32,
	/// Stored size of the payload
	pub size: u32,
	/// Storage scheme of the payload
	pub compression: Compression,
}

/// Table record of a V1 member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct V1Descriptor {
	/// Absolute offset of the payload
	pub offset: u32,
	/// Stored size of the payload, without the odd-size pad byte
	pub size: u32,
	/// Storage scheme, derived from the flag byte and the name
	pub compression: Compression,
	/// Compression flag byte as stored
	pub flag: u8,
}

/// Table record of a V2.1 member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct V21Descriptor {
	/// Absolute offset of the payload
	pub offset: u32,
	/// Stored size of the payload
	pub size: u32,
	/// Storage scheme
	pub compression: Compression,
	/// Size after decompression
	pub uncompressed_size: u32,
	/// Modification date
	pub modified: Timestamp,
	/// Creation date
	pub created: Timestamp,
	/// Creator tag, NUL padded
	pub creator: [u8; constants::CREATOR_SIZE],
	/// Reserved bytes, kept verbatim
	pub reserved: [u8; constants::RESERVED_SIZE],
}

impl V21Descriptor {
	/// Creator tag with the NUL padding removed
	pub fn creator(&self) -> String {
		tag_to_string(&self.creator)
	}
}

/// Parsed table record of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Descriptor {
	/// Record of a V1 container
	V1(V1Descriptor),
	/// Record of a V2.1 container
	V21(V21Descriptor),
}

impl Descriptor {
	/// Physical location, used to detect members sharing one payload
	pub fn location(&self) -> Location {
		Location {
			offset: self.offset(),
			size: self.size(),
			compression: self.compression(),
		}
	}

	/// Absolute offset of the payload
	pub fn offset(&self) -> u32 {
		match self {
			Self::V1(d) => d.offset,
			Self::V21(d) => d.offset,
		}
	}

	/// Stored size of the payload
	pub fn size(&self) -> u32 {
		match self {
			Self::V1(d) => d.size,
			Self::V21(d) => d.size,
		}
	}

	/// Storage scheme of the payload
	pub fn compression(&self) -> Compression {
		match self {
			Self::V1(d) => d.compression,
			Self::V21(d) => d.compression,
		}
	}

	/// Declared uncompressed size, only recorded by V2.1 containers
	pub fn uncompressed_size(&self) -> Option<u32> {
		match self {
			Self::V1(_) => None,
			Self::V21(d) => Some(d.uncompressed_size),
		}
	}
}

/// A member of the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
	pub(crate) name: String,
	pub(crate) raw_name: Vec<u8>,
	pub(crate) descriptor: Descriptor,
}

impl Entry {
	/// Normalized name the member is looked up by
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Name bytes as stored in the table
	pub fn raw_name(&self) -> &[u8] {
		&self.raw_name
	}

	/// Location record of the member
	pub fn descriptor(&self) -> &Descriptor {
		&self.descriptor
	}
}

impl Display for Entry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"Entry {{ name: '{}', offset: {:#x}, size: {}, compression: {} }}",
			self.name,
			self.descriptor.offset(),
			self.descriptor.size(),
			self.descriptor.compression()
		)
	}
}

/// Header metadata of a V2.1 container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Header {
	/// Creation date of the container
	pub created: Timestamp,
	/// Creator tag, NUL padded
	pub creator: [u8; constants::CREATOR_SIZE],
}

impl Header {
	/// Creator tag with the NUL padding removed
	pub fn creator(&self) -> String {
		tag_to_string(&self.creator)
	}
}

fn tag_to_string(tag: &[u8]) -> String {
	let end = tag.iter().position(|&b| b == 0).unwrap_or(tag.len());
	String::from_utf8_lossy(&tag[..end]).into_owned()
}

/// Builds a NUL padded creator tag, truncating to 8 bytes
pub(crate) fn creator_tag(creator: &str) -> [u8; constants::CREATOR_SIZE] {
	let mut tag = [0u8; constants::CREATOR_SIZE];
	let bytes = creator.as_bytes();
	let len = bytes.len().min(constants::CREATOR_SIZE);
	tag[..len].copy_from_slice(&bytes[..len]);
	tag
}
