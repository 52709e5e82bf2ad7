//! Error types for file format parsing and manipulation.

use std::fmt::Display;

use thiserror::Error;

/// File format a [`GobFileError`] originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// `.STK` / `.ITK` / `.LTK` archive container
	Stk,
	/// LZSS compressed stream
	Lzss,
	/// Palette-indexed sprite blob
	Sprite,
	/// `.EXT` resource table
	Ext,
}

impl Display for FileType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FileType::Stk => write!(f, "STK"),
			FileType::Lzss => write!(f, "LZSS"),
			FileType::Sprite => write!(f, "Sprite"),
			FileType::Ext => write!(f, "EXT"),
		}
	}
}

/// Unified error type for every format handled by this crate
#[derive(Debug, Error)]
pub enum GobFileError {
	/// Not enough data to parse
	#[error("[{file_type}] Insufficient data: expected {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Format being parsed
		file_type: FileType,
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Requested member is absent from the index
	#[error("[{file_type}] No member '{name}' found")]
	MemberNotFound {
		/// Format being accessed
		file_type: FileType,
		/// Name that was looked up
		name: String,
	},

	/// Two index entries normalize to the same name
	#[error("[{file_type}] Duplicate member '{name}' in index")]
	DuplicateMember {
		/// Format being parsed
		file_type: FileType,
		/// Normalized name shared by both entries
		name: String,
	},

	/// Control or length data is inconsistent with the declared sizes
	#[error("[{file_type}] Corrupt stream at offset {offset:#x}: {message}")]
	CorruptStream {
		/// Format being decoded
		file_type: FileType,
		/// Byte offset where the inconsistency was detected
		offset: u64,
		/// Description of the inconsistency
		message: String,
	},

	/// Container layout not covered by this crate
	#[error("Unsupported container variant: magic {magic:02X?}")]
	UnsupportedVariant {
		/// Leading bytes of the container
		magic: Vec<u8>,
	},

	/// Codec or compression id not covered by this crate
	#[error("[{file_type}] Unsupported codec: {codec}")]
	UnsupportedCodec {
		/// Format being decoded
		file_type: FileType,
		/// Codec or compression id found in the data
		codec: u32,
	},

	/// An encoder produced output that does not decode back to its input
	#[error("[{file_type}] Encoder self-check failed: {message}")]
	EncoderInvariantViolation {
		/// Format being encoded
		file_type: FileType,
		/// Where the round trip diverged
		message: String,
	},

	/// Name cannot be stored in the target table
	#[error("[{file_type}] Invalid member name '{name}': {message}")]
	InvalidName {
		/// Format being written
		file_type: FileType,
		/// Offending name
		name: String,
		/// Why the name was rejected
		message: String,
	},

	/// Table, count or offset does not fit the fields of the target layout
	#[error("[{file_type}] Format limit exceeded: {message}")]
	LimitExceeded {
		/// Format being written
		file_type: FileType,
		/// Which limit was hit
		message: String,
	},

	/// Pixel value outside the range the codec can represent
	#[error("Pixel {index} has palette index {value}, run-length sprites only store 0..=15")]
	InvalidPixel {
		/// Position of the pixel in the raster
		index: usize,
		/// Offending palette index
		value: u8,
	},

	/// Resource lives in a shared external file
	#[error("[{file_type}] Resource {index} is stored externally (offset {offset})")]
	ExternalResource {
		/// Format being read
		file_type: FileType,
		/// Item index in the table
		index: usize,
		/// Raw negative offset
		offset: i32,
	},

	/// Options could not be loaded
	#[error(transparent)]
	Config(#[from] config::ConfigError),

	/// IO error
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl GobFileError {
	/// Creates an `InsufficientData` error
	pub fn insufficient_data(file_type: FileType, expected: usize, actual: usize) -> Self {
		Self::InsufficientData {
			file_type,
			expected,
			actual,
		}
	}

	/// Creates a `CorruptStream` error
	pub fn corrupt(file_type: FileType, offset: u64, message: impl Into<String>) -> Self {
		Self::CorruptStream {
			file_type,
			offset,
			message: message.into(),
		}
	}

	/// Creates a `MemberNotFound` error for an archive member
	pub fn member_not_found(name: impl Into<String>) -> Self {
		Self::MemberNotFound {
			file_type: FileType::Stk,
			name: name.into(),
		}
	}

	/// Returns `true` for errors caused by malformed data rather than the caller or the OS
	pub fn is_corruption(&self) -> bool {
		matches!(
			self,
			Self::CorruptStream {
				..
			} | Self::InsufficientData {
				..
			}
		)
	}
}

/// Result alias used throughout the crate
pub type Result<T, E = GobFileError> = std::result::Result<T, E>;
