//! File type support for `gob-rs` project.

mod error;

pub mod ext;
pub mod lzss;
pub mod sprite;
pub mod stk;

// Re-export unified error type
pub use error::{FileType, GobFileError};

// Re-export main file types
pub use ext::{ResourceItem, ResourceTable};
pub use sprite::{Encoding as SpriteEncoding, Sprite};
pub use stk::{
	Compression as StkCompression, Descriptor as StkDescriptor, Entry as StkEntry, File as StkFile,
	Header as StkHeader, RebuildOptions, Replacements, Timestamp, Variant as StkVariant,
};
