//! Prelude module for `gob_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use gob_types::prelude::*;
//!
//! // Now you can use all common types directly
//! let sprite = Sprite::new(2, 1, vec![3, 4]).unwrap();
//! let blob = sprite.to_bytes(SpriteEncoding::RunLength).unwrap();
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	FileType,
	GobFileError,

	// EXT types
	ResourceItem,
	ResourceTable,

	// Sprite types
	Sprite,
	SpriteEncoding,

	// STK types
	RebuildOptions,
	Replacements,
	StkCompression,
	StkDescriptor,
	StkEntry,
	StkFile,
	StkHeader,
	StkVariant,
	Timestamp,
};

#[doc(inline)]
pub use crate::stream::PartialView;

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
