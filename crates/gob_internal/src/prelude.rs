//! Prelude module for `gob_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use gob_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let sprite = Sprite::new(4, 1, vec![1, 1, 2, 2]).unwrap();
//! let blob = sprite.to_bytes(SpriteEncoding::RunLength).unwrap();
//! assert_eq!(Sprite::from_bytes(&blob, 4, 1).unwrap(), sprite);
//!
//! let options = RebuildOptions::default();
//! assert!(options.allow_new_members);
//! ```

// Re-export everything from gob_types::prelude
#[doc(inline)]
pub use gob_types::prelude::*;

// Re-export the entire gob_types module for advanced usage
#[doc(inline)]
pub use gob_types;
