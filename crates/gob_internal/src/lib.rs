//! This module is separated into its own crate to enable simple dynamic linking for `gob-rs`, and should not be used directly.

/// `use gob_rs::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export gob_types for convenience
pub use gob_types;

// Re-export commonly used types at crate root
pub use gob_types::file::{GobFileError, RebuildOptions, ResourceTable, Sprite, StkFile};
