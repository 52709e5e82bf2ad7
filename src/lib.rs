#![allow(clippy::single_component_path_imports)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `gob-rs` reads and rebuilds the archives and resources of a legacy
//! 16-bit adventure game engine.
//!
//! - [`StkFile`] opens `.STK` containers, lists, extracts and rebuilds them
//! - [`file::lzss`] is the sliding window codec shared by members and sprites
//! - [`Sprite`] decodes and encodes palette-indexed rasters
//! - [`ResourceTable`] parses `.EXT` resource tables
//!
pub use gob_internal::*;

#[doc(inline)]
pub use gob_internal::gob_types::file;

#[cfg(all(feature = "dynamic_linking", not(target_family = "wasm")))]
#[allow(unused_imports)]
use gob_dylib;
