//! This crate provides core data types and file format support for the `gob-rs` project.
//!
//! # File Formats
//!
//! - **STK**: Archive containers (`.STK`, `.ITK`, `.LTK`) in the V1 and V2.1 layouts
//! - **LZSS**: The 4 KiB sliding window codec used by archive members and sprites
//! - **Sprite**: Palette-indexed rasters, run-length or LZSS-wrapped
//! - **EXT**: Resource tables shipped next to `.TOT` scripts
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use gob_types::prelude::*;
//!
//! # fn main() -> Result<(), GobFileError> {
//! let mut stk = StkFile::open("INTRO.STK")?;
//! let table = ResourceTable::from_bytes(&stk.read("INTRO.EXT")?)?;
//! let sprite = table.sprite(0)?;
//! println!("{}x{}", sprite.width(), sprite.height());
//! # Ok(())
//! # }
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use gob_types::file::lzss;
//!
//! let packed = lzss::compress(b"hello hello hello").unwrap();
//! let unpacked = lzss::decompress_prefixed(&packed).unwrap();
//! ```

pub mod file;

pub mod stream;

/// `use gob_types::prelude::*;` to import commonly used items.
pub mod prelude;
