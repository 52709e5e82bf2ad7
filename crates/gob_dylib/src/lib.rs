#![allow(clippy::single_component_path_imports)]

//! Forces dynamic linking of `gob-rs`.
//!
//! Enable the `dynamic_linking` feature of `gob-rs` to link this crate, which
//! shortens incremental rebuilds of tools built on top of the library.

#[allow(unused_imports)]
use gob_internal;
