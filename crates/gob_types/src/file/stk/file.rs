//! Core file operations for STK archives.
//!
//! This module contains the main `File` structure: index access, member
//! lookup and reading, and bulk extraction.

use std::collections::HashMap;
use std::fs;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use regex::RegexBuilder;

use crate::file::lzss::{self, constants::SIZE_PREFIX};
use crate::file::{FileType, GobFileError, error::Result};
use crate::stream::PartialView;

use super::index::{Index, read_index};
use super::names::normalize;
use super::{Compression, Descriptor, Entry, Header, Variant};

/// An opened `.STK` archive
#[derive(Debug)]
pub struct File<R> {
	/// Underlying container stream
	pub(super) reader: R,

	pub(super) variant: Variant,

	pub(super) header: Option<Header>,

	/// Members in table order
	pub(super) entries: Vec<Entry>,

	/// Normalized name to position in `entries`
	pub(super) lookup: HashMap<String, usize>,
}

/// Readable stream over one member
///
/// Uncompressed members are served straight from the container through a
/// bounded view; compressed members are decoded in full on open.
#[derive(Debug)]
pub enum Member<'a, R> {
	/// Window over the stored bytes
	Stored(PartialView<&'a mut R>),
	/// Decoded bytes of a compressed member
	Decoded(Cursor<Vec<u8>>),
}

impl<R: Read + Seek> Member<'_, R> {
	/// Size of the member content
	pub fn len(&self) -> u64 {
		match self {
			Member::Stored(view) => view.len(),
			Member::Decoded(cursor) => cursor.get_ref().len() as u64,
		}
	}

	/// Returns `true` if the member is empty
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<R: Read + Seek> Read for Member<'_, R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		match self {
			Member::Stored(view) => view.read(buf),
			Member::Decoded(cursor) => cursor.read(buf),
		}
	}
}

impl<R: Read + Seek> Seek for Member<'_, R> {
	fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
		match self {
			Member::Stored(view) => view.seek(pos),
			Member::Decoded(cursor) => cursor.seek(pos),
		}
	}
}

impl<R: Read + Seek> File<R> {
	/// Reads the index of an archive from the given reader
	///
	/// Fails with `UnsupportedVariant` for versioned containers other than
	/// V2.1, `DuplicateMember` if two entries share a name and `CorruptStream`
	/// if the table is truncated or points outside the container.
	pub fn from_reader(mut reader: R) -> Result<Self> {
		let Index {
			variant,
			header,
			entries,
			lookup,
		} = read_index(&mut reader)?;

		Ok(Self {
			reader,
			variant,
			header,
			entries,
			lookup,
		})
	}

	/// Container layout
	pub fn variant(&self) -> Variant {
		self.variant
	}

	/// Header metadata, V2.1 only
	pub fn header(&self) -> Option<&Header> {
		self.header.as_ref()
	}

	/// Members in table order
	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	/// Number of members
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if the archive has no members
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates over the normalized member names in table order
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(Entry::name)
	}

	/// Normalized member names in table order
	pub fn list(&self) -> Vec<String> {
		self.names().map(str::to_string).collect()
	}

	/// Looks up a member, `name` is normalized first
	pub fn entry(&self, name: &str) -> Option<&Entry> {
		self.lookup.get(&normalize(name)).map(|&i| &self.entries[i])
	}

	/// Returns `true` if a member with the given name exists
	pub fn contains(&self, name: &str) -> bool {
		self.entry(name).is_some()
	}

	/// Members whose name matches a `*` / `?` wildcard pattern, case-insensitively
	pub fn matching(&self, pattern: &str) -> Result<Vec<&Entry>> {
		let mut expression = String::from("^");
		for c in normalize(pattern).chars() {
			match c {
				'*' => expression.push_str(".*"),
				'?' => expression.push('.'),
				_ => expression.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
			}
		}
		expression.push('$');

		let matcher = RegexBuilder::new(&expression).case_insensitive(true).build().map_err(|e| {
			GobFileError::InvalidName {
				file_type: FileType::Stk,
				name: pattern.to_string(),
				message: e.to_string(),
			}
		})?;

		Ok(self.entries.iter().filter(|entry| matcher.is_match(&entry.name)).collect())
	}

	fn require(&self, name: &str) -> Result<Descriptor> {
		self.entry(name)
			.map(|entry| entry.descriptor)
			.ok_or_else(|| GobFileError::member_not_found(normalize(name)))
	}

	/// Opens a member as a readable, seekable stream
	pub fn open_member(&mut self, name: &str) -> Result<Member<'_, R>> {
		let descriptor = self.require(name)?;

		if descriptor.compression() == Compression::None {
			check_uncompressed_size(&descriptor, u64::from(descriptor.size()))?;
			return Ok(Member::Stored(PartialView::with_range(
				&mut self.reader,
				u64::from(descriptor.offset()),
				u64::from(descriptor.size()),
			)));
		}

		Ok(Member::Decoded(Cursor::new(self.read_descriptor(&descriptor)?)))
	}

	/// Reads the full, decompressed content of a member
	pub fn read(&mut self, name: &str) -> Result<Vec<u8>> {
		let descriptor = self.require(name)?;
		self.read_descriptor(&descriptor)
	}

	/// Reads the stored bytes of a member without decompressing them
	pub fn read_raw(&mut self, name: &str) -> Result<Vec<u8>> {
		let descriptor = self.require(name)?;
		self.read_stored(&descriptor)
	}

	/// Stored payload bytes of a descriptor
	pub(super) fn read_stored(&mut self, descriptor: &Descriptor) -> Result<Vec<u8>> {
		self.reader.seek(SeekFrom::Start(u64::from(descriptor.offset())))?;
		let mut payload = vec![0u8; descriptor.size() as usize];
		self.reader.read_exact(&mut payload)?;
		Ok(payload)
	}

	/// Decoded content of a descriptor
	pub(super) fn read_descriptor(&mut self, descriptor: &Descriptor) -> Result<Vec<u8>> {
		let payload = self.read_stored(descriptor)?;

		let content = match descriptor.compression() {
			Compression::None => payload,
			Compression::Lzss => {
				if payload.len() < SIZE_PREFIX {
					return Err(GobFileError::insufficient_data(
						FileType::Stk,
						SIZE_PREFIX,
						payload.len(),
					));
				}
				let size =
					u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;
				let base = u64::from(descriptor.offset()) + SIZE_PREFIX as u64;
				lzss::decompress_block(&payload[SIZE_PREFIX..], size, base)?.0
			}
			Compression::LzssChunked => lzss::decompress_chunked(
				&payload,
				descriptor.uncompressed_size().map(|size| size as usize),
			)?,
		};

		check_uncompressed_size(descriptor, content.len() as u64)?;
		Ok(content)
	}

	/// Extracts every member matching `pattern` below `dir`
	///
	/// Member paths are created as needed. Returns the number of files written.
	pub fn extract_all(&mut self, dir: impl AsRef<Path>, pattern: &str) -> Result<usize> {
		let dir = dir.as_ref();
		let selected: Vec<(String, Descriptor)> = self
			.matching(pattern)?
			.into_iter()
			.map(|entry| (entry.name.clone(), entry.descriptor))
			.collect();

		for (name, descriptor) in &selected {
			let content = self.read_descriptor(descriptor)?;
			let target = dir.join(name);
			if let Some(parent) = target.parent() {
				fs::create_dir_all(parent)?;
			}
			fs::write(&target, content)?;
			log::info!("Extracted {} to {}", name, target.display());
		}

		Ok(selected.len())
	}

	/// Consumes the archive, returning the underlying stream
	pub fn into_inner(self) -> R {
		self.reader
	}
}

impl File<BufReader<fs::File>> {
	/// Opens an `.STK` archive from the given path
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let file = fs::File::open(path)?;
		let reader = BufReader::new(file);
		Self::from_reader(reader)
	}
}

/// V2.1 records declare the decoded size, it must match
fn check_uncompressed_size(descriptor: &Descriptor, actual: u64) -> Result<()> {
	if let Some(expected) = descriptor.uncompressed_size()
		&& u64::from(expected) != actual
	{
		return Err(GobFileError::corrupt(
			FileType::Stk,
			u64::from(descriptor.offset()),
			format!("member decoded to {actual} bytes, record declares {expected}"),
		));
	}
	Ok(())
}
