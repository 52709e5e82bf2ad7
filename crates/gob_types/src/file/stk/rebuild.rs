//! Rebuilding archives with replaced or added members.
//!
//! The rebuild is a read-then-write batch: every member is read in table
//! order, the new data region is assembled in memory and the table is
//! written around it in the layout of the source container.
//!
//! Untouched members are copied as their on-disk bytes, so rebuilding without
//! replacements reproduces a V1 container byte for byte. Members that shared
//! one payload in the source keep sharing it.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Seek};
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::file::lzss;
use crate::file::{FileType, GobFileError, error::Result};

use super::constants::{
	CREATOR_SIZE, RESERVED_SIZE, V1_COUNT_SIZE, V1_NAME_SIZE, V1_RECORD_SIZE, V21_HEADER_SIZE,
	V21_MAGIC, V21_RECORD_SIZE,
};
use super::names::{self, normalize};
use super::{Compression, Descriptor, Entry, File, Location, Timestamp, Variant, creator_tag};

/// Replacement contents keyed by member name
pub type Replacements = BTreeMap<String, Vec<u8>>;

/// Default creator tag of rebuilt V2.1 containers
const DEFAULT_CREATOR: &str = "gob-rs";

/// Options of [`File::rebuild`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildOptions {
	/// Re-encode compressed members even when their content is unchanged
	pub force_recompress: bool,

	/// Append replacements that do not name an existing member, instead of
	/// failing with `MemberNotFound`
	pub allow_new_members: bool,

	/// Decode every freshly encoded payload again, also in release builds
	pub verify_encoding: bool,

	/// Creator tag written into V2.1 headers and touched V2.1 members
	pub creator: String,

	/// Date written into V2.1 headers and touched V2.1 members, current
	/// local time if unset
	pub timestamp: Option<NaiveDateTime>,
}

impl Default for RebuildOptions {
	fn default() -> Self {
		Self {
			force_recompress: false,
			allow_new_members: true,
			verify_encoding: false,
			creator: DEFAULT_CREATOR.to_string(),
			timestamp: None,
		}
	}
}

impl RebuildOptions {
	/// Parses options from a TOML document, missing keys keep their defaults
	///
	/// # Examples
	///
	/// ```
	/// use gob_types::file::stk::RebuildOptions;
	///
	/// let options = RebuildOptions::from_toml_str("force_recompress = true").unwrap();
	/// assert!(options.force_recompress);
	/// assert!(options.allow_new_members);
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self> {
		let settings = config::Config::builder()
			.add_source(config::File::from_str(source, config::FileFormat::Toml))
			.build()?;
		Ok(settings.try_deserialize()?)
	}

	/// Loads options from a TOML file
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref().to_string_lossy();
		let settings = config::Config::builder()
			.add_source(config::File::new(&path, config::FileFormat::Toml))
			.build()?;
		Ok(settings.try_deserialize()?)
	}

	fn stamp(&self) -> Timestamp {
		self.timestamp.as_ref().map_or_else(Timestamp::now, Timestamp::from_datetime)
	}

	fn verify(&self) -> bool {
		self.verify_encoding || cfg!(debug_assertions)
	}
}

/// Table record of the container being written
#[derive(Debug, Clone)]
struct Record {
	raw_name: Vec<u8>,
	/// Offset inside the new data region
	offset: u32,
	size: u32,
	flag: u8,
	compression: Compression,
	uncompressed_size: u32,
	modified: Timestamp,
	created: Timestamp,
	creator: [u8; CREATOR_SIZE],
	reserved: [u8; RESERVED_SIZE],
}

impl Record {
	/// Record carrying over the metadata of a source member
	fn from_entry(entry: &Entry) -> Self {
		let (flag, uncompressed_size, modified, created, creator, reserved) =
			match entry.descriptor {
				Descriptor::V1(d) => (
					d.flag,
					0,
					Timestamp::from_bytes([0; 14]),
					Timestamp::from_bytes([0; 14]),
					[0; CREATOR_SIZE],
					[0; RESERVED_SIZE],
				),
				Descriptor::V21(d) => (
					0,
					d.uncompressed_size,
					d.modified,
					d.created,
					d.creator,
					d.reserved,
				),
			};

		Self {
			raw_name: entry.raw_name.clone(),
			offset: 0,
			size: entry.descriptor.size(),
			flag,
			compression: entry.descriptor.compression(),
			uncompressed_size,
			modified,
			created,
			creator,
			reserved,
		}
	}
}

fn to_u32(value: usize, what: &str) -> Result<u32> {
	u32::try_from(value).map_err(|_| GobFileError::LimitExceeded {
		file_type: FileType::Stk,
		message: format!("{what} {value} does not fit 32 bits"),
	})
}

/// Container under construction
#[derive(Debug)]
struct Builder {
	variant: Variant,
	data: Vec<u8>,
	records: Vec<Record>,
}

impl Builder {
	fn new(variant: Variant) -> Self {
		Self {
			variant,
			data: Vec::new(),
			records: Vec::new(),
		}
	}

	/// Appends a payload to the data region, returns its offset and size
	fn append(&mut self, payload: &[u8]) -> Result<(u32, u32)> {
		let offset = to_u32(self.data.len(), "data offset")?;
		let size = to_u32(payload.len(), "payload size")?;
		self.data.extend_from_slice(payload);
		if self.variant == Variant::V1 && payload.len() % 2 == 1 {
			self.data.push(0);
		}
		Ok((offset, size))
	}

	fn push(&mut self, record: Record) -> usize {
		self.records.push(record);
		self.records.len() - 1
	}

	fn finish(self, stamp: Timestamp, creator: [u8; CREATOR_SIZE]) -> Result<Vec<u8>> {
		match self.variant {
			Variant::V1 => self.finish_v1(),
			Variant::V21 => self.finish_v21(stamp, creator),
		}
	}

	fn finish_v1(self) -> Result<Vec<u8>> {
		let count = u16::try_from(self.records.len()).map_err(|_| GobFileError::LimitExceeded {
			file_type: FileType::Stk,
			message: format!("{} members do not fit a V1 table", self.records.len()),
		})?;
		let table_size = V1_COUNT_SIZE + V1_RECORD_SIZE * self.records.len();

		let mut out = Vec::with_capacity(table_size + self.data.len());
		out.extend_from_slice(&count.to_le_bytes());

		for record in &self.records {
			let mut name = [0u8; V1_NAME_SIZE];
			let len = record.raw_name.len().min(V1_NAME_SIZE);
			name[..len].copy_from_slice(&record.raw_name[..len]);

			out.extend_from_slice(&name);
			out.extend_from_slice(&record.size.to_le_bytes());
			let offset = to_u32(table_size + record.offset as usize, "payload offset")?;
			out.extend_from_slice(&offset.to_le_bytes());
			out.push(record.flag);
		}

		out.extend_from_slice(&self.data);
		Ok(out)
	}

	fn finish_v21(self, stamp: Timestamp, creator: [u8; CREATOR_SIZE]) -> Result<Vec<u8>> {
		let names_offset = V21_HEADER_SIZE + self.data.len();
		let first_name = names_offset + 8;

		let mut names = Vec::new();
		let mut name_offsets = Vec::with_capacity(self.records.len());
		for record in &self.records {
			name_offsets.push(to_u32(first_name + names.len(), "name offset")?);
			names.extend_from_slice(&record.raw_name);
			names.push(0);
		}
		let misc_offset = first_name + names.len();

		let mut out = Vec::with_capacity(misc_offset + self.records.len() * V21_RECORD_SIZE);
		out.extend_from_slice(&V21_MAGIC);
		out.extend_from_slice(stamp.as_bytes());
		out.extend_from_slice(&creator);
		out.extend_from_slice(&to_u32(names_offset, "name table offset")?.to_le_bytes());
		out.extend_from_slice(&self.data);

		out.extend_from_slice(&to_u32(self.records.len(), "member count")?.to_le_bytes());
		out.extend_from_slice(&to_u32(misc_offset, "record table offset")?.to_le_bytes());
		out.extend_from_slice(&names);

		for (record, name_offset) in self.records.iter().zip(name_offsets) {
			out.extend_from_slice(&name_offset.to_le_bytes());
			out.extend_from_slice(record.modified.as_bytes());
			out.extend_from_slice(record.created.as_bytes());
			out.extend_from_slice(&record.creator);
			out.extend_from_slice(&record.size.to_le_bytes());
			out.extend_from_slice(&record.uncompressed_size.to_le_bytes());
			out.extend_from_slice(&record.reserved);
			let offset = to_u32(V21_HEADER_SIZE + record.offset as usize, "payload offset")?;
			out.extend_from_slice(&offset.to_le_bytes());
			out.extend_from_slice(&record.compression.code().to_le_bytes());
		}

		Ok(out)
	}
}

/// Name bytes to store for a source member written with `compression`
///
/// A `.0OT` name forces chunked decoding, so a member leaving that framing
/// is stored under its normalized name.
fn stored_name(entry: &Entry, variant: Variant, compression: Compression) -> Result<Vec<u8>> {
	if entry.descriptor.compression() == Compression::LzssChunked
		&& compression != Compression::LzssChunked
		&& variant == Variant::V1
	{
		return names::encode(&entry.name, Some(V1_NAME_SIZE));
	}
	Ok(entry.raw_name.clone())
}

impl<R: Read + Seek> File<R> {
	/// Builds a new container with the given members replaced or added
	///
	/// Names are normalized before matching. Members whose content is
	/// unchanged keep their stored bytes unless `force_recompress` is set;
	/// changed members are re-encoded if they were compressed. Replacements
	/// that match no member are appended uncompressed in name order.
	///
	/// The archive itself is left untouched; persist the returned bytes.
	pub fn rebuild(&mut self, replacements: &Replacements, options: &RebuildOptions) -> Result<Vec<u8>> {
		let mut pending: BTreeMap<String, &[u8]> = BTreeMap::new();
		for (name, content) in replacements {
			let key = normalize(name);
			if pending.insert(key.clone(), content.as_slice()).is_some() {
				return Err(GobFileError::DuplicateMember {
					file_type: FileType::Stk,
					name: key,
				});
			}
		}

		if !options.allow_new_members
			&& let Some(name) = pending.keys().find(|name| !self.lookup.contains_key(*name))
		{
			return Err(GobFileError::member_not_found(name.clone()));
		}

		let stamp = options.stamp();
		let creator = creator_tag(&options.creator);
		let mut builder = Builder::new(self.variant);
		let mut emitted: HashMap<Location, usize> = HashMap::new();

		let entries = self.entries.clone();
		for entry in &entries {
			let descriptor = entry.descriptor;
			let original = self.read_descriptor(&descriptor)?;
			let replacement = pending.remove(entry.name());
			let changed = replacement.is_some_and(|content| content != original.as_slice());
			let location = descriptor.location();

			if !changed && let Some(&index) = emitted.get(&location) {
				let shared = builder.records[index].clone();
				log::debug!("'{}' shares its payload at {:#x}", entry.name, location.offset);

				let mut record = Record::from_entry(entry);
				record.raw_name = stored_name(entry, self.variant, shared.compression)?;
				record.offset = shared.offset;
				record.size = shared.size;
				record.flag = shared.flag;
				record.compression = shared.compression;
				record.uncompressed_size = shared.uncompressed_size;
				builder.push(record);
				continue;
			}

			let content = replacement.unwrap_or(&original);
			let reencode = changed || (options.force_recompress && descriptor.compression().is_compressed());
			let mut record = Record::from_entry(entry);

			let payload = if !reencode {
				log::debug!("'{}' is unchanged, copying stored bytes", entry.name);
				self.read_stored(&descriptor)?
			} else if descriptor.compression().is_compressed() {
				log::debug!("'{}' re-encoded ({} bytes)", entry.name, content.len());
				record.compression = Compression::Lzss;
				record.flag = 1;
				lzss::compress_with(content, options.verify())?
			} else {
				log::debug!("'{}' replaced ({} bytes, stored)", entry.name, content.len());
				record.compression = Compression::None;
				record.flag = 0;
				content.to_vec()
			};

			record.raw_name = stored_name(entry, self.variant, record.compression)?;
			if reencode {
				record.uncompressed_size = to_u32(content.len(), "member size")?;
			}
			if changed {
				record.modified = stamp;
				record.creator = creator;
			}

			let (offset, size) = builder.append(&payload)?;
			record.offset = offset;
			record.size = size;
			let index = builder.push(record);
			if !changed {
				emitted.insert(location, index);
			}
		}

		let max_name = match self.variant {
			Variant::V1 => Some(V1_NAME_SIZE),
			Variant::V21 => None,
		};
		for (name, content) in pending {
			let raw_name = names::encode(&name, max_name)?;
			log::info!("Adding member '{name}' ({} bytes)", content.len());

			let (offset, size) = builder.append(content)?;
			builder.push(Record {
				raw_name,
				offset,
				size,
				flag: 0,
				compression: Compression::None,
				uncompressed_size: size,
				modified: stamp,
				created: stamp,
				creator,
				reserved: [0; RESERVED_SIZE],
			});
		}

		log::debug!(
			"Rebuilt {} with {} members, {} data bytes",
			self.variant,
			builder.records.len(),
			builder.data.len()
		);
		builder.finish(stamp, creator)
	}
}
