//! Index parsing for both container layouts.

use std::collections::HashMap;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::file::{FileType, GobFileError, error::Result};

use super::constants::{
	CREATOR_SIZE, RESERVED_SIZE, V1_NAME_SIZE, V1_RECORD_SIZE, V21_MAGIC, V21_RECORD_SIZE,
	VERSIONED_PREFIX,
};
use super::names;
use super::{Compression, Descriptor, Entry, Header, Timestamp, V1Descriptor, V21Descriptor, Variant};

/// Longest NUL-terminated name accepted in a V2.1 name table
const MAX_V21_NAME: usize = 1024;

/// Parsed member table
#[derive(Debug)]
pub(crate) struct Index {
	pub variant: Variant,
	pub header: Option<Header>,
	pub entries: Vec<Entry>,
	pub lookup: HashMap<String, usize>,
}

/// Reads `N` bytes, reporting a short read as corruption at the current offset
fn read_array<const N: usize, R: Read + Seek>(reader: &mut R) -> Result<[u8; N]> {
	let offset = reader.stream_position()?;
	let mut buffer = [0u8; N];
	reader.read_exact(&mut buffer).map_err(|e| match e.kind() {
		ErrorKind::UnexpectedEof => {
			GobFileError::corrupt(FileType::Stk, offset, format!("table truncated, needed {N} bytes"))
		}
		_ => e.into(),
	})?;
	Ok(buffer)
}

fn read_u16<R: Read + Seek>(reader: &mut R) -> Result<u16> {
	Ok(u16::from_le_bytes(read_array(reader)?))
}

fn read_u32<R: Read + Seek>(reader: &mut R) -> Result<u32> {
	Ok(u32::from_le_bytes(read_array(reader)?))
}

/// Reads a NUL-terminated name starting at the current position
fn read_cstring<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>> {
	let start = reader.stream_position()?;
	let mut name = Vec::new();
	loop {
		let [byte] = read_array::<1, R>(reader)?;
		if byte == 0 {
			return Ok(name);
		}
		name.push(byte);
		if name.len() > MAX_V21_NAME {
			return Err(GobFileError::corrupt(FileType::Stk, start, "unterminated member name"));
		}
	}
}

/// Detects the layout and reads the member table
pub(crate) fn read_index<R: Read + Seek>(reader: &mut R) -> Result<Index> {
	let stream_len = reader.seek(SeekFrom::End(0))?;
	reader.seek(SeekFrom::Start(0))?;

	let mut magic = Vec::with_capacity(V21_MAGIC.len());
	reader.by_ref().take(V21_MAGIC.len() as u64).read_to_end(&mut magic)?;

	let (variant, header, records) = if magic == V21_MAGIC {
		let (header, records) = read_v21(reader)?;
		(Variant::V21, Some(header), records)
	} else if magic.len() == V21_MAGIC.len() && magic.starts_with(&VERSIONED_PREFIX) {
		return Err(GobFileError::UnsupportedVariant {
			magic,
		});
	} else {
		reader.seek(SeekFrom::Start(0))?;
		(Variant::V1, None, read_v1(reader)?)
	};

	let mut entries = Vec::with_capacity(records.len());
	let mut lookup = HashMap::with_capacity(records.len());

	for (name, raw_name, descriptor) in records {
		let end = u64::from(descriptor.offset()) + u64::from(descriptor.size());
		if end > stream_len {
			return Err(GobFileError::corrupt(
				FileType::Stk,
				u64::from(descriptor.offset()),
				format!("member '{name}' ends at {end:#x}, past the container end {stream_len:#x}"),
			));
		}

		if lookup.insert(name.clone(), entries.len()).is_some() {
			return Err(GobFileError::DuplicateMember {
				file_type: FileType::Stk,
				name,
			});
		}

		log::debug!(
			"{variant} member '{name}': offset={:#x} size={} compression={}",
			descriptor.offset(),
			descriptor.size(),
			descriptor.compression()
		);
		entries.push(Entry {
			name,
			raw_name,
			descriptor,
		});
	}

	log::debug!("{variant} index holds {} members", entries.len());

	Ok(Index {
		variant,
		header,
		entries,
		lookup,
	})
}

type Record = (String, Vec<u8>, Descriptor);

fn read_v1<R: Read + Seek>(reader: &mut R) -> Result<Vec<Record>> {
	let count = read_u16(reader)?;
	let mut records = Vec::with_capacity(usize::from(count));

	for _ in 0..count {
		let record: [u8; V1_RECORD_SIZE] = read_array(reader)?;
		let raw_name = names::trim_nul(&record[..V1_NAME_SIZE]).to_vec();
		let size = u32::from_le_bytes([record[13], record[14], record[15], record[16]]);
		let offset = u32::from_le_bytes([record[17], record[18], record[19], record[20]]);
		let flag = record[21];

		let (name, chunked) = names::decode_v1(&raw_name);
		let compression = if chunked {
			Compression::LzssChunked
		} else {
			Compression::from_v1_flag(flag)
		};

		records.push((
			name,
			raw_name,
			Descriptor::V1(V1Descriptor {
				offset,
				size,
				compression,
				flag,
			}),
		));
	}

	Ok(records)
}

fn read_v21<R: Read + Seek>(reader: &mut R) -> Result<(Header, Vec<Record>)> {
	let created = Timestamp::from_bytes(read_array(reader)?);
	let creator: [u8; CREATOR_SIZE] = read_array(reader)?;
	let names_offset = read_u32(reader)?;

	reader.seek(SeekFrom::Start(u64::from(names_offset)))?;
	let count = read_u32(reader)?;
	let misc_offset = read_u32(reader)?;

	let stream_len = reader.seek(SeekFrom::End(0))?;
	let table_end = u64::from(misc_offset) + u64::from(count) * V21_RECORD_SIZE as u64;
	if table_end > stream_len {
		return Err(GobFileError::corrupt(
			FileType::Stk,
			u64::from(names_offset),
			format!("{count} records at {misc_offset:#x} run past the container end"),
		));
	}

	let mut records = Vec::with_capacity(count as usize);
	for i in 0..u64::from(count) {
		reader.seek(SeekFrom::Start(u64::from(misc_offset) + i * V21_RECORD_SIZE as u64))?;

		let name_offset = read_u32(reader)?;
		let modified = Timestamp::from_bytes(read_array(reader)?);
		let file_created = Timestamp::from_bytes(read_array(reader)?);
		let file_creator: [u8; CREATOR_SIZE] = read_array(reader)?;
		let size = read_u32(reader)?;
		let uncompressed_size = read_u32(reader)?;
		let reserved: [u8; RESERVED_SIZE] = read_array(reader)?;
		let offset = read_u32(reader)?;
		let compression = Compression::from_code(read_u32(reader)?)?;

		reader.seek(SeekFrom::Start(u64::from(name_offset)))?;
		let raw_name = read_cstring(reader)?;
		let name = names::decode_v21(&raw_name);
		if modified.to_datetime().is_none() || file_created.to_datetime().is_none() {
			log::warn!("member '{name}' carries an unparseable date, keeping it verbatim");
		}

		records.push((
			name,
			raw_name,
			Descriptor::V21(V21Descriptor {
				offset,
				size,
				compression,
				uncompressed_size,
				modified,
				created: file_created,
				creator: file_creator,
				reserved,
			}),
		));
	}

	Ok((
		Header {
			created,
			creator,
		},
		records,
	))
}
