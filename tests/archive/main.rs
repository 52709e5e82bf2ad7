//! Archive round trips for `gob-rs`

use std::io::Cursor;

use gob_rs::file::lzss;

mod extract;
mod options;
mod resources;

/// Builds a V1 container: `(name, payload, compressed flag)`
pub(crate) fn v1_container(members: &[(&str, &[u8], u8)]) -> Vec<u8> {
	let table_size = 2 + 22 * members.len();
	let mut out = (members.len() as u16).to_le_bytes().to_vec();
	let mut data = Vec::new();

	for (name, payload, flag) in members {
		let mut field = [0u8; 13];
		field[..name.len()].copy_from_slice(name.as_bytes());
		out.extend_from_slice(&field);
		out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
		out.extend_from_slice(&((table_size + data.len()) as u32).to_le_bytes());
		out.push(*flag);

		data.extend_from_slice(payload);
		if payload.len() % 2 == 1 {
			data.push(0);
		}
	}

	out.extend(data);
	out
}

/// Builds an uncompressed V2.1 container
pub(crate) fn v21_container(members: &[(&str, &[u8])]) -> Vec<u8> {
	let mut data = Vec::new();
	let mut offsets = Vec::new();
	for (_, payload) in members {
		offsets.push(32 + data.len() as u32);
		data.extend_from_slice(payload);
	}

	let names_offset = 32 + data.len();
	let mut names = Vec::new();
	let mut name_offsets = Vec::new();
	for (name, _) in members {
		name_offsets.push((names_offset + 8 + names.len()) as u32);
		names.extend_from_slice(name.as_bytes());
		names.push(0);
	}
	let misc_offset = names_offset + 8 + names.len();

	let mut out = b"STK2.1".to_vec();
	out.extend_from_slice(b"24121993101500");
	out.extend_from_slice(b"STK21\0\0\0");
	out.extend_from_slice(&(names_offset as u32).to_le_bytes());
	out.extend(data);
	out.extend_from_slice(&(members.len() as u32).to_le_bytes());
	out.extend_from_slice(&(misc_offset as u32).to_le_bytes());
	out.extend(names);

	for (i, (_, payload)) in members.iter().enumerate() {
		out.extend_from_slice(&name_offsets[i].to_le_bytes());
		out.extend_from_slice(b"24121993101500");
		out.extend_from_slice(b"24121993101500");
		out.extend_from_slice(b"STK21\0\0\0");
		out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
		out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
		out.extend_from_slice(&[0u8; 5]);
		out.extend_from_slice(&offsets[i].to_le_bytes());
		out.extend_from_slice(&0u32.to_le_bytes());
	}

	out
}

pub(crate) const SCRIPT: &[u8] = b"-- scene 1 --\nshow title; wait 20; show title; wait 20; fade;\n";

pub(crate) fn sample_v1() -> Vec<u8> {
	let packed = lzss::compress(SCRIPT).expect("script packs");
	v1_container(&[
		("INTRO.TOT", &packed, 1),
		("INTRO.EXT", b"\x00\x00\x00", 0),
		("README.TXT", b"see you in the next game", 0),
	])
}

pub(crate) fn open(bytes: Vec<u8>) -> gob_rs::StkFile<Cursor<Vec<u8>>> {
	gob_rs::StkFile::from_reader(Cursor::new(bytes)).expect("archive opens")
}
