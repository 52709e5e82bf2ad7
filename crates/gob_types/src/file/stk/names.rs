//! Member name decoding, normalization and validation.
//!
//! V1 tables were written by DOS tools that sometimes left CP866 Cyrillic
//! look-alikes in otherwise Latin names (`0x8E` for `O` and so on). Those are
//! folded back to ASCII before the remaining bytes are decoded as CP866.
//!
//! Only those five bytes are folded. The CP866 pass applies to display and
//! lookup names alone: any other high byte maps to its Cyrillic letter
//! instead of a guessed Latin one, and the stored bytes kept in
//! [`Entry::raw_name`](super::Entry::raw_name) are what a rebuild writes back.

use encoding_rs::{IBM866, WINDOWS_1252};

use crate::file::{FileType, GobFileError, error::Result};

/// Cyrillic bytes substituted by their Latin look-alikes
const LATIN_LOOKALIKES: [(u8, u8); 5] =
	[(0x85, b'E'), (0x8A, b'K'), (0x8E, b'O'), (0x91, b'C'), (0x92, b'T')];

/// Extension marking members stored in the multi-chunk LZSS framing
const CHUNKED_EXTENSION: &str = ".0OT";

/// Extension chunked members are exposed under
const SCRIPT_EXTENSION: &str = ".TOT";

/// Normalizes a member name into the key used for lookups
///
/// Backslashes become forward slashes, and empty or `.` path components are
/// dropped. Case is preserved.
pub fn normalize(name: &str) -> String {
	name.replace('\\', "/")
		.split('/')
		.filter(|part| !part.is_empty() && *part != ".")
		.collect::<Vec<_>>()
		.join("/")
}

/// Bytes of a fixed-size field up to the first NUL
pub(crate) fn trim_nul(field: &[u8]) -> &[u8] {
	let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
	&field[..end]
}

/// Decodes a V1 name field
///
/// Returns the normalized name and whether the member uses the multi-chunk
/// framing.
pub(crate) fn decode_v1(raw: &[u8]) -> (String, bool) {
	let folded: Vec<u8> = raw
		.iter()
		.map(|&b| {
			LATIN_LOOKALIKES.iter().find(|(from, _)| *from == b).map_or(b, |&(_, to)| to)
		})
		.collect();
	let (decoded, _) = IBM866.decode_without_bom_handling(&folded);

	let mut name = decoded.into_owned();
	let chunked = name.to_ascii_uppercase().ends_with(CHUNKED_EXTENSION);
	if chunked {
		name.truncate(name.len() - CHUNKED_EXTENSION.len());
		name.push_str(SCRIPT_EXTENSION);
	}

	(normalize(&name), chunked)
}

/// Decodes a V2.1 name
pub(crate) fn decode_v21(raw: &[u8]) -> String {
	match std::str::from_utf8(raw) {
		Ok(name) => normalize(name),
		Err(_) => {
			let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(raw);
			normalize(&decoded)
		}
	}
}

/// Encodes the name of a member that has no stored name to reuse
///
/// Only printable ASCII without NUL is accepted. `max_len` bounds the encoded
/// size for fixed-width tables.
pub(crate) fn encode(name: &str, max_len: Option<usize>) -> Result<Vec<u8>> {
	let invalid = |message: String| GobFileError::InvalidName {
		file_type: FileType::Stk,
		name: name.to_string(),
		message,
	};

	if name.is_empty() {
		return Err(invalid("name is empty".to_string()));
	}
	if let Some(c) = name.chars().find(|c| !c.is_ascii() || c.is_ascii_control()) {
		return Err(invalid(format!("character {c:?} cannot be stored")));
	}
	if let Some(max_len) = max_len
		&& name.len() > max_len
	{
		return Err(invalid(format!("{} bytes do not fit a {max_len}-byte field", name.len())));
	}

	Ok(name.as_bytes().to_vec())
}
