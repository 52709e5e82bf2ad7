//! 14-character `ddMMyyyyHHmmss` dates of V2.1 containers.

use std::fmt::Display;

use chrono::{Local, NaiveDateTime};

/// Length of a stored timestamp
pub const TIMESTAMP_SIZE: usize = 14;

/// `ddMMyyyyHHmmss`
const FORMAT: &str = "%d%m%Y%H%M%S";

/// A date field as stored in a V2.1 container
///
/// The raw bytes are kept so that dates which do not parse survive a rebuild
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp([u8; TIMESTAMP_SIZE]);

impl Timestamp {
	/// Wraps raw field bytes
	pub fn from_bytes(bytes: [u8; TIMESTAMP_SIZE]) -> Self {
		Self(bytes)
	}

	/// Raw field bytes
	pub fn as_bytes(&self) -> &[u8; TIMESTAMP_SIZE] {
		&self.0
	}

	/// Formats a date into the stored representation
	///
	/// Years outside `0..=9999` do not fit the field and are cut short.
	pub fn from_datetime(datetime: &NaiveDateTime) -> Self {
		let text = datetime.format(FORMAT).to_string();
		let mut bytes = [b'0'; TIMESTAMP_SIZE];
		let len = text.len().min(TIMESTAMP_SIZE);
		bytes[..len].copy_from_slice(&text.as_bytes()[..len]);
		Self(bytes)
	}

	/// Current local time
	pub fn now() -> Self {
		Self::from_datetime(&Local::now().naive_local())
	}

	/// Parses the stored date, `None` if the field is not a valid date
	pub fn to_datetime(&self) -> Option<NaiveDateTime> {
		let text = std::str::from_utf8(&self.0).ok()?;
		NaiveDateTime::parse_from_str(text, FORMAT).ok()
	}
}

impl Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.to_datetime() {
			Some(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
			None => write!(f, "{:?}", String::from_utf8_lossy(&self.0)),
		}
	}
}

impl From<NaiveDateTime> for Timestamp {
	fn from(datetime: NaiveDateTime) -> Self {
		Self::from_datetime(&datetime)
	}
}
