use std::fs;

use anyhow::Result;
use chrono::NaiveDate;
use gob_rs::prelude::*;

use crate::{sample_v1, v21_container};

#[test_log::test]
fn test_load_options_file() -> Result<()> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("rebuild.toml");
	fs::write(
		&path,
		"allow_new_members = false\ncreator = \"patcher\"\ntimestamp = \"2001-09-08T07:06:05\"\n",
	)?;

	let options = RebuildOptions::load(&path)?;
	assert!(!options.allow_new_members);
	assert!(!options.force_recompress);
	assert_eq!(options.creator, "patcher");
	assert_eq!(
		options.timestamp,
		NaiveDate::from_ymd_opt(2001, 9, 8).and_then(|d| d.and_hms_opt(7, 6, 5))
	);

	let mut stk = crate::open(sample_v1());
	let mut replacements = Replacements::new();
	replacements.insert("NEW.TXT".to_string(), b"new".to_vec());
	assert!(matches!(
		stk.rebuild(&replacements, &options),
		Err(GobFileError::MemberNotFound {
			..
		})
	));
	Ok(())
}

#[test_log::test]
fn test_options_serialize() -> Result<()> {
	let options = RebuildOptions {
		force_recompress: true,
		timestamp: NaiveDate::from_ymd_opt(1993, 12, 24).and_then(|d| d.and_hms_opt(10, 15, 0)),
		..RebuildOptions::default()
	};

	let json = serde_json::to_string(&options)?;
	assert!(json.contains("\"force_recompress\":true"));
	assert!(json.contains("\"timestamp\":\"1993-12-24T10:15:00\""));
	assert_eq!(serde_json::from_str::<RebuildOptions>(&json)?, options);

	// missing keys fall back to defaults
	let partial: RebuildOptions = serde_json::from_str("{\"creator\":\"x\"}")?;
	assert_eq!(partial.creator, "x");
	assert!(partial.allow_new_members);
	Ok(())
}

#[test_log::test]
fn test_v21_stamps_from_options() -> Result<()> {
	let mut stk = crate::open(v21_container(&[("A.TXT", b"aaaa"), ("B.TXT", b"bb")]));
	let options = RebuildOptions {
		creator: "patcher".to_string(),
		timestamp: NaiveDate::from_ymd_opt(2001, 9, 8).and_then(|d| d.and_hms_opt(7, 6, 5)),
		..RebuildOptions::default()
	};

	let mut replacements = Replacements::new();
	replacements.insert("B.TXT".to_string(), b"bbbbbb".to_vec());
	let rebuilt = stk.rebuild(&replacements, &options)?;

	assert_eq!(hex::encode(&rebuilt[..6]), "53544b322e31");
	assert_eq!(&rebuilt[6..20], b"08092001070605");
	assert_eq!(hex::encode(&rebuilt[20..28]), "7061746368657200");

	let reopened = crate::open(rebuilt);
	let header = reopened.header().expect("V2.1 header");
	assert_eq!(header.creator(), "patcher");

	let entries = reopened.entries();
	let StkDescriptor::V21(untouched) = entries[0].descriptor() else {
		panic!("expected a V2.1 record");
	};
	assert_eq!(untouched.modified.as_bytes(), b"24121993101500");
	assert_eq!(untouched.creator(), "STK21");

	let StkDescriptor::V21(touched) = entries[1].descriptor() else {
		panic!("expected a V2.1 record");
	};
	assert_eq!(touched.modified.as_bytes(), b"08092001070605");
	assert_eq!(touched.created.as_bytes(), b"24121993101500");
	assert_eq!(touched.creator(), "patcher");
	assert_eq!(touched.uncompressed_size, 6);
	Ok(())
}
