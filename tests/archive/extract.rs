use std::fs;

use anyhow::Result;
use gob_rs::prelude::*;

use crate::{SCRIPT, sample_v1};

#[test_log::test]
fn test_open_from_disk() -> Result<()> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("INTRO.STK");
	fs::write(&path, sample_v1())?;

	let mut stk = StkFile::open(&path)?;
	assert_eq!(stk.variant(), StkVariant::V1);
	assert_eq!(stk.len(), 3);
	assert_eq!(stk.read("INTRO.TOT")?, SCRIPT);
	assert_eq!(stk.read("README.TXT")?, b"see you in the next game");
	Ok(())
}

#[test_log::test]
fn test_extract_matching() -> Result<()> {
	let dir = tempfile::tempdir()?;
	let mut stk = crate::open(sample_v1());

	assert_eq!(stk.extract_all(dir.path(), "INTRO.*")?, 2);
	assert_eq!(fs::read(dir.path().join("INTRO.TOT"))?, SCRIPT);
	assert_eq!(fs::read(dir.path().join("INTRO.EXT"))?, b"\x00\x00\x00");
	assert!(!dir.path().join("README.TXT").exists());

	assert_eq!(stk.extract_all(dir.path(), "*.txt")?, 1);
	assert!(dir.path().join("README.TXT").exists());

	assert_eq!(stk.extract_all(dir.path(), "*.SND")?, 0);
	Ok(())
}

#[test_log::test]
fn test_rebuild_to_disk_and_reopen() -> Result<()> {
	let dir = tempfile::tempdir()?;
	let path = dir.path().join("INTRO.STK");
	let mut stk = crate::open(sample_v1());

	let mut replacements = Replacements::new();
	replacements.insert("README.TXT".to_string(), b"patched".to_vec());
	fs::write(&path, stk.rebuild(&replacements, &RebuildOptions::default())?)?;

	let mut rebuilt = StkFile::open(&path)?;
	assert_eq!(rebuilt.list(), stk.list());
	assert_eq!(rebuilt.read("README.TXT")?, b"patched");
	assert_eq!(rebuilt.read_raw("INTRO.TOT")?, stk.read_raw("INTRO.TOT")?);
	assert_eq!(rebuilt.read("INTRO.TOT")?, SCRIPT);
	Ok(())
}

#[test_log::test]
fn test_missing_archive() {
	let dir = tempfile::tempdir().unwrap();
	assert!(matches!(StkFile::open(dir.path().join("NOPE.STK")), Err(GobFileError::Io(_))));
}
