use std::fs;
use std::io::{Cursor, Read};

use mai_arc::{error::Result, ArcArchive, FileType};
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

/// Build an archive with a directory table, every entry holding `data`.
fn nested_archive(names: &[&str], directories: &[(&str, i32)], data: &[u8]) -> Vec<u8> {
    let index_size = names.len() * 0x18 + directories.len() * 8;
    let data_start = 0x10 + index_size;
    let total = data_start + names.len() * data.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"MAI\x0a");
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(names.len() as i32).to_le_bytes());
    out.push(0);
    out.push(2);
    out.extend_from_slice(&(directories.len() as u16).to_le_bytes());

    for (i, name) in names.iter().enumerate() {
        let mut raw = [0u8; 16];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(&raw);
        out.extend_from_slice(&((data_start + i * data.len()) as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    }

    for (name, start) in directories {
        let mut raw = [0u8; 4];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        out.extend_from_slice(&raw);
        out.extend_from_slice(&start.to_le_bytes());
    }

    for _ in names {
        out.extend_from_slice(data);
    }

    assert_eq!(out.len(), total);
    out
}

#[traced_test]
#[test]
fn directories_prefix_their_ranges() -> Result<()> {
    let input = nested_archive(
        &["a0", "a1", "a2", "b0", "b1"],
        &[("AA", 0), ("BB", 3)],
        b"CM\x20\x00",
    );

    let archive = ArcArchive::new(Cursor::new(input))?;
    let paths = archive.file_names().collect::<Vec<_>>();
    info!(?paths, "resolved");

    assert_eq!(paths, vec!["AA/a0", "AA/a1", "AA/a2", "BB/b0", "BB/b1"]);
    assert!(archive.entries().iter().all(|e| e.file_type == FileType::Cm));
    assert_eq!(archive.entries()[3].directory.as_ref(), "BB");
    assert_eq!(archive.entries()[3].name.as_ref(), "b0");

    Ok(())
}

#[traced_test]
#[test]
fn directory_table_ignored_below_level_two() -> Result<()> {
    let mut input = nested_archive(&["a0", "b0"], &[("AA", 0), ("BB", 1)], b"BM\0\0");
    input[0x0D] = 1;

    let archive = ArcArchive::new(Cursor::new(input))?;
    assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["a0", "b0"]);

    Ok(())
}

#[traced_test]
#[test]
fn unknown_signatures_fall_back() -> Result<()> {
    let input = nested_archive(&["x"], &[], b"\x89PNG");
    let archive = ArcArchive::new(Cursor::new(input))?;

    assert_eq!(archive.entries()[0].file_type, FileType::Unknown);
    assert_eq!(archive.entries()[0].file_name(), "x.bin");

    Ok(())
}

#[traced_test]
#[test]
fn mask_archive_forces_type() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let input = nested_archive(&["m0", "m1"], &[], b"BM\0\0");

    let path = dir.path().join("Mask.Arc");
    fs::write(&path, &input)?;
    let mask = ArcArchive::open(&path)?;
    assert!(mask
        .entries()
        .iter()
        .all(|e| e.file_type == FileType::MaskImage));

    let path = dir.path().join("other.arc");
    fs::write(&path, &input)?;
    let other = ArcArchive::open(&path)?;
    assert!(other.entries().iter().all(|e| e.file_type == FileType::Bmp));

    Ok(())
}

#[traced_test]
#[test]
fn entries_read_back_their_data() -> Result<()> {
    let input = nested_archive(&["one", "two"], &[("D", 1)], b"AM-data");
    let mut archive = ArcArchive::new(Cursor::new(input))?;

    let mut buffer = Vec::new();
    archive.by_name("D/two")?.read_to_end(&mut buffer)?;
    assert_eq!(buffer, b"AM-data");
    assert_eq!(archive.read_entry(0)?, b"AM-data");
    assert_eq!(archive.entries()[0].file_type, FileType::Am);

    Ok(())
}
