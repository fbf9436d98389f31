use std::fs;
use std::io::Cursor;
use std::path::Path;

use mai_arc::{
    build_from_directory, error::Error, ArcArchive, ExtractOptions, FileType,
};
use miette::{IntoDiagnostic, Result};
use pretty_assertions::assert_eq;
use tracing::{info, instrument};
use tracing_test::traced_test;
use walkdir::WalkDir;

fn populate(root: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let files = vec![
        ("bg.cm".to_owned(), b"CM\x20\x00 background".to_vec()),
        ("chara/face.bmp".to_owned(), b"BM face pixels".to_vec()),
        ("chara/mask.msk".to_owned(), vec![0xB4, 0x10, 0x00, 0x00, 0x01]),
        ("notes.txt".to_owned(), b"plain text".to_vec()),
    ];

    for (name, data) in &files {
        let path = root.join(name);
        fs::create_dir_all(path.parent().unwrap()).into_diagnostic()?;
        fs::write(path, data).into_diagnostic()?;
    }

    Ok(files)
}

#[instrument(skip_all)]
fn files_below(root: &Path) -> Vec<String> {
    let mut names = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect::<Vec<_>>();
    names.sort();
    names
}

#[traced_test]
#[test]
fn pack_then_resolve() -> Result<()> {
    let source = tempfile::tempdir().into_diagnostic()?;
    let files = populate(source.path())?;

    let packed = build_from_directory(source.path())?;
    let mut archive = ArcArchive::new(Cursor::new(packed))?;
    assert_eq!(archive.len(), files.len());

    for (name, data) in &files {
        let stem = name.rsplit_once('.').map_or(name.as_str(), |(s, _)| s);
        info!("comparing {stem}");

        let index = archive
            .index_for_name(stem)
            .ok_or(Error::CustomError(format!("{stem} missing")))?;
        assert_eq!(&archive.read_entry(index)?, data);
    }

    let types = archive
        .entries()
        .iter()
        .map(|e| (e.path.to_string(), e.file_type))
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            ("bg".to_owned(), FileType::Cm),
            ("chara/face".to_owned(), FileType::Bmp),
            ("chara/mask".to_owned(), FileType::Msk),
            ("notes".to_owned(), FileType::Unknown),
        ]
    );

    Ok(())
}

#[traced_test]
#[test]
fn pack_then_extract() -> Result<()> {
    let source = tempfile::tempdir().into_diagnostic()?;
    let target = tempfile::tempdir().into_diagnostic()?;
    populate(source.path())?;

    let packed = build_from_directory(source.path())?;
    let mut archive = ArcArchive::new(Cursor::new(packed))?;

    let report = archive.extract_all(target.path(), ExtractOptions::default())?;
    assert!(report.is_complete());
    assert_eq!(report.extracted.len(), 4);

    assert_eq!(
        files_below(target.path()),
        vec!["bg.cm", "chara/face.bmp", "chara/mask.msk", "notes.bin"]
    );
    assert_eq!(
        fs::read(target.path().join("notes.bin")).into_diagnostic()?,
        b"plain text"
    );

    Ok(())
}

#[traced_test]
#[test]
fn extract_refuses_to_overwrite() -> Result<()> {
    let source = tempfile::tempdir().into_diagnostic()?;
    let target = tempfile::tempdir().into_diagnostic()?;
    populate(source.path())?;
    fs::write(target.path().join("bg.cm"), b"existing").into_diagnostic()?;

    let packed = build_from_directory(source.path())?;
    let mut archive = ArcArchive::new(Cursor::new(packed))?;

    let report = archive.extract_all(target.path(), ExtractOptions::default())?;
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].path, "bg");
    assert_eq!(report.extracted.len(), 3);
    assert_eq!(
        fs::read(target.path().join("bg.cm")).into_diagnostic()?,
        b"existing"
    );

    let report = archive.extract_all(
        target.path(),
        ExtractOptions::builder().overwrite(true).build(),
    )?;
    assert!(report.is_complete());
    assert_eq!(
        fs::read(target.path().join("bg.cm")).into_diagnostic()?,
        b"CM\x20\x00 background"
    );

    Ok(())
}

#[traced_test]
#[test]
fn empty_directory_cannot_be_packed() -> Result<()> {
    let source = tempfile::tempdir().into_diagnostic()?;
    assert!(matches!(
        build_from_directory(source.path()),
        Err(Error::EntryCount(0))
    ));
    Ok(())
}
