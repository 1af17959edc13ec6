use std::io::Read;

use super::*;

#[test]
fn zip_roundtrips_entries() {
    let mut archive = ZipArchive::in_memory(9);
    archive.add_file("credits/credits.txt", b"hello").unwrap();
    archive.add_file("standard/walk.png", &[1, 2, 3]).unwrap();
    archive.finish().unwrap();
    assert!(archive.add_file("late.txt", b"x").is_err());

    let bytes = archive.into_bytes().unwrap();
    let mut reader = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.len(), 2);
    let mut text = String::new();
    reader
        .by_name("credits/credits.txt")
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(text, "hello");
}

#[test]
fn unfinished_zip_has_no_bytes() {
    let archive = ZipArchive::in_memory(1);
    assert!(archive.into_bytes().is_err());
}

#[test]
fn memory_archive_can_reject_paths() {
    let mut archive = MemoryArchive::failing_on("walk");
    assert!(archive.add_file("standard/walk.png", b"x").is_err());
    archive.add_file("standard/run.png", b"y").unwrap();
    archive.finish().unwrap();
    assert!(archive.is_finished());
    assert_eq!(archive.paths().collect::<Vec<_>>(), ["standard/run.png"]);
    assert_eq!(archive.file("standard/run.png"), Some(&b"y"[..]));
}
