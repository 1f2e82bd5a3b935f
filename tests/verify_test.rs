//! Archive integrity checks.

mod common;

use common::{fixtures, TestWorkspace};
use gbdedup::services::{DuplicateIndex, Pipeline};
use pretty_assertions::assert_eq;
use quad_shade::{RleRecord, Run};

fn archived_pair() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.add_image("left.png", &fixtures::bright_left());
    ws.add_image("top.png", &fixtures::bright_top());
    ws.archive(1, 1);
    ws
}

#[test]
fn test_fresh_archive_is_clean() {
    let ws = archived_pair();
    let report = ws.open_archive().verify(Pipeline::default().hasher()).unwrap();

    assert!(report.is_clean(), "{report:?}");
    assert_eq!(report.checked, 2);
}

#[test]
fn test_missing_record_is_reported() {
    let ws = archived_pair();
    std::fs::remove_file(ws.archive_dir().join("002.rle")).unwrap();

    let report = ws.open_archive().verify(Pipeline::default().hasher()).unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.missing, vec!["002.rle".to_string()]);
    assert!(report.corrupt.is_empty());
}

#[test]
fn test_truncated_record_is_corrupt() {
    let ws = archived_pair();
    let path = ws.archive_dir().join("001.rle");
    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let report = ws.open_archive().verify(Pipeline::default().hasher()).unwrap();

    let corrupt: Vec<&str> = report.corrupt.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(corrupt, vec!["001.rle"]);
}

#[test]
fn test_oversized_record_is_corrupt_not_fatal() {
    let ws = archived_pair();
    let side = u32::MAX;
    let huge = RleRecord::new(side, side, vec![Run::new(0, side as u64 * side as u64)]);
    std::fs::write(ws.archive_dir().join("001.rle"), huge.to_bytes()).unwrap();

    let report = ws.open_archive().verify(Pipeline::default().hasher()).unwrap();

    let corrupt: Vec<&str> = report.corrupt.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(corrupt, vec!["001.rle"]);
    assert!(report.corrupt[0].1.contains("too large"));
    assert!(report.mismatched.is_empty());
}

#[test]
fn test_replaced_record_is_mismatched() {
    let ws = archived_pair();
    // A valid record of a different picture under an existing name.
    let flat = RleRecord::new(fixtures::SIZE, fixtures::SIZE, vec![Run::new(2, 64 * 64)]);
    std::fs::write(ws.archive_dir().join("002.rle"), flat.to_bytes()).unwrap();

    let report = ws.open_archive().verify(Pipeline::default().hasher()).unwrap();

    assert_eq!(report.mismatched, vec!["002.rle".to_string()]);
    assert!(report.missing.is_empty());
}

#[test]
fn test_unindexed_record_is_orphan() {
    let ws = archived_pair();
    let index_path = ws.archive_dir().join("hashes.json");
    let mut index = DuplicateIndex::new();
    let kept = DuplicateIndex::load(&index_path).unwrap().get("001.rle").unwrap();
    assert!(index.insert_if_novel("001.rle", kept, 1));
    index.save(&index_path).unwrap();

    let report = ws.open_archive().verify(Pipeline::default().hasher()).unwrap();

    assert_eq!(report.checked, 1);
    assert_eq!(report.orphans, vec!["002.rle".to_string()]);
    assert!(!report.is_clean());
}

#[test]
fn test_empty_archive_is_clean() {
    let ws = TestWorkspace::new();
    let report = ws.open_archive().verify(Pipeline::default().hasher()).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.checked, 0);
}
