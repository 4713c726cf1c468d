//! Tests for IndexBuilder
//!
//! These tests verify:
//! - Offsets recorded for every line
//! - Page boundaries at exactly P and P+1 lines
//! - Handling of a final unterminated line and empty files
//! - Stale pages removed on rebuild

use std::fs;
use std::path::PathBuf;

use lineserve::index::{BuildSummary, IndexBuilder, IndexStore};
use lineserve::LineError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_source(content: &str) -> (TempDir, PathBuf, IndexStore) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("lines.txt");
    fs::write(&path, content).unwrap();
    let store = IndexStore::for_source(&path).unwrap();
    (temp_dir, path, store)
}

/// "line0\nline1\n..." with `count` lines
fn numbered_lines(count: usize) -> String {
    (0..count).map(|i| format!("line{}\n", i)).collect()
}

// =============================================================================
// Offset Tests
// =============================================================================

#[test]
fn test_offsets_small_file() {
    let (_temp, path, store) = setup_source("a\nb\nc\nd\ne\n");

    let summary = IndexBuilder::new(&store, 1000).unwrap().build(&path).unwrap();

    assert_eq!(summary, BuildSummary { num_lines: 5, num_pages: 1 });
    assert_eq!(store.read_page(0).unwrap().offsets, vec![0, 2, 4, 6, 8]);
}

#[test]
fn test_offsets_variable_length_lines() {
    let (_temp, path, store) = setup_source("hello\n\nworld!!\r\nx\n");

    IndexBuilder::new(&store, 10).unwrap().build(&path).unwrap();

    assert_eq!(store.read_page(0).unwrap().offsets, vec![0, 6, 7, 16]);
}

#[test]
fn test_final_line_without_newline_counts() {
    let (_temp, path, store) = setup_source("a\nb\nlast");

    let summary = IndexBuilder::new(&store, 10).unwrap().build(&path).unwrap();

    assert_eq!(summary.num_lines, 3);
    assert_eq!(store.read_page(0).unwrap().offsets, vec![0, 2, 4]);
}

#[test]
fn test_empty_file_writes_no_pages() {
    let (_temp, path, store) = setup_source("");

    let summary = IndexBuilder::new(&store, 10).unwrap().build(&path).unwrap();

    assert_eq!(summary, BuildSummary { num_lines: 0, num_pages: 0 });
    assert!(store.page_numbers().unwrap().is_empty());
}

// =============================================================================
// Page Boundary Tests
// =============================================================================

#[test]
fn test_exactly_one_full_page() {
    let (_temp, path, store) = setup_source(&numbered_lines(4));

    let summary = IndexBuilder::new(&store, 4).unwrap().build(&path).unwrap();

    assert_eq!(summary.num_pages, 1);
    assert_eq!(store.page_numbers().unwrap(), vec![0]);
    assert_eq!(store.read_page(0).unwrap().len(), 4);
}

#[test]
fn test_one_line_past_full_page() {
    let (_temp, path, store) = setup_source(&numbered_lines(5));

    let summary = IndexBuilder::new(&store, 4).unwrap().build(&path).unwrap();

    assert_eq!(summary.num_pages, 2);
    assert_eq!(store.page_numbers().unwrap(), vec![0, 1]);
    assert_eq!(store.read_page(0).unwrap().len(), 4);

    let second = store.read_page(1).unwrap();
    assert_eq!(second.len(), 1);
    // "line0\n".."line3\n" are 6 bytes each
    assert_eq!(second.offsets, vec![24]);
}

#[test]
fn test_page_size_one() {
    let (_temp, path, store) = setup_source("a\nb\nc\n");

    let summary = IndexBuilder::new(&store, 1).unwrap().build(&path).unwrap();

    assert_eq!(summary.num_pages, 3);
    for (page, offset) in [(0, 0), (1, 2), (2, 4)] {
        assert_eq!(store.read_page(page).unwrap().offsets, vec![offset]);
    }
}

#[test]
fn test_zero_page_size_rejected() {
    let (_temp, _path, store) = setup_source("a\n");

    assert!(matches!(IndexBuilder::new(&store, 0), Err(LineError::Config(_))));
}

// =============================================================================
// Rebuild Tests
// =============================================================================

#[test]
fn test_rebuild_removes_pages_from_smaller_page_size() {
    let (_temp, path, store) = setup_source(&numbered_lines(10));

    IndexBuilder::new(&store, 2).unwrap().build(&path).unwrap();
    assert_eq!(store.page_numbers().unwrap(), vec![0, 1, 2, 3, 4]);

    let summary = IndexBuilder::new(&store, 100).unwrap().build(&path).unwrap();

    assert_eq!(summary.num_pages, 1);
    assert_eq!(store.page_numbers().unwrap(), vec![0]);
    assert_eq!(store.read_page(0).unwrap().len(), 10);
}

#[test]
fn test_missing_source_fails_build() {
    let (_temp, path, store) = setup_source("a\n");
    fs::remove_file(&path).unwrap();

    let result = IndexBuilder::new(&store, 10).unwrap().build(&path);

    assert!(matches!(result, Err(LineError::Io(_))));
}
