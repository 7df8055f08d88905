use std::fs;

use tempfile::tempdir;

use super::{Journal, LogFile, MemoryJournal};

#[test]
fn test_log_file_creates_directory_and_appends() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("consumer").join("messages.log");
    let journal = LogFile::new(&path);

    journal.record("[2024-01-01 00:00:00] Consumer started");
    journal.record("[2024-01-01 00:00:01] Consumer connected to node: rabbitmq1");

    let contents = fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "[2024-01-01 00:00:00] Consumer started\n\
         [2024-01-01 00:00:01] Consumer connected to node: rabbitmq1\n"
    );
}

#[test]
fn test_log_file_appends_to_existing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("messages.log");
    fs::write(&path, "earlier\n").unwrap();

    LogFile::new(&path).record("later");

    assert_eq!(fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
}

#[test]
fn test_log_file_write_failure_does_not_panic() {
    let dir = tempdir().expect("Failed to create temp dir");
    // A directory where the file should be makes every append fail.
    let path = dir.path().join("blocked");
    fs::create_dir_all(&path).unwrap();

    LogFile::new(&path).record("dropped");
}

#[test]
fn test_log_file_keeps_its_handle_between_lines() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("messages.log");
    let moved = dir.path().join("messages.log.1");
    let journal = LogFile::new(&path);

    journal.record("first");
    fs::rename(&path, &moved).unwrap();
    journal.record("second");

    assert!(!path.exists());
    assert_eq!(fs::read_to_string(&moved).unwrap(), "first\nsecond\n");
}

#[test]
fn test_log_file_recovers_after_failed_open() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("messages.log");
    fs::create_dir_all(&path).unwrap();
    let journal = LogFile::new(&path);

    journal.record("dropped");
    fs::remove_dir(&path).unwrap();
    journal.record("kept");

    assert_eq!(fs::read_to_string(&path).unwrap(), "kept\n");
}

#[test]
fn test_memory_journal_keeps_order() {
    let journal = MemoryJournal::default();
    journal.record("one");
    journal.record("two");
    assert_eq!(journal.lines(), vec!["one", "two"]);
}
