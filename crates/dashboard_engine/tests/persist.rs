use std::fs;

use dashboard_engine::{ensure_state_dir, read_state, write_atomic};
use tempfile::TempDir;

#[test]
fn creates_missing_state_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("state");
    assert!(!dir.exists());
    ensure_state_dir(&dir).unwrap();
    assert!(dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();

    let first = write_atomic(temp.path(), "filters.ron", "(search: \"a\")").unwrap();
    assert_eq!(first.file_name().unwrap(), "filters.ron");

    let second = write_atomic(temp.path(), "filters.ron", "(search: \"b\")").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "(search: \"b\")");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn write_into_a_file_path_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let not_a_dir = temp.path().join("not_a_dir");
    fs::write(&not_a_dir, "x").unwrap();

    assert!(write_atomic(&not_a_dir, "filters.ron", "data").is_err());
    assert_eq!(fs::read_to_string(&not_a_dir).unwrap(), "x");
}

#[test]
fn missing_state_reads_as_none() {
    let temp = TempDir::new().unwrap();
    assert_eq!(read_state(temp.path(), "absent.ron").unwrap(), None);

    write_atomic(temp.path(), "present.ron", "()").unwrap();
    assert_eq!(
        read_state(temp.path(), "present.ron").unwrap().as_deref(),
        Some("()")
    );
}
