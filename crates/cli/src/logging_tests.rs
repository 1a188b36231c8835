use super::*;
use tempfile::tempdir;

#[test]
fn stderr_mode_never_touches_the_filesystem() {
    let guard = init(true, Some("warn"), None).expect("init stderr logging");
    assert!(matches!(guard, LogGuard::Stderr));
}

#[test]
fn file_mode_creates_the_log_file_directory() {
    let dir = tempdir().expect("tempdir");
    let log_path = dir.path().join("nested").join("mesh.log");
    let guard = init(false, Some("info"), Some(&log_path)).expect("init file logging");
    assert!(matches!(guard, LogGuard::File(_)));
    assert!(log_path.parent().expect("parent").is_dir());
}
