use std::{fs, thread::sleep, time::Duration};

use serial_test::serial;
use tempfile::tempdir;

// The global subscriber can only be installed once per test binary, so this
// file holds a single initialising test.
#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sketch.log");

    layered_sketch::logging::init(true, Some(path.clone()));
    tracing::info!("canvas ready");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("canvas ready"));
}
