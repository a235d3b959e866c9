//! File logging setup.
//!
//! Environment variables used:
//! - LOG_MODE: "stdout" (default) or "file"
//! - LOG_LEVEL: log level; default is "info"
//! - LOG_FILE_PATH: when using file mode, the path of the log file
//!
//! A process can install only one logger, so this is the only test in the
//! binary that calls `setup_logging`.
use chrono::Utc;
use serial_test::serial;
use soldrop::logging::{rolled_file_path, setup_logging};
use std::{env, fs, path::Path};
use tempfile::tempdir;

#[test]
#[serial]
fn test_setup_logging_file_mode_creates_rolled_log_file() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("logs").join("soldrop.log");
    env::set_var("LOG_MODE", "file");
    env::set_var("LOG_LEVEL", "debug");
    env::set_var("LOG_FILE_PATH", base.to_str().unwrap());

    setup_logging().unwrap();
    log::info!("file logging works");

    let expected = rolled_file_path(base.to_str().unwrap(), Utc::now());
    assert!(
        Path::new(&expected).exists(),
        "Expected log file {} does not exist",
        expected
    );
    assert!(setup_logging().is_err());

    env::remove_var("LOG_MODE");
    env::remove_var("LOG_LEVEL");
    env::remove_var("LOG_FILE_PATH");
    let _ = fs::remove_dir_all(dir.path());
}
