use std::io::Write;
use std::time::Duration;

use tempfile::NamedTempFile;

use crate::config::{load_and_validate_config, load_config, SessionConfig};
use crate::errors::ConfigError;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp config");
    file
}

#[test]
fn defaults_apply_to_empty_document() {
    let file = write_config("{}");
    let config = load_and_validate_config(file.path()).unwrap();

    assert_eq!(config, SessionConfig::default());
    assert_eq!(config.loop_thread_name, "debuggee-flow");
    assert_eq!(config.wait_timeout(), None);
    assert!(config.warn_on_stale_hits);
}

#[test]
fn full_document_round_trips() {
    let file = write_config(
        "loop_thread_name: session-0-loop\nwait_timeout_ms: 30000\nwarn_on_stale_hits: false\n",
    );
    let config = load_and_validate_config(file.path()).unwrap();

    assert_eq!(config.loop_thread_name, "session-0-loop");
    assert_eq!(config.wait_timeout(), Some(Duration::from_secs(30)));
    assert!(!config.warn_on_stale_hits);
}

#[test]
fn missing_file_is_io_error() {
    let result = load_config("/nonexistent/debuggee-control.yaml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn malformed_yaml_is_parse_error() {
    let file = write_config("loop_thread_name: [unterminated");
    let result = load_config(file.path());
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn zero_timeout_fails_validation() {
    let file = write_config("wait_timeout_ms: 0\n");
    let result = load_and_validate_config(file.path());
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "wait_timeout_ms",
            ..
        })
    ));
}

#[test]
fn empty_thread_name_fails_validation() {
    let file = write_config("loop_thread_name: \"  \"\n");
    let result = load_and_validate_config(file.path());
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "loop_thread_name",
            ..
        })
    ));
}
