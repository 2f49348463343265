// tests/logging.rs

use pgbackup::cli::LogLevel;
use pgbackup::logging::{effective_level, parse_level_str};
use tracing::Level;

#[test]
fn flag_beats_environment() {
    assert_eq!(effective_level(Some(LogLevel::Debug), Some("error")), Level::DEBUG);
    assert_eq!(effective_level(None, Some(" Warning ")), Level::WARN);
}

#[test]
fn unset_or_unknown_environment_means_info() {
    assert_eq!(effective_level(None, None), Level::INFO);
    assert_eq!(effective_level(None, Some("loud")), Level::INFO);
    assert_eq!(parse_level_str("verbose"), None);
}
