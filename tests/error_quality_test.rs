//! Error message quality tests
//!
//! Tests that verify error messages are helpful and distinguishable.

use std::time::Duration;
use zfs_exporter::error::ExporterError;

#[test]
fn test_transform_error_names_property_and_value() {
    // Given: A transform failure
    let error = ExporterError::Transform {
        property: "health".to_string(),
        value: "EXPLODED".to_string(),
        reason: "unknown health state".to_string(),
    };

    // When: Converting to string
    let message = format!("{}", error);

    // Then: Both the property and the offending value are named
    assert!(message.contains("health"));
    assert!(message.contains("\"EXPLODED\""));
}

#[test]
fn test_unsupported_property_message() {
    let message = ExporterError::UnsupportedProperty("autotrim".to_string()).to_string();
    assert!(message.contains("Unsupported property"));
    assert!(message.contains("autotrim"));
}

#[test]
fn test_parse_counter_keeps_source() {
    // Given: A counter that is not a number
    let source = "x1".parse::<u64>().unwrap_err();
    let error = ExporterError::ParseCounter {
        line: "sda ONLINE 0 x1 0".to_string(),
        source,
    };

    // Then: The line is shown and the parse error is chained
    assert!(error.to_string().contains("sda ONLINE 0 x1 0"));
    assert!(std::error::Error::source(&error).is_some());
}

#[test]
fn test_command_error_message_clarity() {
    let error = ExporterError::Command {
        command: "zpool list -Ho name".to_string(),
        reason: "exit status: 1: no pools available".to_string(),
    };

    let message = error.to_string();
    assert!(message.contains("zpool list -Ho name"));
    assert!(message.contains("no pools available"));
}

#[test]
fn test_timeout_message_shows_deadline() {
    let message = ExporterError::Timeout(Duration::from_secs(8)).to_string();
    assert!(message.contains("deadline"));
    assert!(message.contains("8s"));
}

#[test]
fn test_errors_are_distinguishable() {
    let errors = [
        ExporterError::InvalidOutput("x".to_string()),
        ExporterError::UnsupportedProperty("x".to_string()),
        ExporterError::Config("x".to_string()),
        ExporterError::Timeout(Duration::from_secs(1)),
    ];
    let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    for (i, a) in messages.iter().enumerate() {
        for b in &messages[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
