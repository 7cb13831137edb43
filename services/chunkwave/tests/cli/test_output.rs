//! Tests for CLI output formatting helpers

use chunkwave::cli::output::{format_chars, format_duration, format_millis};

#[test]
fn test_format_chars_boundaries() {
    assert_eq!(format_chars(0), "0 chars");
    assert_eq!(format_chars(999), "999 chars");
    assert_eq!(format_chars(1_000), "1.0K chars");
    assert_eq!(format_chars(199_999), "200.0K chars");
    assert_eq!(format_chars(1_000_000), "1.0M chars");
}

#[test]
fn test_format_duration_various_times() {
    assert_eq!(format_duration(0.0), "0ms");
    assert_eq!(format_duration(0.001), "1ms");
    assert_eq!(format_duration(0.999), "999ms");
    assert_eq!(format_duration(1.0), "1.00s");
    assert_eq!(format_duration(59.99), "59.99s");
    assert_eq!(format_duration(120.0), "2m 0.0s");
}

#[test]
fn test_format_millis_matches_duration() {
    assert_eq!(format_millis(0), "0ms");
    assert_eq!(format_millis(1_500), "1.50s");
    assert_eq!(format_millis(90_000), "1m 30.0s");
}
