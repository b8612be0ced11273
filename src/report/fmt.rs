//! Fixed-width column formatting for the report table.

use chrono::Local;

/// Left-justify `s` in a field of at least `width` characters.
pub fn left(s: &str, width: usize) -> String {
    format!("{:<width$}", s)
}

/// Right-justify `s` in a field of at least `width` characters, without
/// truncation. Header labels keep their full text even when wider than the
/// column.
pub fn right(s: &str, width: usize) -> String {
    format!("{:>width$}", s)
}

/// Right-justify `s`, truncated to exactly `width` characters. Data cells
/// never widen the table.
pub fn right_trunc(s: &str, width: usize) -> String {
    format!("{:>width$.width$}", s)
}

/// Render epoch milliseconds as `YY-MM-DD HH:MM:SS` in local time.
pub fn format_timestamp(millis: u64) -> String {
    chrono::DateTime::from_timestamp(millis as i64 / 1000, 0)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string())
}
