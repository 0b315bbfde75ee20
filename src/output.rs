//! Output formatting and persistence for CLI calls.
//!
//! Decoded documents go to stdout as pretty JSON; each call can also be
//! appended as a row to a CSV log.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::NetworkError;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// One executed call, as written to the CSV log.
#[derive(Debug, Serialize)]
pub struct CallRecord {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    /// `ok`, or the [`NetworkError::kind`] label.
    pub outcome: String,
    pub elapsed_ms: u64,
    pub error_message: Option<String>,
}

impl CallRecord {
    pub fn success(method: &str, url: &str, elapsed: Duration) -> Self {
        CallRecord {
            timestamp: Utc::now(),
            method: method.to_string(),
            url: url.to_string(),
            outcome: "ok".to_string(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            error_message: None,
        }
    }

    /// Create an error record with timestamp and error information
    pub fn from_error(method: &str, url: &str, elapsed: Duration, error: &NetworkError) -> Self {
        CallRecord {
            outcome: error.kind().to_string(),
            error_message: Some(error.to_string()),
            ..Self::success(method, url, elapsed)
        }
    }
}

/// Writes `value` to stdout as pretty-printed JSON followed by a newline.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write_json(&mut stdout, value)
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Appends a [`CallRecord`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &str, record: &CallRecord) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorEnvelope;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_write_json_is_pretty() {
        let mut buf = Vec::new();
        write_json(&mut buf, &serde_json::json!({"id": 1})).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\n  \"id\": 1\n}\n");
    }

    #[test]
    fn test_error_record_carries_kind() {
        let err = NetworkError::Server(ErrorEnvelope {
            message: Some("not found".to_string()),
        });
        let record = CallRecord::from_error(
            "POST",
            "https://api.example.com/items",
            Duration::from_millis(12),
            &err,
        );

        assert_eq!(record.outcome, "server_error");
        assert_eq!(record.elapsed_ms, 12);
        assert_eq!(record.error_message.as_deref(), Some("server error: not found"));
    }

    #[test]
    fn test_append_record_writes_header_once() {
        let path = temp_path("typed_fetch_test_header.csv");
        let _ = fs::remove_file(&path);

        let record = CallRecord::success("GET", "https://api.example.com", Duration::ZERO);
        append_record(&path, &record).unwrap();
        append_record(&path, &record).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // Header line should appear exactly once
        let header_count = content.lines().filter(|l| l.contains("timestamp")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 data rows
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }
}
