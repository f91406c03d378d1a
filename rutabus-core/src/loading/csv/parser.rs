use std::fs::File;
use std::path::Path;

use csv::{ErrorKind, Position, ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};

use crate::{Error, RecordError};

/// A deserialized row with the line it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Numbered<T> {
    pub line: u64,
    pub row: T,
}

/// Reads every well-formed row of a CSV file.
///
/// Rows that fail to parse or deserialize are reported in `skipped`
/// instead of aborting the whole file.
///
/// # Errors
///
/// Fails if the file cannot be opened or read.
pub fn deserialize_csv_file<T>(
    path: &Path,
    file: &'static str,
    skipped: &mut Vec<RecordError>,
) -> Result<Vec<Numbered<T>>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let handle = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(handle);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    let mut bad_rows = 0usize;
    let mut record = StringRecord::new();
    loop {
        match reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                let line = record.position().map_or(0, Position::line);
                match record.deserialize(Some(&headers)) {
                    Ok(row) => rows.push(Numbered { line, row }),
                    Err(err) => {
                        bad_rows += 1;
                        skipped.push(RecordError::MalformedRow {
                            file,
                            line,
                            reason: err.to_string(),
                        });
                    }
                }
            }
            Err(err) if matches!(err.kind(), ErrorKind::Io(_)) => return Err(err.into()),
            Err(err) => {
                bad_rows += 1;
                skipped.push(RecordError::MalformedRow {
                    file,
                    line: err.position().map_or(0, Position::line),
                    reason: err.to_string(),
                });
            }
        }
    }

    if bad_rows > 0 {
        warn!("{file}: skipped {bad_rows} malformed rows");
    }
    debug!("{file}: read {} rows", rows.len());
    Ok(rows)
}

/// Like [`deserialize_csv_file`], but a missing file reads as empty.
///
/// # Errors
///
/// Fails if the file exists but cannot be read.
pub fn deserialize_optional_csv_file<T>(
    path: &Path,
    file: &'static str,
    skipped: &mut Vec<RecordError>,
) -> Result<Vec<Numbered<T>>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    if path.exists() {
        deserialize_csv_file(path, file, skipped)
    } else {
        debug!("{file} not found, treating as empty");
        Ok(Vec::new())
    }
}
