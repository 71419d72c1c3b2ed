//! Line-oriented JSON helpers shared by the append-only logs.

use crate::error::MemoryError;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Read every well-formed row; malformed lines are skipped with a warning.
pub(crate) fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, MemoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(err) => warn!(
                "skipping malformed log row (path={}, line={}, error={})",
                path.display(),
                index + 1,
                err
            ),
        }
    }
    Ok(records)
}

/// Count non-empty rows without decoding them.
pub(crate) fn count_records(path: &Path) -> Result<usize, MemoryError> {
    if !path.exists() {
        return Ok(0);
    }
    let file = OpenOptions::new().read(true).open(path)?;
    let mut count = 0;
    for line in BufReader::new(file).lines() {
        if !line?.trim().is_empty() {
            count += 1;
        }
    }
    Ok(count)
}

/// Append one row, creating the parent directory if needed.
pub(crate) fn append_record<T: Serialize>(path: &Path, record: &T) -> Result<(), MemoryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let line = serde_json::to_string(record)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Rewrite the whole log atomically.
pub(crate) fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), MemoryError> {
    let temp_path = temp_path(path);
    {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_path)?;
        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{line}")?;
        }
    }
    fs::rename(temp_path, path)?;
    Ok(())
}

/// Sibling path used for atomic rewrites.
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
