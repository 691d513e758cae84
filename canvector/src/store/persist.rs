/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! CSV reading and atomic rewriting of the message database file.
//!
//! Writes go to a temporary file in the target's directory which is then
//! renamed over the target in one step, so the database file is never absent
//! and never half-written.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::error::StoreError;
use super::message::MessageDefinition;

/// Column names, in file order.
pub const HEADERS: [&str; 5] = ["name", "id", "payload", "period_en", "period"];

/// Read every row of `path`.
///
/// # Errors
/// [`StoreError::BadHeader`] if the header is not [`HEADERS`],
/// [`StoreError::Csv`] for unreadable or malformed rows,
/// [`StoreError::InvalidRow`] for a row that fails id/payload validation.
pub fn read_table(path: &Path) -> Result<Vec<MessageDefinition>, StoreError> {
    let csv_err = |source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?.clone();
    if !headers.iter().eq(HEADERS.iter().copied()) {
        return Err(StoreError::BadHeader {
            path: path.to_path_buf(),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut rows = Vec::new();
    for (row, record) in reader.deserialize::<MessageDefinition>().enumerate() {
        let message = record.map_err(csv_err)?;
        message.validate().map_err(|source| StoreError::InvalidRow {
            path: path.to_path_buf(),
            row,
            source,
        })?;
        rows.push(message);
    }

    debug!(path = %path.display(), rows = rows.len(), "database read");
    Ok(rows)
}

/// Replace the contents of `path` with `rows`.
///
/// On error the previous file is left as it was.
pub fn write_table(path: &Path, rows: &[MessageDefinition]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut tmp);
        let csv_err = |source| StoreError::Csv {
            path: path.to_path_buf(),
            source,
        };
        writer.write_record(HEADERS).map_err(csv_err)?;
        for row in rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(io_err)?;
    }

    tmp.flush().map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), rows = rows.len(), "database written");
    Ok(())
}

/// Directory holding `path`; `.` for a bare file name.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
