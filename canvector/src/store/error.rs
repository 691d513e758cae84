/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error types for the message database.
//!
//! Two enums model the two failure layers:
//!
//! * [`ValidationError`]: why a single id/payload pair was refused.  The
//!   table is never touched when one of these is returned.
//! * [`StoreError`]: top-level failure of a store operation.  Storage
//!   variants (`Io`, `Csv`, `BadHeader`, `InvalidRow`) abort the call and leave
//!   both the file and the in-memory table at their previous state.

use std::path::PathBuf;

use thiserror::Error;

// ── Validation ────────────────────────────────────────────────────────────────

/// Detailed reason why a message id or payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The id does not carry exactly one `0x` marker followed by digits.
    #[error("id '{id}' is not a valid hex value")]
    IdNotHex { id: String },

    /// The id has the marker but the digits are not hexadecimal.
    #[error("id '{id}' contains invalid characters")]
    IdInvalidChars { id: String },

    /// The id parses but does not fit an 11-bit standard identifier.
    #[error("id '{id}' exceeds the standard identifier range (max 0x7FF)")]
    IdOutOfRange { id: String },

    /// The payload does not have the `0x.. 0x.. ...` layout, or has more than
    /// eight tokens.
    #[error("payload '{payload}' is in incorrect format")]
    PayloadFormat { payload: String },

    /// A payload token is not a `0x`-prefixed hex number.
    #[error("payload token '{token}' contains invalid characters")]
    PayloadInvalidChars { token: String },

    /// A payload token parses but is larger than one byte.
    #[error("payload token '{token}' does not fit in one byte")]
    ByteOutOfRange { token: String },
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Error returned by [`MessageStore`](super::MessageStore) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input failed validation; nothing was changed.
    #[error("message rejected: {0}")]
    Invalid(#[from] ValidationError),

    /// A positional index did not address an existing row.
    #[error("no message at index {index} (table has {len} row(s))")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The file header is not `name,id,payload,period_en,period`.
    #[error("unexpected header in {}: [{found}]", .path.display())]
    BadHeader { path: PathBuf, found: String },

    /// A row loaded from disk does not hold a valid message.
    #[error("row {row} of {} is not a valid message: {source}", .path.display())]
    InvalidRow {
        path: PathBuf,
        row: usize,
        #[source]
        source: ValidationError,
    },
}

impl StoreError {
    /// `true` when the caller's input was refused, as opposed to a storage or
    /// addressing failure.
    pub fn is_rejected(&self) -> bool {
        matches!(self, StoreError::Invalid(_))
    }
}
