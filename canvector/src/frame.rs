/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The CAN frame handed to a [`CanTransport`](crate::transport::CanTransport).
//!
//! ```text
//! MessageDefinition ──(frame())──►  CanFrame  ──(send)──►  transport
//!   text id / payload                 u32 id, Vec<u8>
//! ```
//!
//! Only classic CAN with standard (11-bit) identifiers is produced by this
//! crate.  The `extended` flag is carried so a transport can assert on it.

use std::fmt;

use thiserror::Error;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Largest identifier representable in a standard (11-bit) frame.
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Classic CAN carries at most 8 data bytes.
pub const MAX_DATA_LEN: usize = 8;

// ── Error type ────────────────────────────────────────────────────────────────

/// Why a frame could not be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("identifier 0x{id:X} does not fit a standard frame (max 0x{max:X})", max = MAX_STANDARD_ID)]
    IdOutOfRange { id: u32 },

    #[error("{len} data bytes exceed the classic CAN limit of {max}", max = MAX_DATA_LEN)]
    DataTooLong { len: usize },
}

// ── CanFrame ──────────────────────────────────────────────────────────────────

/// A classic CAN data frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    pub id: u32,
    pub data: Vec<u8>,
    pub extended: bool,
}

impl CanFrame {
    /// Build a standard (non-extended) data frame.
    ///
    /// # Errors
    /// [`FrameError::IdOutOfRange`] if `id > 0x7FF`,
    /// [`FrameError::DataTooLong`] if `data` has more than 8 bytes.
    pub fn standard(id: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        if id > MAX_STANDARD_ID {
            return Err(FrameError::IdOutOfRange { id });
        }
        if data.len() > MAX_DATA_LEN {
            return Err(FrameError::DataTooLong { len: data.len() });
        }
        Ok(Self {
            id,
            data,
            extended: false,
        })
    }

    /// Data length code.
    pub fn dlc(&self) -> usize {
        self.data.len()
    }
}

impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:03X}]", self.id)?;
        for byte in &self.data {
            write!(f, " {byte:02X}")?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_frame_is_not_extended() {
        let frame = CanFrame::standard(0x100, vec![1, 2, 3]).unwrap();
        assert!(!frame.extended);
        assert_eq!(frame.dlc(), 3);
    }

    #[test]
    fn highest_standard_id_is_accepted() {
        assert!(CanFrame::standard(0x7FF, vec![0]).is_ok());
    }

    #[test]
    fn eleven_bit_overflow_is_rejected() {
        assert_eq!(
            CanFrame::standard(0x800, vec![0]),
            Err(FrameError::IdOutOfRange { id: 0x800 })
        );
    }

    #[test]
    fn nine_bytes_are_rejected() {
        assert_eq!(
            CanFrame::standard(0x10, vec![0; 9]),
            Err(FrameError::DataTooLong { len: 9 })
        );
    }

    #[test]
    fn display_shows_id_and_bytes() {
        let frame = CanFrame::standard(0x1A, vec![0x00, 0xFF]).unwrap();
        assert_eq!(frame.to_string(), "[0x01A] 00 FF");
    }
}
