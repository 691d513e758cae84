/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error types for the transmission scheduler.
//!
//! * [`SendError`]: why one row did not reach the bus.  Never propagated out
//!   of the scheduler; it is logged at the send boundary and the tick moves on.
//! * [`SchedulerError`]: returned to the caller of
//!   [`TransmissionScheduler::trigger`](super::TransmissionScheduler::trigger).

use thiserror::Error;

use crate::store::message::MessageFrameError;
use crate::transport::TransportError;

/// Why a single send attempt failed.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("cannot build frame: {0}")]
    Frame(#[from] MessageFrameError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Error returned from a one-shot trigger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The index no longer addresses a row (the table shrank since the caller
    /// read it).
    #[error("no message at index {index} (table has {len} row(s))")]
    IndexOutOfRange { index: usize, len: usize },
}
