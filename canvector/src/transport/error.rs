/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use thiserror::Error;

use super::Interface;

/// Failure opening a channel or handing it a frame.
///
/// None of these are retried.  The scheduler logs them and moves on to the
/// next row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// No channel could be opened at start-up, so there is nothing to send on.
    #[error("no CAN channel is open")]
    NotOpen,

    /// The hardware driver for this interface is not available in this build
    /// or on this machine.
    #[error("{interface} driver is not available (app '{app_name}', channel {channel})")]
    DriverUnavailable {
        interface: Interface,
        app_name: String,
        channel: u32,
    },

    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// The bus is not reachable (hardware not ready, cable pulled, bus-off).
    #[error("link down on channel {channel}")]
    LinkDown { channel: u32 },

    /// The channel refused this particular frame.
    #[error("frame rejected: {reason}")]
    Rejected { reason: String },
}
