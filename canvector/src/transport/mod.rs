/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! CAN channel seam.
//!
//! The scheduler only talks to a `Box<dyn CanTransport>`.  A hardware binding
//! plugs in by implementing the trait and adding an [`Interface`] arm to
//! [`open`].  This crate ships [`VirtualBus`], an in-process bus that records
//! every frame it transmits.

pub mod error;
pub mod virtual_bus;

pub use error::TransportError;
pub use virtual_bus::{BusLog, VirtualBus};

use std::fmt;

use serde::Deserialize;
use tracing::info;

use crate::frame::CanFrame;

// ── Defaults ──────────────────────────────────────────────────────────────────

pub const DEFAULT_CHANNEL: u32 = 0;
pub const DEFAULT_BITRATE: u32 = 500_000;
pub const DEFAULT_APP_NAME: &str = "CANoe";

// ── CanTransport ──────────────────────────────────────────────────────────────

/// An open CAN channel.
pub trait CanTransport: Send {
    /// Drop anything still waiting in the transmit queue so a fresh frame is
    /// not preceded by a stale retransmission.
    fn flush_outbound(&mut self) -> Result<(), TransportError>;

    /// Hand one frame to the channel.
    fn send(&mut self, frame: &CanFrame) -> Result<(), TransportError>;
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Kind of channel to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interface {
    /// In-process [`VirtualBus`].
    #[default]
    Virtual,
    /// Vector hardware (CANoe application channel).
    Vector,
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interface::Virtual => write!(f, "virtual"),
            Interface::Vector => write!(f, "vector"),
        }
    }
}

/// Parameters for [`open`].  Only standard-identifier channels are opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub interface: Interface,
    pub channel: u32,
    pub bitrate: u32,
    pub app_name: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            interface: Interface::default(),
            channel: DEFAULT_CHANNEL,
            bitrate: DEFAULT_BITRATE,
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }
}

/// Open the channel described by `config`.
///
/// # Errors
/// [`TransportError::DriverUnavailable`] for interfaces whose driver is not
/// present, [`TransportError::InvalidConfig`] for unusable parameters.  The
/// caller is expected to log the error and carry on without a channel.
pub fn open(config: &TransportConfig) -> Result<Box<dyn CanTransport>, TransportError> {
    match config.interface {
        Interface::Virtual => {
            let bus = VirtualBus::new(config)?;
            info!(
                interface = %config.interface,
                channel   = config.channel,
                bitrate   = config.bitrate,
                app_name  = %config.app_name,
                "CAN channel opened"
            );
            Ok(Box::new(bus))
        }
        Interface::Vector => Err(TransportError::DriverUnavailable {
            interface: config.interface,
            app_name: config.app_name.clone(),
            channel: config.channel,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
