/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! In-process CAN bus.
//!
//! Frames go through a transmit queue like on a real controller: `send`
//! enqueues the frame and, while the link is up, drains the whole queue onto
//! the bus.  When the link is down the frame stays queued, so a later
//! successful `send` would transmit it late unless `flush_outbound` dropped it
//! first.
//!
//! Transmitted frames are counted and the most recent ones kept in a
//! [`BusLog`], a cloneable handle the owner keeps to inspect traffic or to
//! pull the link down.  The log holds at most its capacity; older frames are
//! dropped first.  A bus opened with [`VirtualBus::new`] keeps no frames, only
//! counters.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{CanTransport, TransportConfig, TransportError};
use crate::frame::CanFrame;

/// Maximum frames held in the transmit queue.
const TX_QUEUE_SIZE: usize = 32;

/// Frames retained by [`BusLog::new`].
pub const DEFAULT_LOG_CAPACITY: usize = 1024;

// ── BusLog ────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct BusState {
    frames: VecDeque<CanFrame>,
    capacity: usize,
    transmitted: u64,
    link_down: bool,
    flushes: usize,
}

/// Shared view of what a [`VirtualBus`] has put on the wire.
#[derive(Debug, Clone)]
pub struct BusLog {
    state: Arc<Mutex<BusState>>,
}

impl Default for BusLog {
    fn default() -> Self {
        Self::new()
    }
}

impl BusLog {
    /// A log keeping the last [`DEFAULT_LOG_CAPACITY`] frames.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }

    /// A log keeping the last `capacity` frames.  Zero keeps counters only.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                frames: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
                capacity,
                transmitted: 0,
                link_down: false,
                flushes: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retained frames, oldest first.
    pub fn frames(&self) -> Vec<CanFrame> {
        self.lock().frames.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().frames.is_empty()
    }

    /// Frames put on the wire since the bus was opened, retained or not.
    pub fn transmitted(&self) -> u64 {
        self.lock().transmitted
    }

    /// Number of retained frames carrying `id`.
    pub fn count_id(&self, id: u32) -> usize {
        self.lock().frames.iter().filter(|f| f.id == id).count()
    }

    /// Number of `flush_outbound` calls seen by the bus.
    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }

    /// Simulate losing (`false`) or regaining (`true`) the bus.
    pub fn set_link_up(&self, up: bool) {
        self.lock().link_down = !up;
    }
}

impl BusState {
    fn record(&mut self, frame: CanFrame) {
        self.transmitted += 1;
        if self.capacity == 0 {
            return;
        }
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }
}

// ── VirtualBus ────────────────────────────────────────────────────────────────

/// A software CAN channel.
#[derive(Debug)]
pub struct VirtualBus {
    channel: u32,
    tx_queue: VecDeque<CanFrame>,
    log: BusLog,
}

impl VirtualBus {
    /// Open a bus that counts traffic without keeping frames.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        Self::with_log(config, BusLog::with_capacity(0))
    }

    /// Open a bus that records into `log`.
    ///
    /// # Errors
    /// [`TransportError::InvalidConfig`] for a zero bitrate.
    pub fn with_log(config: &TransportConfig, log: BusLog) -> Result<Self, TransportError> {
        if config.bitrate == 0 {
            return Err(TransportError::InvalidConfig(
                "bitrate must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            channel: config.channel,
            tx_queue: VecDeque::with_capacity(TX_QUEUE_SIZE),
            log,
        })
    }

    /// Handle onto this bus's traffic.
    pub fn log(&self) -> BusLog {
        self.log.clone()
    }

    /// Frames waiting in the transmit queue.
    pub fn pending(&self) -> usize {
        self.tx_queue.len()
    }
}

impl CanTransport for VirtualBus {
    fn flush_outbound(&mut self) -> Result<(), TransportError> {
        if !self.tx_queue.is_empty() {
            debug!(
                channel = self.channel,
                dropped = self.tx_queue.len(),
                "flushing stale frames"
            );
        }
        self.tx_queue.clear();
        self.log.lock().flushes += 1;
        Ok(())
    }

    fn send(&mut self, frame: &CanFrame) -> Result<(), TransportError> {
        if frame.extended {
            return Err(TransportError::Rejected {
                reason: "channel is opened for standard identifiers only".to_string(),
            });
        }
        if self.tx_queue.len() >= TX_QUEUE_SIZE {
            return Err(TransportError::Rejected {
                reason: "transmit queue full".to_string(),
            });
        }
        self.tx_queue.push_back(frame.clone());

        let mut state = self.log.lock();
        if state.link_down {
            return Err(TransportError::LinkDown {
                channel: self.channel,
            });
        }
        while let Some(queued) = self.tx_queue.pop_front() {
            debug!(channel = self.channel, frame = %queued, "tx");
            state.record(queued);
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
