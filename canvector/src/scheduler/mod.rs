/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Transmission scheduler.
//!
//! [`TransmissionScheduler`] resends every row flagged `periodic_enabled` once
//! per tick while armed, and sends single rows on request.  It only ever reads
//! the [`SharedStore`]; the periodic rows are copied out under the read lock
//! and the lock is released before anything is sent.
//!
//! # States
//!
//! ```text
//!            arm()
//! Disarmed ─────────► Armed
//!    ▲                  │
//!    └──────────────────┘
//!           disarm()
//! ```
//!
//! While disarmed, periodic and one-shot sends are accepted and dropped.
//! Nothing is queued for later.
//!
//! # Failure policy
//! A row that cannot be sent (no channel, link down, rejected frame) is logged
//! and skipped.  There is no retry and the error never leaves the scheduler;
//! the tick continues with the next row.
//!
//! # Cadence
//! Every periodic row is sent once per tick regardless of its stored
//! `period_ms`.  [`run`](TransmissionScheduler::run) awaits each tick before
//! waiting for the next and skips missed ticks, so ticks never overlap.
//!
//! # Example
//! ```rust,ignore
//! let scheduler = Arc::new(TransmissionScheduler::new(store, Some(transport)));
//! scheduler.arm();
//! tokio::spawn(Arc::clone(&scheduler).run(shutdown_rx));
//! scheduler.trigger(0)?;
//! ```

pub mod error;

pub use error::{SchedulerError, SendError};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::frame::CanFrame;
use crate::store::{read_store, MessageDefinition, SharedStore};
use crate::transport::{CanTransport, TransportError};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default tick period.
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

// ── State ─────────────────────────────────────────────────────────────────────

/// Whether sends reach the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Armed,
    Disarmed,
}

// ── TransmissionScheduler ─────────────────────────────────────────────────────

/// Periodic and one-shot sender over a shared message store.
///
/// `Send + Sync`: the armed flag is atomic and the transport sits behind a
/// mutex, so one instance is shared by the front end and the tick loop.
pub struct TransmissionScheduler {
    store: SharedStore,
    transport: Mutex<Option<Box<dyn CanTransport>>>,
    armed: AtomicBool,
    tick: Duration,
}

impl TransmissionScheduler {
    /// Create a disarmed scheduler.  `transport` is `None` when no channel
    /// could be opened; every send then fails with
    /// [`TransportError::NotOpen`] and is logged.
    pub fn new(store: SharedStore, transport: Option<Box<dyn CanTransport>>) -> Self {
        Self {
            store,
            transport: Mutex::new(transport),
            armed: AtomicBool::new(false),
            tick: DEFAULT_TICK,
        }
    }

    /// Use `tick` instead of [`DEFAULT_TICK`].  Zero is raised to 1 ms.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick.max(Duration::from_millis(1));
        self
    }

    pub fn tick_period(&self) -> Duration {
        self.tick
    }

    // ── State machine ─────────────────────────────────────────────────────────

    pub fn arm(&self) {
        self.set_armed(true);
    }

    pub fn disarm(&self) {
        self.set_armed(false);
    }

    pub fn set_armed(&self, armed: bool) {
        let was = self.armed.swap(armed, Ordering::SeqCst);
        if was != armed {
            info!(
                state = ?self.state(),
                "Simulation {}",
                if armed { "started" } else { "stopped" }
            );
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SchedulerState {
        if self.is_armed() {
            SchedulerState::Armed
        } else {
            SchedulerState::Disarmed
        }
    }

    /// Swap the channel, e.g. after reopening hardware.
    pub fn replace_transport(&self, transport: Option<Box<dyn CanTransport>>) {
        *self.transport.lock().unwrap_or_else(PoisonError::into_inner) = transport;
    }

    // ── Sending ───────────────────────────────────────────────────────────────

    /// One periodic pass: send every periodic row in table order.
    ///
    /// Returns the number of rows that reached the transport.
    pub fn tick(&self) -> usize {
        if !self.is_armed() {
            return 0;
        }

        let rows = read_store(&self.store).periodic_rows();
        let mut sent = 0usize;
        for row in &rows {
            if self.send_message(row) {
                sent += 1;
            }
        }

        debug!(periodic = rows.len(), sent, "tick");
        sent
    }

    /// Send `id` / `payload` once.  Returns `true` if the frame reached the
    /// transport; `false` when disarmed or when the send failed (logged).
    pub fn send_row(&self, id: &str, payload: &str) -> bool {
        self.send_message(&MessageDefinition::new("", id, payload))
    }

    fn send_message(&self, row: &MessageDefinition) -> bool {
        let (id, payload) = (row.id.as_str(), row.payload.as_str());
        if !self.is_armed() {
            debug!(id, "simulation not active, message dropped");
            return false;
        }

        match self.transmit(row) {
            Ok(frame) => {
                info!(frame = %frame, "Message sent: [{id}] {payload}");
                true
            }
            Err(e) => {
                error!("Error! Message not sent: {id}: {e}");
                false
            }
        }
    }

    /// Send the row currently at `index` once.
    ///
    /// # Errors
    /// [`SchedulerError::IndexOutOfRange`] if `index` does not address a row
    /// at the time of the call.  A transport failure is not an error here; it
    /// is logged and reported as `Ok(false)`.
    pub fn trigger(&self, index: usize) -> Result<bool, SchedulerError> {
        let row = {
            let store = read_store(&self.store);
            store
                .get(index)
                .cloned()
                .ok_or(SchedulerError::IndexOutOfRange {
                    index,
                    len: store.len(),
                })?
        };
        Ok(self.send_message(&row))
    }

    fn transmit(&self, row: &MessageDefinition) -> Result<CanFrame, SendError> {
        let frame = row.frame()?;

        let mut guard = self.transport.lock().unwrap_or_else(PoisonError::into_inner);
        let transport = guard.as_mut().ok_or(TransportError::NotOpen)?;
        transport.flush_outbound()?;
        transport.send(&frame)?;
        Ok(frame)
    }

    // ── Tick loop ─────────────────────────────────────────────────────────────

    /// Run the periodic loop until `shutdown` becomes `true` or its sender is
    /// dropped.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            tick_ms = self.tick.as_millis() as u64,
            "Transmission scheduler started"
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !self.is_armed() {
                        continue;
                    }
                    let this = Arc::clone(&self);
                    if let Err(e) = tokio::task::spawn_blocking(move || this.tick()).await {
                        error!("scheduler tick aborted: {e}");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Transmission scheduler stopped");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
