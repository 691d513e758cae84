/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The control surface front ends are written against.
//!
//! [`SimulationControl`] exposes the six operations a front end needs.
//! [`Simulation`] implements it over a [`SharedStore`] and a
//! [`TransmissionScheduler`], and owns the background tick loop.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::scheduler::{SchedulerError, TransmissionScheduler};
use crate::store::{read_store, write_store, MessageDefinition, MessageStore, SharedStore, StoreError};
use crate::transport::{self, CanTransport};

// ── SimulationControl ─────────────────────────────────────────────────────────

/// Operations available to a front end.
///
/// Rows are addressed by position.  A front end must re-read the table with
/// [`get_all`](Self::get_all) after any successful mutation; indices it held
/// before a delete may now address a different row or none.
pub trait SimulationControl {
    /// Arm (`true`) or disarm (`false`) transmission.
    fn set_enabled(&self, enabled: bool);

    /// Append a message; returns its index.
    fn add(&self, name: &str, id: &str, payload: &str) -> Result<usize, StoreError>;

    /// Remove the message at `index`.
    fn delete(&self, index: usize) -> Result<MessageDefinition, StoreError>;

    /// Overwrite the message at `index`.
    fn modify(
        &self,
        index: usize,
        name: &str,
        id: &str,
        payload: &str,
        periodic_enabled: bool,
    ) -> Result<(), StoreError>;

    /// Copy of the current table.
    fn get_all(&self) -> Vec<MessageDefinition>;

    /// Send the message at `index` once.  `Ok(false)` when disarmed or when
    /// the transport refused the frame.
    fn trigger(&self, index: usize) -> Result<bool, SchedulerError>;
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// Store + scheduler + tick loop.
pub struct Simulation {
    store: SharedStore,
    scheduler: Arc<TransmissionScheduler>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Simulation {
    /// Assemble a disarmed simulation.  The tick loop is not running until
    /// [`start`](Self::start).
    pub fn new(store: SharedStore, scheduler: TransmissionScheduler) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            store,
            scheduler: Arc::new(scheduler),
            shutdown,
            task: None,
        }
    }

    /// Open the database and the channel named by `config`.
    ///
    /// A channel that cannot be opened is logged and the simulation runs
    /// without one; every send is then reported as failed.
    ///
    /// # Errors
    /// Only database failures are fatal.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = MessageStore::open(&config.database)
            .with_context(|| format!("Cannot open message database {}", config.database.display()))?
            .into_shared();

        let transport: Option<Box<dyn CanTransport>> = match transport::open(&config.transport) {
            Ok(t) => Some(t),
            Err(e) => {
                error!("Could not open {} CAN channel: {e}", config.transport.interface);
                None
            }
        };

        let scheduler =
            TransmissionScheduler::new(Arc::clone(&store), transport).with_tick(config.tick);
        Ok(Self::new(store, scheduler))
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn scheduler(&self) -> &Arc<TransmissionScheduler> {
        &self.scheduler
    }

    /// Spawn the tick loop on the current tokio runtime.  Calling it again
    /// while the loop runs does nothing.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let rx = self.shutdown.subscribe();
        self.task = Some(tokio::spawn(Arc::clone(&self.scheduler).run(rx)));
        info!("Simulation loop running");
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the tick loop and wait for it to finish.
    pub async fn shutdown(mut self) {
        self.scheduler.disarm();
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("scheduler task ended abnormally: {e}");
            }
        }
    }
}

impl SimulationControl for Simulation {
    fn set_enabled(&self, enabled: bool) {
        self.scheduler.set_armed(enabled);
    }

    fn add(&self, name: &str, id: &str, payload: &str) -> Result<usize, StoreError> {
        write_store(&self.store).add(name, id, payload)
    }

    fn delete(&self, index: usize) -> Result<MessageDefinition, StoreError> {
        write_store(&self.store).delete(index)
    }

    fn modify(
        &self,
        index: usize,
        name: &str,
        id: &str,
        payload: &str,
        periodic_enabled: bool,
    ) -> Result<(), StoreError> {
        write_store(&self.store).modify(index, name, id, payload, periodic_enabled)
    }

    fn get_all(&self) -> Vec<MessageDefinition> {
        read_store(&self.store).snapshot()
    }

    fn trigger(&self, index: usize) -> Result<bool, SchedulerError> {
        self.scheduler.trigger(index)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
