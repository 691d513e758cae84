/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! canvector – CAN message generator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── frame        – typed CAN frame handed to a transport
//! ├── store/       – CSV-backed message database + validation
//! ├── transport/   – CanTransport seam, virtual bus, open()
//! ├── scheduler/   – ARMED/DISARMED gate, periodic tick, one-shot trigger
//! ├── simulation   – SimulationControl facade used by front ends
//! ├── console      – line commands for the interactive `run` front end
//! └── config/      – optional YAML runtime configuration
//! ```

pub mod config;
pub mod console;
pub mod frame;
pub mod scheduler;
pub mod simulation;
pub mod store;
pub mod transport;

/// Application version, shown in the console banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
