/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! One row of the message database.

use serde::{Deserialize, Serialize};

use crate::frame::{CanFrame, FrameError};

use super::error::ValidationError;
use super::validate::validate_message;

/// Period stored on newly added rows, in milliseconds.
pub const DEFAULT_PERIOD_MS: u32 = 100;

/// A message definition as edited by the user and stored on disk.
///
/// `id` and `payload` keep the text the user typed; numeric values are derived
/// on demand by [`frame`](Self::frame).  Field renames map onto the CSV header
/// `name,id,payload,period_en,period`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDefinition {
    pub name: String,
    pub id: String,
    pub payload: String,

    /// Resend this row on every scheduler tick while the simulation is armed.
    #[serde(rename = "period_en", with = "csv_bool")]
    pub periodic_enabled: bool,

    /// Stored and shown, but not consulted by the scheduler: every periodic
    /// row is sent once per tick.
    #[serde(rename = "period")]
    pub period_ms: u32,
}

impl MessageDefinition {
    /// A freshly added row: periodic transmission off, default period.
    pub fn new(name: impl Into<String>, id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            payload: payload.into(),
            periodic_enabled: false,
            period_ms: DEFAULT_PERIOD_MS,
        }
    }

    /// Re-run id/payload validation on this row.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_message(&self.id, &self.payload).map(|_| ())
    }

    /// Build the standard CAN frame described by this row.
    pub fn frame(&self) -> Result<CanFrame, MessageFrameError> {
        let (id, data) = validate_message(&self.id, &self.payload)?;
        Ok(CanFrame::standard(id, data)?)
    }
}

/// Changes to apply to an existing row.  `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEdit {
    pub name: Option<String>,
    pub id: Option<String>,
    pub payload: Option<String>,
    pub periodic_enabled: Option<bool>,
}

impl MessageEdit {
    /// Only toggle periodic transmission.
    pub fn periodic(enabled: bool) -> Self {
        Self {
            periodic_enabled: Some(enabled),
            ..Self::default()
        }
    }
}

impl MessageDefinition {
    /// This row with `edit` applied.  `period_ms` is carried over.
    pub fn edited(&self, edit: &MessageEdit) -> Self {
        Self {
            name: edit.name.clone().unwrap_or_else(|| self.name.clone()),
            id: edit.id.clone().unwrap_or_else(|| self.id.clone()),
            payload: edit.payload.clone().unwrap_or_else(|| self.payload.clone()),
            periodic_enabled: edit.periodic_enabled.unwrap_or(self.periodic_enabled),
            period_ms: self.period_ms,
        }
    }
}

/// Failure turning a row into a frame.
#[derive(Debug, thiserror::Error)]
pub enum MessageFrameError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// `period_en` column codec.
///
/// Files written by earlier releases use `True` / `False`; that spelling is
/// kept on write.  Reading is case-insensitive and also takes `1` / `0`.
mod csv_bool {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *value { "True" } else { "False" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(d)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(de::Error::custom(format!(
                "invalid period_en value '{other}'"
            ))),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
