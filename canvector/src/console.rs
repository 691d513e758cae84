/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Line commands for the interactive `run` front end.
//!
//! ```text
//! start                      arm transmission
//! stop                       disarm transmission
//! list                       print the message table
//! add ID BYTE.. [NAME]       add a message, e.g. add 0x100 0x01 0x02 Heartbeat
//! modify N ID BYTE.. [NAME]  replace message N; without NAME the name is kept
//! send N                     send message N once
//! periodic N on|off          toggle periodic transmission of message N
//! delete N                   remove message N
//! help                       show this list
//! quit                       leave
//! ```
//!
//! Input is read on its own OS thread ([`spawn_line_reader`]) and handed to
//! [`drive`] over a channel, so a blocked read never holds up shutdown.

use std::future::Future;
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use crate::simulation::SimulationControl;
use crate::store::validate::HEX_MARKER;
use crate::store::{MessageDefinition, MessageEdit, StoreError};

pub const HELP: &str = "\
commands:
  start                      arm transmission
  stop                       disarm transmission
  list                       print the message table
  add ID BYTE.. [NAME]       add a message, e.g. add 0x100 0x01 0x02 Heartbeat
  modify N ID BYTE.. [NAME]  replace message N; without NAME the name is kept
  send N                     send message N once
  periodic N on|off          toggle periodic transmission of message N
  delete N                   remove message N
  help                       show this list
  quit                       leave";

/// Lines buffered between the input thread and the console loop.
const LINE_QUEUE: usize = 16;

// ── Commands ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Stop,
    List,
    Add {
        id: String,
        payload: String,
        name: String,
    },
    Modify {
        index: usize,
        id: String,
        payload: String,
        name: Option<String>,
    },
    Send(usize),
    Periodic(usize, bool),
    Delete(usize),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{command}' needs a message index")]
    MissingIndex { command: &'static str },
    #[error("'{command}' needs an identifier")]
    MissingId { command: &'static str },
    #[error("'{command}' needs at least one payload byte")]
    MissingPayload { command: &'static str },
    #[error("'{0}' is not a message index")]
    BadIndex(String),
    #[error("expected 'on' or 'off', got '{0}'")]
    BadSwitch(String),
    #[error("unexpected argument '{0}'")]
    TrailingArgument(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ParseError::Empty)?;

        let command = match head.to_ascii_lowercase().as_str() {
            "start" => ConsoleCommand::Start,
            "stop" => ConsoleCommand::Stop,
            "list" | "ls" => ConsoleCommand::List,
            "add" => {
                let id = id_arg(words.next(), "add")?;
                let (payload, name) = payload_and_name(&mut words, "add")?;
                ConsoleCommand::Add {
                    id,
                    payload,
                    name: name.unwrap_or_default(),
                }
            }
            "modify" | "mod" => {
                let index = index_arg(words.next(), "modify")?;
                let id = id_arg(words.next(), "modify")?;
                let (payload, name) = payload_and_name(&mut words, "modify")?;
                ConsoleCommand::Modify {
                    index,
                    id,
                    payload,
                    name,
                }
            }
            "send" => ConsoleCommand::Send(index_arg(words.next(), "send")?),
            "delete" | "del" => ConsoleCommand::Delete(index_arg(words.next(), "delete")?),
            "periodic" => {
                let index = index_arg(words.next(), "periodic")?;
                let enabled = match words.next() {
                    Some("on") => true,
                    Some("off") => false,
                    Some(other) => return Err(ParseError::BadSwitch(other.to_string())),
                    None => return Err(ParseError::BadSwitch(String::new())),
                };
                ConsoleCommand::Periodic(index, enabled)
            }
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };

        match words.next() {
            Some(extra) => Err(ParseError::TrailingArgument(extra.to_string())),
            None => Ok(command),
        }
    }
}

fn index_arg(word: Option<&str>, command: &'static str) -> Result<usize, ParseError> {
    let word = word.ok_or(ParseError::MissingIndex { command })?;
    word.parse()
        .map_err(|_| ParseError::BadIndex(word.to_string()))
}

fn id_arg(word: Option<&str>, command: &'static str) -> Result<String, ParseError> {
    word.map(str::to_string)
        .ok_or(ParseError::MissingId { command })
}

/// Split the remaining words into payload bytes (every leading `0x` token)
/// and an optional name made of whatever follows.
fn payload_and_name<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
) -> Result<(String, Option<String>), ParseError> {
    let rest: Vec<&str> = words.collect();
    let split = rest
        .iter()
        .position(|w| !w.starts_with(HEX_MARKER))
        .unwrap_or(rest.len());
    if split == 0 {
        return Err(ParseError::MissingPayload { command });
    }

    let payload = rest[..split].join(" ");
    let name = (split < rest.len()).then(|| rest[split..].join(" "));
    Ok((payload, name))
}

// ── Execution ─────────────────────────────────────────────────────────────────

/// What the console loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Apply `edit` to the row at `index`, keeping every field it leaves unset.
///
/// # Errors
/// [`StoreError::IndexOutOfRange`] if `index` does not address a row, or
/// whatever [`SimulationControl::modify`] reports.
pub fn apply_edit<C: SimulationControl + ?Sized>(
    sim: &C,
    index: usize,
    edit: &MessageEdit,
) -> Result<(), StoreError> {
    let rows = sim.get_all();
    let row = rows.get(index).ok_or(StoreError::IndexOutOfRange {
        index,
        len: rows.len(),
    })?;
    let next = row.edited(edit);
    sim.modify(
        index,
        &next.name,
        &next.id,
        &next.payload,
        next.periodic_enabled,
    )
}

/// Run `command` against `sim`, writing user-facing output to `out`.
///
/// Rejections and out-of-range indices are reported on `out`; only a failure
/// to write to `out` is returned as an error.
pub fn execute<C: SimulationControl + ?Sized>(
    command: ConsoleCommand,
    sim: &C,
    out: &mut impl Write,
) -> io::Result<Flow> {
    match command {
        ConsoleCommand::Start => {
            sim.set_enabled(true);
            writeln!(out, "simulation started")?;
        }
        ConsoleCommand::Stop => {
            sim.set_enabled(false);
            writeln!(out, "simulation stopped")?;
        }
        ConsoleCommand::List => render_table(&sim.get_all(), out)?,
        ConsoleCommand::Add { id, payload, name } => match sim.add(&name, &id, &payload) {
            Ok(index) => writeln!(out, "added message {index}")?,
            Err(e) => writeln!(out, "{e}")?,
        },
        ConsoleCommand::Modify {
            index,
            id,
            payload,
            name,
        } => {
            let edit = MessageEdit {
                name,
                id: Some(id),
                payload: Some(payload),
                periodic_enabled: None,
            };
            match apply_edit(sim, index, &edit) {
                Ok(()) => writeln!(out, "modified message {index}")?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        ConsoleCommand::Send(index) => match sim.trigger(index) {
            Ok(true) => writeln!(out, "sent message {index}")?,
            Ok(false) => writeln!(out, "message {index} not sent (simulation stopped or channel error)")?,
            Err(e) => writeln!(out, "{e}")?,
        },
        ConsoleCommand::Periodic(index, enabled) => {
            match apply_edit(sim, index, &MessageEdit::periodic(enabled)) {
                Ok(()) => writeln!(
                    out,
                    "message {index} periodic {}",
                    if enabled { "on" } else { "off" }
                )?,
                Err(e) => writeln!(out, "{e}")?,
            }
        }
        ConsoleCommand::Delete(index) => match sim.delete(index) {
            Ok(removed) => writeln!(out, "deleted message {index} ({})", removed.id)?,
            Err(e) => writeln!(out, "{e}")?,
        },
        ConsoleCommand::Help => writeln!(out, "{HELP}")?,
        ConsoleCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Print `rows` as a fixed-width table.
pub fn render_table(rows: &[MessageDefinition], out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{:>3}  {:<24} {:<7} {:<40} {:<5} {:>6}",
        "no", "name", "id", "payload", "100ms", "period"
    )?;
    for (index, row) in rows.iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<24} {:<7} {:<40} {:<5} {:>6}",
            index,
            row.name,
            row.id,
            row.payload,
            if row.periodic_enabled { "[x]" } else { "[ ]" },
            row.period_ms,
        )?;
    }
    if rows.is_empty() {
        writeln!(out, "     (no messages)")?;
    }
    Ok(())
}

// ── Input loop ────────────────────────────────────────────────────────────────

/// Read `input` line by line on a dedicated thread.
///
/// The thread ends at end of input, after the first read error (which is
/// forwarded), or once the receiver is dropped and the next line arrives.
/// Nothing waits for it: a read still blocked at exit dies with the process.
pub fn spawn_line_reader<R>(input: R) -> io::Result<mpsc::Receiver<io::Result<String>>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_QUEUE);
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in input.lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Execute console lines until `quit`, end of input, or `interrupt` resolves.
///
/// # Errors
/// A read error from `lines` or a write error on `out`.
pub async fn drive<C, F>(
    sim: &C,
    lines: &mut mpsc::Receiver<io::Result<String>>,
    interrupt: F,
    out: &mut impl Write,
) -> io::Result<()>
where
    C: SimulationControl + ?Sized,
    F: Future<Output = ()>,
{
    tokio::pin!(interrupt);

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.recv() => line,
            () = &mut interrupt => {
                writeln!(out)?;
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match ConsoleCommand::parse(&line) {
            Ok(command) => {
                if execute(command, sim, out)? == Flow::Quit {
                    return Ok(());
                }
            }
            Err(e) => {
                warn!("{e}");
                writeln!(out, "{e}")?;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
