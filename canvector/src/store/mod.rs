/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Message database: the authoritative table of message definitions.
//!
//! [`MessageStore`] validates input, keeps the CSV file in step with the
//! in-memory table, and is the only thing that mutates the table.  Rows are
//! addressed by position; deleting a row moves every later row down by one.
//!
//! # Commit order
//! Every mutation builds the candidate table, writes it to disk, and only then
//! replaces the in-memory table.  A storage failure therefore leaves both
//! sides at the previous state.
//!
//! # Sharing
//! The store is shared between the front end and the transmission scheduler
//! as a [`SharedStore`].  Mutations take the write lock for the whole
//! validate → persist → commit sequence; the scheduler only reads.

pub mod error;
pub mod message;
pub mod persist;
pub mod validate;

pub use error::{StoreError, ValidationError};
pub use message::{MessageDefinition, MessageEdit, DEFAULT_PERIOD_MS};

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{info, warn};

use validate::validate_message;

/// Default database location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "candb/db.csv";

/// The store as shared between the front end and the scheduler.
pub type SharedStore = Arc<RwLock<MessageStore>>;

/// Take the read lock, recovering the table if a writer panicked.
pub fn read_store(store: &SharedStore) -> RwLockReadGuard<'_, MessageStore> {
    store.read().unwrap_or_else(PoisonError::into_inner)
}

/// Take the write lock, recovering the table if a writer panicked.
pub fn write_store(store: &SharedStore) -> RwLockWriteGuard<'_, MessageStore> {
    store.write().unwrap_or_else(PoisonError::into_inner)
}

// ── MessageStore ──────────────────────────────────────────────────────────────

/// Ordered, persisted collection of [`MessageDefinition`]s.
#[derive(Debug)]
pub struct MessageStore {
    path: PathBuf,
    messages: Vec<MessageDefinition>,
}

impl MessageStore {
    /// Load the database at `path`, creating an empty one (and its parent
    /// directory) if it does not exist yet.
    ///
    /// # Errors
    /// Any [`StoreError`] storage variant raised while creating or reading the
    /// file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if !path.exists() {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            persist::write_table(&path, &[])?;
            info!("Created db file: {}", path.display());
        }

        let messages = persist::read_table(&path)?;
        info!(
            path = %path.display(),
            rows = messages.len(),
            "Loaded db file"
        );

        Ok(Self { path, messages })
    }

    /// Wrap the store for sharing with the scheduler.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    /// Location of the backing CSV file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new message.  Periodic transmission starts disabled and the
    /// period is [`DEFAULT_PERIOD_MS`].
    ///
    /// Returns the index of the new row.
    ///
    /// # Errors
    /// [`StoreError::Invalid`] if `id` or `payload` fails validation; storage
    /// variants if the file could not be rewritten.
    pub fn add(&mut self, name: &str, id: &str, payload: &str) -> Result<usize, StoreError> {
        if let Err(e) = validate_message(id, payload) {
            warn!("Message not added: {e}");
            return Err(e.into());
        }

        let message = MessageDefinition::new(name, id, payload);
        let mut next = self.messages.clone();
        next.push(message);
        self.commit(next)?;

        let index = self.messages.len() - 1;
        info!(index, msg_name = name, id, payload, "Added new message");
        Ok(index)
    }

    /// Remove the row at `index` and return it.
    ///
    /// # Errors
    /// [`StoreError::IndexOutOfRange`] if `index` does not address a row;
    /// storage variants if the file could not be rewritten.
    pub fn delete(&mut self, index: usize) -> Result<MessageDefinition, StoreError> {
        self.check_index(index)?;

        let mut next = self.messages.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        info!(index, msg_name = %removed.name, id = %removed.id, "Deleted message");
        Ok(removed)
    }

    /// Overwrite the row at `index`.  `period_ms` is preserved.
    ///
    /// # Errors
    /// [`StoreError::IndexOutOfRange`], [`StoreError::Invalid`], or a storage
    /// variant.  The row is unchanged in every error case.
    pub fn modify(
        &mut self,
        index: usize,
        name: &str,
        id: &str,
        payload: &str,
        periodic_enabled: bool,
    ) -> Result<(), StoreError> {
        self.check_index(index)?;
        if let Err(e) = validate_message(id, payload) {
            warn!(index, "Message not updated: {e}");
            return Err(e.into());
        }

        let mut next = self.messages.clone();
        let row = &mut next[index];
        row.name = name.to_string();
        row.id = id.to_string();
        row.payload = payload.to_string();
        row.periodic_enabled = periodic_enabled;
        self.commit(next)?;

        info!(
            index,
            msg_name = name,
            id,
            payload,
            periodic_enabled,
            "Modified message"
        );
        Ok(())
    }

    /// Switch periodic transmission for one row, keeping its other fields.
    pub fn set_periodic(&mut self, index: usize, enabled: bool) -> Result<(), StoreError> {
        let row = self.get(index).cloned().ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        self.modify(index, &row.name, &row.id, &row.payload, enabled)
    }

    /// The current table, in order.
    pub fn get_all(&self) -> &[MessageDefinition] {
        &self.messages
    }

    /// Owned copy of the current table.
    pub fn snapshot(&self) -> Vec<MessageDefinition> {
        self.messages.clone()
    }

    /// Copy of every row flagged for periodic transmission, in table order.
    pub fn periodic_rows(&self) -> Vec<MessageDefinition> {
        self.messages
            .iter()
            .filter(|m| m.periodic_enabled)
            .cloned()
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&MessageDefinition> {
        self.messages.get(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn check_index(&self, index: usize) -> Result<(), StoreError> {
        if index < self.messages.len() {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange {
                index,
                len: self.messages.len(),
            })
        }
    }

    /// Persist `next`, then make it the live table.
    fn commit(&mut self, next: Vec<MessageDefinition>) -> Result<(), StoreError> {
        persist::write_table(&self.path, &next)?;
        self.messages = next;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    const EIGHT_BYTES: &str = "0x01 0x02 0x03 0x04 0x05 0x06 0x07 0x08";

    /// Helper: a store backed by a fresh temp directory.
    fn temp_store() -> (TempDir, MessageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MessageStore::open(dir.path().join("candb").join("db.csv")).unwrap();
        (dir, store)
    }

    fn filled_store(n: usize) -> (TempDir, MessageStore) {
        let (dir, mut store) = temp_store();
        for i in 0..n {
            store
                .add(&format!("m{i}"), &format!("0x{:X}", 0x100 + i), "0x00")
                .unwrap();
        }
        (dir, store)
    }

    // ── open ──────────────────────────────────────────────────────────────────

    #[test]
    fn open_creates_missing_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candb").join("db.csv");

        let store = MessageStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn reopen_reproduces_table() {
        let (dir, mut store) = temp_store();
        store.add("Heartbeat", "0x100", EIGHT_BYTES).unwrap();
        store.add("", "0x7ff", "0xAB").unwrap();
        store.set_periodic(1, true).unwrap();
        let before = store.snapshot();
        let path = store.path().to_path_buf();
        drop(store);

        let reopened = MessageStore::open(&path).unwrap();
        assert_eq!(reopened.get_all(), before.as_slice());
        drop(dir);
    }

    // ── add ───────────────────────────────────────────────────────────────────

    #[test]
    fn add_appends_row_with_defaults() {
        let (_dir, mut store) = temp_store();
        let index = store.add("Heartbeat", "0x100", EIGHT_BYTES).unwrap();

        assert_eq!(index, 0);
        let row = &store.get_all()[0];
        assert_eq!(row.name, "Heartbeat");
        assert_eq!(row.id, "0x100");
        assert_eq!(row.payload, EIGHT_BYTES);
        assert!(!row.periodic_enabled);
        assert_eq!(row.period_ms, 100);
    }

    #[test]
    fn add_with_invalid_payload_is_rejected() {
        let (_dir, mut store) = temp_store();
        let err = store.add("x", "0x100", "0x01 0x02 0x0").unwrap_err();

        assert!(err.is_rejected());
        assert!(store.is_empty());
    }

    #[test]
    fn add_with_invalid_id_is_rejected() {
        let (_dir, mut store) = temp_store();
        assert!(store.add("x", "256", "0x01").unwrap_err().is_rejected());
        assert!(store.is_empty());
    }

    #[test]
    fn rejected_add_does_not_touch_file() {
        let (_dir, mut store) = temp_store();
        store.add("a", "0x1", "0x01").unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let _ = store.add("b", "0xZZ", "0x01");
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    // ── delete ────────────────────────────────────────────────────────────────

    #[test]
    fn delete_shifts_later_rows_down() {
        let (_dir, mut store) = filled_store(4);
        let before = store.snapshot();

        let removed = store.delete(1).unwrap();
        assert_eq!(removed, before[1]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get_all()[0], before[0]);
        assert_eq!(store.get_all()[1], before[2]);
        assert_eq!(store.get_all()[2], before[3]);
    }

    #[test]
    fn delete_out_of_range_is_an_error() {
        let (_dir, mut store) = filled_store(2);
        assert!(matches!(
            store.delete(2),
            Err(StoreError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn delete_is_persisted() {
        let (_dir, mut store) = filled_store(3);
        store.delete(0).unwrap();
        let reloaded = MessageStore::open(store.path()).unwrap();
        assert_eq!(reloaded.get_all(), store.get_all());
    }

    // ── modify ────────────────────────────────────────────────────────────────

    #[test]
    fn modify_overwrites_in_place_and_keeps_period() {
        let (_dir, mut store) = filled_store(2);
        store.modify(1, "Speed", "0x1A0", "0x10 0x20", true).unwrap();

        let row = &store.get_all()[1];
        assert_eq!(row.name, "Speed");
        assert_eq!(row.id, "0x1A0");
        assert_eq!(row.payload, "0x10 0x20");
        assert!(row.periodic_enabled);
        assert_eq!(row.period_ms, DEFAULT_PERIOD_MS);
    }

    #[test]
    fn modify_with_invalid_id_keeps_previous_values() {
        let (_dir, mut store) = filled_store(1);
        store.set_periodic(0, true).unwrap();
        let before = store.snapshot();

        let err = store.modify(0, "new", "0x", "0x01", false).unwrap_err();
        assert!(err.is_rejected());
        assert_eq!(store.get_all(), before.as_slice());
        assert!(store.get_all()[0].periodic_enabled);
    }

    #[test]
    fn modify_out_of_range_is_an_error() {
        let (_dir, mut store) = filled_store(1);
        assert!(matches!(
            store.modify(5, "n", "0x1", "0x01", false),
            Err(StoreError::IndexOutOfRange { index: 5, len: 1 })
        ));
    }

    #[test]
    fn periodic_rows_keeps_table_order() {
        let (_dir, mut store) = filled_store(4);
        store.set_periodic(3, true).unwrap();
        store.set_periodic(1, true).unwrap();

        let names: Vec<_> = store.periodic_rows().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["m1", "m3"]);
    }

    // ── storage failure ───────────────────────────────────────────────────────

    #[test]
    fn storage_failure_leaves_memory_unchanged() {
        let (dir, mut store) = filled_store(1);
        let before = store.snapshot();
        // Removing the directory makes the temp-file step fail.
        std::fs::remove_dir_all(dir.path().join("candb")).unwrap();

        let err = store.add("x", "0x2", "0x02").unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.get_all(), before.as_slice());
    }

    // ── shared access ─────────────────────────────────────────────────────────

    #[test]
    fn shared_store_is_usable_across_threads() {
        let (_dir, store) = temp_store();
        let shared = store.into_shared();

        let writer = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || {
                for i in 0..10 {
                    write_store(&shared)
                        .add(&format!("t{i}"), "0x10", "0x01")
                        .unwrap();
                }
            })
        };
        for _ in 0..10 {
            let len = read_store(&shared).len();
            assert!(len <= 10);
        }
        writer.join().unwrap();
        assert_eq!(read_store(&shared).len(), 10);
    }

    // ── Properties ────────────────────────────────────────────────────────────

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn valid_add_is_visible(id in 0u32..=0x7FF, bytes in proptest::collection::vec(any::<u8>(), 1..=8)) {
            let (_dir, mut store) = temp_store();
            let id_text = format!("0x{id:03X}");
            let payload = bytes.iter().map(|b| format!("0x{b:02X}")).collect::<Vec<_>>().join(" ");

            let index = store.add("p", &id_text, &payload).unwrap();
            let row = &store.get_all()[index];
            prop_assert_eq!(&row.id, &id_text);
            prop_assert_eq!(&row.payload, &payload);
            prop_assert!(!row.periodic_enabled);
        }

        #[test]
        fn invalid_payload_leaves_length_unchanged(payload in "[0-9a-fxX ]{0,30}") {
            prop_assume!(validate::validate_payload(&payload).is_err());
            let (_dir, mut store) = filled_store(1);

            prop_assert!(store.add("p", "0x100", &payload).is_err());
            prop_assert_eq!(store.len(), 1);
        }

        #[test]
        fn delete_moves_later_rows_down(n in 1usize..6, pick in 0usize..6) {
            let i = pick % n;
            let (_dir, mut store) = filled_store(n);
            let before = store.snapshot();

            store.delete(i).unwrap();
            prop_assert_eq!(store.len(), n - 1);
            prop_assert_eq!(&store.get_all()[..i], &before[..i]);
            prop_assert_eq!(&store.get_all()[i..], &before[i + 1..]);
        }
    }
}
