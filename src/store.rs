use tracing::{debug, error, info, warn};

use crate::error::{DashError, Result};
use crate::storage::Slots;
use crate::WorkEntry;

pub const ENTRIES_SLOT: &str = "design-work-entries";

/// Owns the canonical entry list and mirrors it to the entries slot after
/// every mutation. The list is kept newest-first by insertion.
#[derive(Debug)]
pub struct EntryStore<S: Slots> {
    slots: S,
    entries: Vec<WorkEntry>,
}

impl<S: Slots> EntryStore<S> {
    pub fn open(slots: S) -> Self {
        let entries = read_entries(&slots);
        EntryStore { slots, entries }
    }

    /// Re-reads the persisted slot, replacing the in-memory list.
    pub fn load(&mut self) -> &[WorkEntry] {
        self.entries = read_entries(&self.slots);
        &self.entries
    }

    pub fn entries(&self) -> &[WorkEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&WorkEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepends `entry` and persists the whole list.
    pub fn add(&mut self, entry: WorkEntry) -> Result<&[WorkEntry]> {
        let id = entry.id.clone();
        let mut updated = Vec::with_capacity(self.entries.len() + 1);
        updated.push(entry);
        updated.extend(self.entries.iter().cloned());

        self.commit(updated)?;
        info!(id = %id, count = self.entries.len(), "work entry added");
        Ok(&self.entries)
    }

    /// Drops every entry with this id. Unknown ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Result<&[WorkEntry]> {
        let updated: Vec<WorkEntry> = self
            .entries
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();
        let removed = self.entries.len() - updated.len();

        self.commit(updated)?;
        info!(id = %id, removed, count = self.entries.len(), "work entry removed");
        Ok(&self.entries)
    }

    pub fn into_slots(self) -> S {
        self.slots
    }

    // Write first: a failed write must leave memory matching the slot.
    fn commit(&mut self, updated: Vec<WorkEntry>) -> Result<()> {
        let text = serde_json::to_string(&updated).map_err(DashError::Encode)?;
        self.slots.set(ENTRIES_SLOT, &text)?;
        self.entries = updated;
        Ok(())
    }
}

fn read_entries<S: Slots>(slots: &S) -> Vec<WorkEntry> {
    let text = match slots.get(ENTRIES_SLOT) {
        Ok(Some(text)) => text,
        Ok(None) => {
            debug!(slot = ENTRIES_SLOT, "no saved entries");
            return Vec::new();
        }
        Err(e) => {
            error!(slot = ENTRIES_SLOT, error = %e, "failed to read saved entries");
            return Vec::new();
        }
    };

    // Only text that is not a JSON array counts as corrupt. Single records
    // that cannot be read are skipped so the rest of the slot survives.
    let records = match serde_json::from_str::<Vec<serde_json::Value>>(&text) {
        Ok(records) => records,
        Err(source) => {
            let e = DashError::PersistedStateCorrupt {
                slot: ENTRIES_SLOT.to_string(),
                source,
            };
            error!(error = ?e, "failed to parse saved entries");
            return Vec::new();
        }
    };

    let total = records.len();
    let entries: Vec<WorkEntry> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value(record) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(slot = ENTRIES_SLOT, index, error = %e, "skipping unreadable entry");
                None
            }
        })
        .collect();
    debug!(slot = ENTRIES_SLOT, count = entries.len(), total, "entries loaded");
    entries
}
