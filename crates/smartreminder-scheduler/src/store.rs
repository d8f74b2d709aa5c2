//! In-memory reminder store shared by request handlers and the trigger watcher.
//!
//! Every operation takes the store mutex for exactly one map mutation or copy,
//! so callers never observe a half-inserted or half-removed reminder. The
//! watcher iterates over a [`ReminderStore::list`] snapshot and claims due
//! reminders one at a time, letting foreground deletes interleave.
//!
//! A claimed reminder stays in the store, marked as firing, until the watcher
//! either completes it (notification delivered) or releases it (notification
//! failed). While it is firing it is still listed, its id stays taken, and a
//! foreground delete still removes it.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use chrono::{DateTime, Utc};
use smartreminder_core::{Reminder, ReminderId};

use crate::error::{Result, SchedulerError};

/// Cheaply cloneable handle; all clones share the same reminders.
#[derive(Debug, Clone, Default)]
pub struct ReminderStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    state: Mutex<StoreState>,
    /// Set while a trigger watcher is bound to this store.
    watcher_attached: AtomicBool,
}

#[derive(Debug, Default)]
struct StoreState {
    next_seq: u64,
    /// Insertion sequence -> entry. Iteration order is insertion order.
    entries: BTreeMap<u64, Entry>,
    index: HashMap<ReminderId, u64>,
}

#[derive(Debug)]
struct Entry {
    reminder: Reminder,
    /// A notification for this reminder is being emitted.
    firing: bool,
}

/// A due reminder the watcher is currently firing.
///
/// The sequence number pins the exact stored entry, so a claim never touches
/// a newer reminder that reuses the id after a delete.
#[derive(Debug)]
pub struct Claim {
    seq: u64,
    reminder: Reminder,
}

impl Claim {
    pub fn reminder(&self) -> &Reminder {
        &self.reminder
    }
}

impl ReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reminder. Fails with `DuplicateId` if the id is already present,
    /// including while that reminder is firing.
    pub fn insert(&self, reminder: Reminder) -> Result<()> {
        let mut state = self.state();
        if state.index.contains_key(&reminder.id) {
            return Err(SchedulerError::DuplicateId { id: reminder.id });
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.index.insert(reminder.id, seq);
        state.entries.insert(
            seq,
            Entry {
                reminder,
                firing: false,
            },
        );
        Ok(())
    }

    pub fn get(&self, id: ReminderId) -> Option<Reminder> {
        let state = self.state();
        state
            .index
            .get(&id)
            .and_then(|seq| state.entries.get(seq))
            .map(|entry| entry.reminder.clone())
    }

    /// Copy of every pending reminder in insertion order.
    pub fn list(&self) -> Vec<Reminder> {
        self.state()
            .entries
            .values()
            .map(|entry| entry.reminder.clone())
            .collect()
    }

    /// Remove a reminder. `None` means it was already gone, which is not an
    /// error: concurrent removers of one id see exactly one `Some`.
    ///
    /// A firing reminder is removed too; the watcher's later
    /// [`complete`](Self::complete) or [`release`](Self::release) then finds
    /// nothing to do.
    pub fn remove(&self, id: ReminderId) -> Option<Reminder> {
        let mut state = self.state();
        let seq = state.index.remove(&id)?;
        state.entries.remove(&seq).map(|entry| entry.reminder)
    }

    /// Mark the reminder as firing if it is present, due at `now`, and not
    /// already firing.
    ///
    /// Returns `None` when the id is absent (someone else already handled it),
    /// not yet due, or already claimed.
    pub fn claim_due(&self, id: ReminderId, now: DateTime<Utc>) -> Option<Claim> {
        let mut state = self.state();
        let seq = *state.index.get(&id)?;
        let entry = state.entries.get_mut(&seq)?;
        if entry.firing || entry.reminder.remind_at > now {
            return None;
        }
        entry.firing = true;
        Some(Claim {
            seq,
            reminder: entry.reminder.clone(),
        })
    }

    /// Drop a reminder whose notification went out.
    ///
    /// Returns false if it was deleted while firing.
    pub fn complete(&self, claim: Claim) -> bool {
        let mut state = self.state();
        if state.entries.remove(&claim.seq).is_none() {
            return false;
        }
        state.index.remove(&claim.reminder.id);
        true
    }

    /// Clear the firing mark after a failed notification, leaving the
    /// reminder pending at its original position.
    ///
    /// Returns false if it was deleted while firing.
    pub fn release(&self, claim: Claim) -> bool {
        match self.state().entries.get_mut(&claim.seq) {
            Some(entry) => {
                entry.firing = false;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mark a watcher as bound to this store. Returns false if one already is.
    pub(crate) fn try_attach_watcher(&self) -> bool {
        self.inner
            .watcher_attached
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn detach_watcher(&self) {
        self.inner.watcher_attached.store(false, Ordering::Release);
    }

    // Each operation is a single map update, so state left behind by a
    // panicking holder is still consistent.
    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
