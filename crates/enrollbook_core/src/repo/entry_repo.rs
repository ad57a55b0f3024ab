//! In-memory entry repository.
//!
//! # Responsibility
//! - Create, read, list, process and delete entry records.
//!
//! # Invariants
//! - Every operation holds the repository lock for its whole
//!   read-mutate-write sequence.
//! - Entries are created `not processed`; `mark_processed` is idempotent.
//! - `set_status` never moves a processed entry back.
//! - `user_id` is stored as given; no cross-repository check is made.

use crate::error::ErrorKind;
use crate::model::entry::{Entry, EntryId, EntryStatus};
use crate::model::user::UserId;
use crate::repo::collection::{CollectionNotFound, IndexedCollection};
use chrono::NaiveDate;
use log::{debug, info};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type EntryRepoResult<T> = Result<T, EntryRepoError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryRepoError {
    #[error("entry not found: {0}")]
    NotFound(EntryId),
    #[error("entry {id} cannot move from `{from}` to `{to}`")]
    InvalidTransition {
        id: EntryId,
        from: EntryStatus,
        to: EntryStatus,
    },
}

impl EntryRepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidTransition { .. } => ErrorKind::InvalidInput,
        }
    }
}

impl From<CollectionNotFound> for EntryRepoError {
    fn from(value: CollectionNotFound) -> Self {
        Self::NotFound(value.0)
    }
}

/// Concurrency-safe store of entries.
#[derive(Debug, Default)]
pub struct EntryRepository {
    entries: Mutex<IndexedCollection<Entry>>,
}

impl EntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unprocessed entry and returns the stored record.
    ///
    /// `course` and `payment_method` are expected to be validated upstream.
    pub fn create_entry(
        &self,
        course: &str,
        date: NaiveDate,
        user_id: UserId,
        payment_method: &str,
    ) -> Entry {
        let mut entries = self.lock();
        let (id, stored) =
            entries.add_with(|id| Entry::new(id, course, date, user_id, payment_method));
        info!("event=entry_create module=repo status=ok entry_id={id} user_id={user_id}");
        stored.clone()
    }

    pub fn get_entry(&self, id: EntryId) -> EntryRepoResult<Entry> {
        Ok(self.lock().get(id)?.clone())
    }

    /// Returns every entry in creation order.
    pub fn list_entries(&self) -> Vec<Entry> {
        self.lock().list()
    }

    /// Returns the entries referencing `user_id`, in creation order.
    pub fn list_entries_by_user(&self, user_id: UserId) -> Vec<Entry> {
        self.lock()
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Moves an entry to `processed`. Already processed entries are returned
    /// unchanged.
    pub fn mark_processed(&self, id: EntryId) -> EntryRepoResult<Entry> {
        let mut entries = self.lock();
        let entry = entries.get_mut(id)?;
        if entry.is_processed() {
            debug!("event=entry_mark_processed module=repo status=noop entry_id={id}");
        } else {
            entry.mark_processed();
            info!("event=entry_mark_processed module=repo status=ok entry_id={id}");
        }
        Ok(entry.clone())
    }

    /// Applies a requested status. Only forward moves are accepted; asking for
    /// the current status is a no-op.
    pub fn set_status(&self, id: EntryId, status: EntryStatus) -> EntryRepoResult<Entry> {
        let mut entries = self.lock();
        let entry = entries.get_mut(id)?;
        if !entry.status.can_transition_to(status) {
            return Err(EntryRepoError::InvalidTransition {
                id,
                from: entry.status,
                to: status,
            });
        }
        if entry.status != status {
            entry.status = status;
            info!(
                "event=entry_set_status module=repo status=ok entry_id={} new_status=\"{}\"",
                id, status
            );
        }
        Ok(entry.clone())
    }

    pub fn delete_entry(&self, id: EntryId) -> EntryRepoResult<()> {
        self.lock().delete(id)?;
        info!("event=entry_delete module=repo status=ok entry_id={id}");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, IndexedCollection<Entry>> {
        // No critical section can leave the collection half-written, so a
        // poisoned lock still guards consistent data.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
