//! In-memory repositories backing the core.
//!
//! # Responsibility
//! - Provide the generic `IndexedCollection` and the two repositories built
//!   on it by composition.
//! - Bundle the repositories into one shareable `Store`.
//!
//! # Invariants
//! - Each repository owns exactly one lock covering all of its state.
//! - Repository APIs return semantic errors (`NotFound`, `AlreadyExists`).
//! - Nothing survives a process restart.

pub mod collection;
pub mod entry_repo;
pub mod user_repo;

use entry_repo::EntryRepository;
use std::sync::Arc;
use user_repo::UserRepository;

/// Process-wide handle to both repositories.
#[derive(Debug, Clone, Default)]
pub struct Store {
    pub users: Arc<UserRepository>,
    pub entries: Arc<EntryRepository>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }
}
