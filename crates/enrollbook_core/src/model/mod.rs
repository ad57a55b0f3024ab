//! Domain records stored by the core repositories.
//!
//! # Responsibility
//! - Define the `User` and `Entry` shapes returned across the core boundary.
//! - Own the entry status lifecycle.
//!
//! # Invariants
//! - Every record is identified by a collection-assigned `RecordId` (>= 1).
//! - Password material is only ever held as a one-way hash.

pub mod entry;
pub mod user;

/// Collection-assigned identifier. Starts at 1 and is never reused.
pub type RecordId = u64;
