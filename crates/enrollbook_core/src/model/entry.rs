//! Entry domain model.
//!
//! # Responsibility
//! - Define the course enrollment/payment record.
//! - Provide the one-way status transition helper.
//!
//! # Invariants
//! - New entries start as `EntryStatus::NotProcessed`.
//! - Status only moves forward: `NotProcessed -> Processed`.

use super::RecordId;
use crate::model::user::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Identifier of an entry record.
pub type EntryId = RecordId;

/// Wire value for `EntryStatus::NotProcessed`.
pub const STATUS_NOT_PROCESSED: &str = "not processed";
/// Wire value for `EntryStatus::Processed`.
pub const STATUS_PROCESSED: &str = "processed";

/// Processing state of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Submitted, awaiting an operator.
    #[default]
    #[serde(rename = "not processed")]
    NotProcessed,
    /// Handled by an operator. Terminal.
    #[serde(rename = "processed")]
    Processed,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotProcessed => STATUS_NOT_PROCESSED,
            Self::Processed => STATUS_PROCESSED,
        }
    }

    /// Returns whether moving from `self` to `next` respects the lifecycle.
    pub fn can_transition_to(self, next: Self) -> bool {
        !matches!((self, next), (Self::Processed, Self::NotProcessed))
    }
}

impl Display for EntryStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for status strings outside the two known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entry status `{0}`; expected `not processed` or `processed`")]
pub struct UnknownEntryStatus(pub String);

impl FromStr for EntryStatus {
    type Err = UnknownEntryStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            STATUS_NOT_PROCESSED => Ok(Self::NotProcessed),
            STATUS_PROCESSED => Ok(Self::Processed),
            other => Err(UnknownEntryStatus(other.to_string())),
        }
    }
}

/// Course enrollment/payment submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub course: String,
    /// Calendar day, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Referenced user. Not checked against the user repository.
    pub user_id: UserId,
    pub payment_method: String,
    pub status: EntryStatus,
}

impl Entry {
    /// Creates an unprocessed entry with a collection-assigned id.
    pub fn new(
        id: EntryId,
        course: impl Into<String>,
        date: NaiveDate,
        user_id: UserId,
        payment_method: impl Into<String>,
    ) -> Self {
        Self {
            id,
            course: course.into(),
            date,
            user_id,
            payment_method: payment_method.into(),
            status: EntryStatus::NotProcessed,
        }
    }

    /// Moves the entry to `Processed`. Calling it twice is a no-op.
    pub fn mark_processed(&mut self) {
        self.status = EntryStatus::Processed;
    }

    pub fn is_processed(&self) -> bool {
        self.status == EntryStatus::Processed
    }
}

#[cfg(test)]
mod tests {
    use super::{Entry, EntryStatus};
    use chrono::NaiveDate;

    fn sample() -> Entry {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        Entry::new(1, "rust basics", date, 7, "card")
    }

    #[test]
    fn new_entry_is_not_processed() {
        let entry = sample();
        assert_eq!(entry.status, EntryStatus::NotProcessed);
        assert!(!entry.is_processed());
    }

    #[test]
    fn mark_processed_is_idempotent() {
        let mut entry = sample();
        entry.mark_processed();
        entry.mark_processed();
        assert!(entry.is_processed());
    }

    #[test]
    fn status_never_moves_backwards() {
        assert!(EntryStatus::NotProcessed.can_transition_to(EntryStatus::Processed));
        assert!(EntryStatus::Processed.can_transition_to(EntryStatus::Processed));
        assert!(!EntryStatus::Processed.can_transition_to(EntryStatus::NotProcessed));
    }

    #[test]
    fn status_parses_wire_values_only() {
        assert_eq!(
            "not processed".parse::<EntryStatus>().unwrap(),
            EntryStatus::NotProcessed
        );
        assert_eq!(
            "processed".parse::<EntryStatus>().unwrap(),
            EntryStatus::Processed
        );
        assert!("PROCESSED".parse::<EntryStatus>().is_err());
    }

    #[test]
    fn serializes_date_and_status_as_strings() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["date"], "2025-03-14");
        assert_eq!(json["status"], "not processed");
    }
}
