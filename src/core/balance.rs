//! TOIL balance calculator.
//!
//! The stored balance is a cache of [`compute_balance`]: it is always
//! re-derived from the approved entries, never patched incrementally.

use crate::models::status::EntryStatus;
use crate::models::toil_entry::ToilEntry;

/// Net minutes (earned − used) over approved entries only.
pub fn compute_balance<'a, I>(entries: I) -> i64
where
    I: IntoIterator<Item = &'a ToilEntry>,
{
    entries
        .into_iter()
        .filter(|e| e.status.is_approved())
        .map(ToilEntry::net_minutes)
        .sum()
}

/// Net minutes of entries still awaiting review (draft or pending).
pub fn pending_delta<'a, I>(entries: I) -> i64
where
    I: IntoIterator<Item = &'a ToilEntry>,
{
    entries
        .into_iter()
        .filter(|e| matches!(e.status, EntryStatus::Draft | EntryStatus::Pending))
        .map(ToilEntry::net_minutes)
        .sum()
}
