use std::cmp::Reverse;
use std::collections::HashSet;

use crate::session::Session;

/// Combine imported sessions with the existing collection.
///
/// Imported records go first, duplicates by id keep their first occurrence
/// (so an imported record replaces a local one with the same id), and the
/// result is ordered newest `start_date` first. The sort is stable, so records
/// with equal timestamps keep their relative order.
pub fn merge_imported(imported: Vec<Session>, existing: Vec<Session>) -> Vec<Session> {
    let mut seen = HashSet::with_capacity(imported.len() + existing.len());
    let mut merged: Vec<Session> = imported
        .into_iter()
        .chain(existing)
        .filter(|session| seen.insert(session.id))
        .collect();
    merged.sort_by_key(|session| Reverse(session.start_date));
    merged
}
