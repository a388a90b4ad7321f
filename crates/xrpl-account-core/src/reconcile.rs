//! Pure reconciliation of fetched ledger history into local operation state

use std::collections::HashSet;

use crate::operation::Operation;

/// Merge freshly fetched operations into the existing confirmed history.
///
/// Union by id with existing entries winning on duplicates, re-sorted by
/// date descending. Idempotent: merging the same fetched set twice yields
/// the same list.
pub fn merge(existing: &[Operation], fetched: &[Operation]) -> Vec<Operation> {
    let mut seen: HashSet<String> = HashSet::with_capacity(existing.len() + fetched.len());
    let mut merged: Vec<Operation> = Vec::with_capacity(existing.len() + fetched.len());

    for op in existing.iter().chain(fetched.iter()) {
        if seen.insert(op.id.clone()) {
            merged.push(op.clone());
        }
    }

    // Stable sort keeps existing-before-fetched order for equal dates.
    merged.sort_by(|a, b| b.date.cmp(&a.date));
    merged
}

/// Drop pending operations that the confirmed history has caught up with.
///
/// A pending operation is removed once its hash appears among confirmed
/// operations, or once its sequence number is no longer strictly greater
/// than the most recent confirmed operation's sequence (it was superseded
/// or invalidated by an equal-or-later confirmed transaction).
///
/// `confirmed` must be date-descending, as produced by [`merge`].
pub fn reconcile_pending(pending: &[Operation], confirmed: &[Operation]) -> Vec<Operation> {
    let confirmed_hashes: HashSet<&str> = confirmed.iter().map(|op| op.hash.as_str()).collect();
    let latest_sequence = confirmed.first().map(|op| op.sequence);

    pending
        .iter()
        .filter(|op| {
            if confirmed_hashes.contains(op.hash.as_str()) {
                return false;
            }
            match latest_sequence {
                Some(sequence) => op.sequence > sequence,
                None => true,
            }
        })
        .cloned()
        .collect()
}
