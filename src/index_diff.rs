//! Single-level keyed diff: one ordered sequence against another, minimal moves via LIS.
use crate::changeset::{IndexDiff, Move, Update};
use crate::diagnostics::{Diagnostic, DiagnosticSink, Level, Side};
use crate::types::Diffable;
use indexmap::IndexMap;
use indexmap::map::Entry;

/// Diff of one level plus the full old -> new correspondence, anchors included.
#[derive(Debug, Clone)]
pub(crate) struct LevelDiff {
    pub diff: IndexDiff<usize>,
    /// `old_to_new[i]` is the new index matched with old index `i`.
    pub old_to_new: Vec<Option<usize>>,
}

/// Computes the edit script between `old` and `new`, matched by identity.
///
/// Duplicate identities are reported to `sink`; the first occurrence wins and later ones
/// become plain deletes (old side) or inserts (new side).
pub fn diff_indexed<T: Diffable>(
    old: &[T],
    new: &[T],
    level: Level,
    sink: &mut dyn DiagnosticSink,
) -> IndexDiff<usize> {
    diff_level(old, new, level, level, sink).diff
}

/// `old_level` and `new_level` differ only in the section index carried for diagnostics.
pub(crate) fn diff_level<T: Diffable>(
    old: &[T],
    new: &[T],
    old_level: Level,
    new_level: Level,
    sink: &mut dyn DiagnosticSink,
) -> LevelDiff {
    let mut diff = IndexDiff::default();
    let mut old_to_new = vec![None; old.len()];

    if old.is_empty() && new.is_empty() {
        return LevelDiff { diff, old_to_new };
    }

    let old_key_to_idx = index_identities(old, old_level, Side::Old, sink);

    // Walk the new sequence and record correspondences in new order.
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    let mut first_new_idx: IndexMap<T::Id, usize> = IndexMap::with_capacity(new.len());
    for (new_idx, element) in new.iter().enumerate() {
        let id = element.identity();
        match first_new_idx.entry(id.clone()) {
            Entry::Occupied(first) => {
                sink.report(Diagnostic::DuplicateIdentity {
                    level: new_level,
                    side: Side::New,
                    identity: format!("{:?}", id),
                    index: new_idx,
                    first_index: *first.get(),
                });
                diff.inserts.push(new_idx);
                continue;
            }
            Entry::Vacant(slot) => {
                slot.insert(new_idx);
            }
        }
        match old_key_to_idx.get(&id) {
            Some(&old_idx) => {
                old_to_new[old_idx] = Some(new_idx);
                pairs.push((old_idx, new_idx));
            }
            None => diff.inserts.push(new_idx),
        }
    }

    for (old_idx, matched) in old_to_new.iter().enumerate() {
        if matched.is_none() {
            diff.deletes.push(old_idx);
        }
    }

    // Anchors are the longest run of pairs whose old indices already ascend in new order.
    let sequence_for_lis: Vec<usize> = pairs.iter().map(|&(old_idx, _)| old_idx).collect();
    let anchored = lis_anchors(&sequence_for_lis);

    for (position, &(old_idx, new_idx)) in pairs.iter().enumerate() {
        let unchanged = old[old_idx].content_equals(&new[new_idx]);
        if anchored[position] {
            if !unchanged {
                diff.updates.push(Update {
                    from: old_idx,
                    to: new_idx,
                });
            }
        } else {
            diff.moves.push(Move {
                from: old_idx,
                to: new_idx,
                content_changed: !unchanged,
            });
        }
    }

    diff.normalize();
    LevelDiff { diff, old_to_new }
}

/// Identity -> index of its first occurrence. Later occurrences are reported and skipped.
pub(crate) fn index_identities<T: Diffable>(
    elements: &[T],
    level: Level,
    side: Side,
    sink: &mut dyn DiagnosticSink,
) -> IndexMap<T::Id, usize> {
    let mut map: IndexMap<T::Id, usize> = IndexMap::with_capacity(elements.len());
    for (idx, element) in elements.iter().enumerate() {
        match map.entry(element.identity()) {
            Entry::Occupied(first) => sink.report(Diagnostic::DuplicateIdentity {
                level,
                side,
                identity: format!("{:?}", first.key()),
                index: idx,
                first_index: *first.get(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(idx);
            }
        }
    }
    map
}

/// Marks the pairs kept in place: `anchors[i]` is true when `old_indices[i]` belongs to one
/// longest strictly increasing subsequence. O(n log n).
///
/// Which of several equally long subsequences gets picked is unspecified.
pub(crate) fn lis_anchors(old_indices: &[usize]) -> Vec<bool> {
    let mut anchors = vec![false; old_indices.len()];
    // `tails[k]` is the position ending the best run of length k + 1 seen so far.
    let mut tails: Vec<usize> = Vec::with_capacity(old_indices.len());
    let mut previous: Vec<Option<usize>> = vec![None; old_indices.len()];

    for (position, &value) in old_indices.iter().enumerate() {
        let len = tails.partition_point(|&t| old_indices[t] < value);
        previous[position] = len.checked_sub(1).map(|k| tails[k]);
        if len == tails.len() {
            tails.push(position);
        } else {
            tails[len] = position;
        }
    }

    let mut cursor = tails.last().copied();
    while let Some(position) = cursor {
        anchors[position] = true;
        cursor = previous[position];
    }
    anchors
}
