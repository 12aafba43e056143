//! Property-based tests for two-level changesets.

use list_reconciler::{
    BoundsPolicy, Diagnostic, DiffOptions, Element, InMemoryPresentation, ItemPath, Section,
    apply_changeset, diff_lists, diff_lists_with,
};
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

type Item = Element<u8, u8>;
type Sec = Section<u8, u8, Item>;

// =============================================================================
// Test helpers
// =============================================================================

fn raw_sections() -> impl Strategy<Value = Vec<Sec>> {
    prop::collection::vec(
        (
            0u8..8,
            0u8..2,
            prop::collection::vec((0u8..12, 0u8..2), 0..8),
        ),
        0..6,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .map(|(id, content, items)| {
                Section::new(id, content)
                    .with_items(items.into_iter().map(|(id, c)| Element::new(id, c)))
            })
            .collect()
    })
}

/// Lists that respect the uniqueness invariant at both levels.
fn unique_sections() -> impl Strategy<Value = Vec<Sec>> {
    raw_sections().prop_map(|sections| {
        let mut seen = HashSet::new();
        sections
            .into_iter()
            .filter(|s| seen.insert(s.id))
            .map(|mut s| {
                let mut seen_items = HashSet::new();
                s.items.retain(|i| seen_items.insert(i.id));
                s
            })
            .collect()
    })
}

fn has_duplicates(sections: &[Sec]) -> bool {
    let mut seen = HashSet::new();
    let dup_sections = sections.iter().any(|s| !seen.insert(s.id));
    dup_sections
        || sections.iter().any(|s| {
            let mut seen_items = HashSet::new();
            s.items.iter().any(|i| !seen_items.insert(i.id))
        })
}

fn shape(sections: &[Sec]) -> Vec<(u8, Vec<u8>)> {
    sections
        .iter()
        .map(|s| (s.id, s.items.iter().map(|i| i.id).collect()))
        .collect()
}

fn replay(old: &[Sec], new: &[Sec], options: DiffOptions) -> Vec<(u8, Vec<u8>)> {
    let changeset = diff_lists_with(old, new, options, &mut Vec::<Diagnostic>::new());
    let mut view = InMemoryPresentation::new(old);
    view.stage(new);
    let report = apply_changeset(&mut view, &changeset, BoundsPolicy::Strict);
    assert!(report.is_clean());
    view.sections().to_vec()
}

fn expected_moves(old_ids: &[u8], new_ids: &[u8]) -> usize {
    let old_index: HashMap<u8, usize> = old_ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    let correspondence: Vec<usize> = new_ids.iter().filter_map(|id| old_index.get(id).copied()).collect();
    // lis::longest_increasing_subsequence indexes its first element unconditionally.
    if correspondence.is_empty() {
        return 0;
    }
    correspondence.len() - lis::longest_increasing_subsequence(&correspondence).len()
}

// =============================================================================
// Round trip
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Replaying the changeset on the old list yields the new list's identities in order.
    #[test]
    fn replay_reproduces_new_list(old in unique_sections(), new in unique_sections()) {
        prop_assert_eq!(replay(&old, &new, DiffOptions::default()), shape(&new));
    }

    #[test]
    fn replay_without_cross_section_moves(old in unique_sections(), new in unique_sections()) {
        let options = DiffOptions::default().cross_section_moves(false);
        prop_assert_eq!(replay(&old, &new, options), shape(&new));
    }

    /// Duplicate identities never panic, still replay correctly, and are always reported.
    #[test]
    fn duplicates_are_tolerated_and_reported(old in raw_sections(), new in raw_sections()) {
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let changeset = diff_lists_with(&old, &new, DiffOptions::default(), &mut diagnostics);
        prop_assert_eq!(
            !diagnostics.is_empty(),
            has_duplicates(&old) || has_duplicates(&new)
        );

        let mut view = InMemoryPresentation::new(&old);
        view.stage(&new);
        prop_assert!(apply_changeset(&mut view, &changeset, BoundsPolicy::Strict).is_clean());
        prop_assert_eq!(view.sections().to_vec(), shape(&new));
    }
}

// =============================================================================
// Partition, minimality, idempotence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Every address is claimed by at most one record, and unclaimed ones are untouched anchors.
    #[test]
    fn records_partition_both_address_spaces(old in unique_sections(), new in unique_sections()) {
        let cs = diff_lists(&old, &new);
        let sections = cs.sections();

        let old_claims: Vec<usize> = sections.deletes.iter().copied()
            .chain(sections.moves.iter().map(|m| m.from))
            .chain(sections.updates.iter().map(|u| u.from))
            .collect();
        let new_claims: Vec<usize> = sections.inserts.iter().copied()
            .chain(sections.moves.iter().map(|m| m.to))
            .chain(sections.updates.iter().map(|u| u.to))
            .collect();
        prop_assert_eq!(old_claims.iter().collect::<HashSet<_>>().len(), old_claims.len());
        prop_assert_eq!(new_claims.iter().collect::<HashSet<_>>().len(), new_claims.len());

        for (i, s) in old.iter().enumerate() {
            if !old_claims.contains(&i) {
                let j = cs.new_section_index(i).expect("anchored section survives");
                prop_assert_eq!(new[j].id, s.id);
                prop_assert_eq!(new[j].content, s.content);
            }
        }
        for u in &sections.updates {
            prop_assert_ne!(old[u.from].content, new[u.to].content);
        }

        let items = cs.items();
        let old_item_claims: Vec<ItemPath> = items.deletes.iter().copied()
            .chain(items.moves.iter().map(|m| m.from))
            .chain(items.updates.iter().map(|u| u.from))
            .collect();
        let new_item_claims: Vec<ItemPath> = items.inserts.iter().copied()
            .chain(items.moves.iter().map(|m| m.to))
            .chain(items.updates.iter().map(|u| u.to))
            .collect();
        prop_assert_eq!(old_item_claims.iter().collect::<HashSet<_>>().len(), old_item_claims.len());
        prop_assert_eq!(new_item_claims.iter().collect::<HashSet<_>>().len(), new_item_claims.len());

        // Whole-section edits imply their items.
        for p in &old_item_claims {
            prop_assert!(!sections.deletes.contains(&p.section));
        }
        for p in &new_item_claims {
            prop_assert!(!sections.inserts.contains(&p.section));
        }
    }

    /// Within every matched section pair, moves equal matched pairs minus the LIS.
    #[test]
    fn moves_are_minimal(old in unique_sections(), new in unique_sections()) {
        let cs = diff_lists(&old, &new);

        let old_ids: Vec<u8> = old.iter().map(|s| s.id).collect();
        let new_ids: Vec<u8> = new.iter().map(|s| s.id).collect();
        prop_assert_eq!(cs.sections().moves.len(), expected_moves(&old_ids, &new_ids));

        for (os, section) in old.iter().enumerate() {
            let Some(ns) = cs.new_section_index(os) else { continue };
            let within = cs.items().moves.iter()
                .filter(|m| m.from.section == os && m.to.section == ns)
                .count();
            let old_items: Vec<u8> = section.items.iter().map(|i| i.id).collect();
            let new_items: Vec<u8> = new[ns].items.iter().map(|i| i.id).collect();
            prop_assert_eq!(within, expected_moves(&old_items, &new_items));
        }
    }

    #[test]
    fn diffing_a_list_against_itself_is_empty(list in unique_sections()) {
        prop_assert!(diff_lists(&list, &list).is_empty());
    }

    /// Translating every surviving old address lands on an item with the same identity.
    #[test]
    fn new_item_path_points_at_same_identity(old in unique_sections(), new in unique_sections()) {
        let cs = diff_lists(&old, &new);
        for (os, section) in old.iter().enumerate() {
            for (row, item) in section.items.iter().enumerate() {
                if let Some(to) = cs.new_item_path(ItemPath::new(os, row)) {
                    prop_assert_eq!(new[to.section].items[to.row].id, item.id);
                }
            }
        }
    }

    /// No identity is left deleted from one surviving section and inserted into another.
    #[test]
    fn cross_section_moves_leave_no_delete_insert_pairs(
        old in unique_sections(),
        new in unique_sections(),
    ) {
        let cs = diff_lists(&old, &new);
        let items = cs.items();
        let deleted: HashSet<u8> = items
            .deletes
            .iter()
            .map(|p| old[p.section].items[p.row].id)
            .collect();
        for p in &items.inserts {
            let id = new[p.section].items[p.row].id;
            prop_assert!(!deleted.contains(&id), "item {} was deleted and re-inserted", id);
        }
        for m in &items.moves {
            prop_assert_eq!(old[m.from.section].items[m.from.row].id, new[m.to.section].items[m.to.row].id);
        }
    }
}
