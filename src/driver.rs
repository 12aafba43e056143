//! Replays a [`Changeset`] against a live presentation.
//!
//! Order: item removals, section removals (highest address first), section insertions, item
//! insertions (ascending), then content refreshes. Moves are removals whose detached view is
//! handed back on the matching insertion, so the presentation can keep it instead of
//! rebuilding it.
use crate::changeset::{Changeset, ItemPath};
use crate::errors::ReconcilerError;

/// The live structure a changeset is applied to.
///
/// The driver checks every address against `section_count`/`item_count` before calling the
/// mutating methods, so implementations may index directly.
pub trait Presentation {
    /// A detached section (with its items).
    type Section;
    /// A detached item.
    type Item;

    fn section_count(&self) -> usize;
    fn item_count(&self, section: usize) -> usize;

    fn remove_item(&mut self, path: ItemPath) -> Self::Item;
    fn remove_section(&mut self, index: usize) -> Self::Section;

    /// `reused` is `Some` for a move; `None` asks the presentation to build the section
    /// (items included) from its new data.
    fn insert_section(&mut self, index: usize, reused: Option<Self::Section>);
    fn insert_item(&mut self, path: ItemPath, reused: Option<Self::Item>);

    fn refresh_section(&mut self, index: usize);
    fn refresh_item(&mut self, path: ItemPath);
}

/// What to do with an address that does not exist in the live structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// Panic. Mismatched snapshots are a bug worth stopping for.
    Strict,
    /// Log, skip the edit and record it in the [`ApplyReport`].
    Lenient,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            BoundsPolicy::Strict
        } else {
            BoundsPolicy::Lenient
        }
    }
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    pub skipped: Vec<ReconcilerError>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

enum Source {
    Fresh,
    Moved(usize),
}

struct Replay<'p, P: Presentation> {
    presentation: &'p mut P,
    policy: BoundsPolicy,
    report: ApplyReport,
}

impl<P: Presentation> Replay<'_, P> {
    fn violation(&mut self, err: ReconcilerError) {
        match self.policy {
            BoundsPolicy::Strict => panic!("changeset does not match presentation: {}", err),
            BoundsPolicy::Lenient => {
                log::error!("Reconciler: skipping edit, {}", err);
                self.report.skipped.push(err);
            }
        }
    }

    fn check_section(&mut self, index: usize, inserting: bool) -> bool {
        let count = self.presentation.section_count();
        let ok = if inserting { index <= count } else { index < count };
        if !ok {
            self.violation(ReconcilerError::OutOfBoundsAddress {
                what: "section",
                address: index.to_string(),
                count,
            });
        }
        ok
    }

    fn check_item(&mut self, path: ItemPath, inserting: bool) -> bool {
        if !self.check_section(path.section, false) {
            return false;
        }
        let count = self.presentation.item_count(path.section);
        let ok = if inserting { path.row <= count } else { path.row < count };
        if !ok {
            self.violation(ReconcilerError::OutOfBoundsAddress {
                what: "item",
                address: path.to_string(),
                count,
            });
        }
        ok
    }
}

/// Applies `changeset` to `presentation`. Out-of-bounds addresses are handled per `policy`.
pub fn apply_changeset<P: Presentation>(
    presentation: &mut P,
    changeset: &Changeset,
    policy: BoundsPolicy,
) -> ApplyReport {
    let sections = changeset.sections();
    let items = changeset.items();
    let mut replay = Replay {
        presentation,
        policy,
        report: ApplyReport::default(),
    };

    // Removals, deepest and highest first so earlier addresses stay valid.
    let mut held_items: Vec<Option<P::Item>> = items.moves.iter().map(|_| None).collect();
    let mut item_removals: Vec<(ItemPath, Source)> = items
        .deletes
        .iter()
        .map(|&p| (p, Source::Fresh))
        .chain(items.moves.iter().enumerate().map(|(i, m)| (m.from, Source::Moved(i))))
        .collect();
    item_removals.sort_unstable_by(|a, b| b.0.cmp(&a.0));
    for (path, source) in item_removals {
        if !replay.check_item(path, false) {
            continue;
        }
        let detached = replay.presentation.remove_item(path);
        if let Source::Moved(i) = source {
            held_items[i] = Some(detached);
        }
    }

    let mut held_sections: Vec<Option<P::Section>> = sections.moves.iter().map(|_| None).collect();
    let mut section_removals: Vec<(usize, Source)> = sections
        .deletes
        .iter()
        .map(|&s| (s, Source::Fresh))
        .chain(sections.moves.iter().enumerate().map(|(i, m)| (m.from, Source::Moved(i))))
        .collect();
    section_removals.sort_unstable_by(|a, b| b.0.cmp(&a.0));
    for (index, source) in section_removals {
        if !replay.check_section(index, false) {
            continue;
        }
        let detached = replay.presentation.remove_section(index);
        if let Source::Moved(i) = source {
            held_sections[i] = Some(detached);
        }
    }

    // Insertions, ascending so each lands at its final address.
    let mut section_insertions: Vec<(usize, Source)> = sections
        .inserts
        .iter()
        .map(|&s| (s, Source::Fresh))
        .chain(sections.moves.iter().enumerate().map(|(i, m)| (m.to, Source::Moved(i))))
        .collect();
    section_insertions.sort_unstable_by_key(|entry| entry.0);
    for (index, source) in section_insertions {
        let reused = match source {
            Source::Fresh => None,
            Source::Moved(i) => match held_sections[i].take() {
                Some(section) => Some(section),
                // Its removal was skipped; re-inserting would duplicate it.
                None => continue,
            },
        };
        if replay.check_section(index, true) {
            replay.presentation.insert_section(index, reused);
        }
    }

    let mut item_insertions: Vec<(ItemPath, Source)> = items
        .inserts
        .iter()
        .map(|&p| (p, Source::Fresh))
        .chain(items.moves.iter().enumerate().map(|(i, m)| (m.to, Source::Moved(i))))
        .collect();
    item_insertions.sort_unstable_by_key(|entry| entry.0);
    for (path, source) in item_insertions {
        let reused = match source {
            Source::Fresh => None,
            Source::Moved(i) => match held_items[i].take() {
                Some(item) => Some(item),
                None => continue,
            },
        };
        if replay.check_item(path, true) {
            replay.presentation.insert_item(path, reused);
        }
    }

    // Content refreshes, addressed in the new snapshot.
    let section_refreshes = sections
        .updates
        .iter()
        .map(|u| u.to)
        .chain(sections.moves.iter().filter(|m| m.content_changed).map(|m| m.to));
    for index in section_refreshes {
        if replay.check_section(index, false) {
            replay.presentation.refresh_section(index);
        }
    }
    let item_refreshes = items
        .updates
        .iter()
        .map(|u| u.to)
        .chain(items.moves.iter().filter(|m| m.content_changed).map(|m| m.to));
    for path in item_refreshes {
        if replay.check_item(path, false) {
            replay.presentation.refresh_item(path);
        }
    }

    replay.report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::IndexDiff;
    use crate::memory::InMemoryPresentation;
    use crate::types::{Element, Section};
    use crate::diff_lists;

    type Sec = Section<u32, u8, Element<char, u8>>;

    fn sec(id: u32, items: &str) -> Sec {
        Section::new(id, 0).with_items(items.chars().map(|c| Element::new(c, 0)))
    }

    fn bogus_delete() -> Changeset {
        let items = IndexDiff {
            deletes: vec![ItemPath::new(0, 5)],
            ..IndexDiff::default()
        };
        Changeset::new(IndexDiff::default(), items, vec![Some(0)], vec![vec![Some(ItemPath::new(0, 0))]])
    }

    #[test]
    fn replays_moves_across_moved_sections() {
        let old = vec![sec(1, "ab"), sec(2, "c")];
        let new = vec![sec(2, "ca"), sec(1, "b")];
        let cs = diff_lists(&old, &new);
        let mut view = InMemoryPresentation::new(&old);
        view.stage(&new);
        let report = apply_changeset(&mut view, &cs, BoundsPolicy::Strict);
        assert!(report.is_clean());
        assert_eq!(view.sections(), InMemoryPresentation::new(&new).sections());
    }

    #[test]
    fn lenient_policy_skips_unknown_addresses() {
        let old = vec![sec(1, "a")];
        let mut view = InMemoryPresentation::new(&old);
        view.stage(&old);
        let report = apply_changeset(&mut view, &bogus_delete(), BoundsPolicy::Lenient);
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0],
            ReconcilerError::OutOfBoundsAddress { what: "item", count: 1, .. }
        ));
        assert_eq!(view.sections(), InMemoryPresentation::new(&old).sections());
    }

    #[test]
    #[should_panic(expected = "changeset does not match presentation")]
    fn strict_policy_panics_on_unknown_addresses() {
        let old = vec![sec(1, "a")];
        let mut view = InMemoryPresentation::new(&old);
        apply_changeset(&mut view, &bogus_delete(), BoundsPolicy::Strict);
    }

    #[test]
    fn refreshes_updated_and_changed_moved_items() {
        let old = vec![Section::new(1u32, 0u8).with_items([
            Element::new('a', 0u8),
            Element::new('b', 0),
            Element::new('c', 0),
        ])];
        let new = vec![Section::new(1u32, 1u8).with_items([
            Element::new('c', 1u8),
            Element::new('a', 1),
            Element::new('b', 0),
        ])];
        let cs = diff_lists(&old, &new);
        let mut view = InMemoryPresentation::new(&old);
        view.stage(&new);
        apply_changeset(&mut view, &cs, BoundsPolicy::Strict);
        assert_eq!(view.refreshed_sections(), &[0]);
        let mut refreshed = view.refreshed_items().to_vec();
        refreshed.sort();
        assert_eq!(refreshed, vec![ItemPath::new(0, 0), ItemPath::new(0, 1)]);
    }
}
