//! The edit script produced by a reconciliation: immutable, index-only, consumed once.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of an item: section index plus row within that section.
///
/// Whether the section index refers to the old or the new snapshot depends on where the
/// path appears (deletes and move sources are old-space; inserts and move targets new-space).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemPath {
    pub section: usize,
    pub row: usize,
}

impl ItemPath {
    pub fn new(section: usize, row: usize) -> Self {
        ItemPath { section, row }
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// An element that survived but changed position relative to the anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move<A> {
    pub from: A,
    pub to: A,
    /// Content differs as well; the element needs a refresh after it has been moved.
    pub content_changed: bool,
}

/// An anchored element whose content changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Update<A> {
    pub from: A,
    pub to: A,
}

/// Edits for one level, in the address type `A` of that level.
///
/// Each old address appears at most once across `deletes`, `moves[].from` and
/// `updates[].from`; each new address at most once across `inserts`, `moves[].to` and
/// `updates[].to`. Addresses in none of them are unchanged anchors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDiff<A> {
    pub deletes: Vec<A>,
    pub inserts: Vec<A>,
    pub moves: Vec<Move<A>>,
    pub updates: Vec<Update<A>>,
}

impl<A> Default for IndexDiff<A> {
    fn default() -> Self {
        IndexDiff {
            deletes: Vec::new(),
            inserts: Vec::new(),
            moves: Vec::new(),
            updates: Vec::new(),
        }
    }
}

impl<A: Ord + Copy> IndexDiff<A> {
    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty()
            && self.inserts.is_empty()
            && self.moves.is_empty()
            && self.updates.is_empty()
    }

    /// True when the diff changes the arrangement, not just content.
    pub fn has_structural_edits(&self) -> bool {
        !(self.deletes.is_empty() && self.inserts.is_empty() && self.moves.is_empty())
    }

    /// Sorts every list into the canonical order: deletes and inserts ascending, moves and
    /// updates by destination.
    pub(crate) fn normalize(&mut self) {
        self.deletes.sort_unstable();
        self.inserts.sort_unstable();
        self.moves.sort_unstable_by_key(|m| m.to);
        self.updates.sort_unstable_by_key(|u| u.to);
    }
}

/// Result of a two-level reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Changeset {
    sections: IndexDiff<usize>,
    items: IndexDiff<ItemPath>,
    /// Old section index -> new section index.
    #[serde(skip)]
    section_map: Vec<Option<usize>>,
    /// Old section index, old row -> new item path.
    #[serde(skip)]
    item_map: Vec<Vec<Option<ItemPath>>>,
}

impl Changeset {
    pub(crate) fn new(
        mut sections: IndexDiff<usize>,
        mut items: IndexDiff<ItemPath>,
        section_map: Vec<Option<usize>>,
        item_map: Vec<Vec<Option<ItemPath>>>,
    ) -> Self {
        sections.normalize();
        items.normalize();
        Changeset {
            sections,
            items,
            section_map,
            item_map,
        }
    }

    pub fn sections(&self) -> &IndexDiff<usize> {
        &self.sections
    }

    pub fn items(&self) -> &IndexDiff<ItemPath> {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.items.is_empty()
    }

    /// Where the section at `old` ended up, or `None` if it was deleted or never existed.
    pub fn new_section_index(&self, old: usize) -> Option<usize> {
        self.section_map.get(old).copied().flatten()
    }

    /// Where the item at `old` ended up, or `None` if it (or its whole section) was deleted.
    pub fn new_item_path(&self, old: ItemPath) -> Option<ItemPath> {
        self.item_map
            .get(old.section)
            .and_then(|rows| rows.get(old.row))
            .copied()
            .flatten()
    }

    /// Re-targets a selection (or focus) taken against the old snapshot. Deleted paths drop out;
    /// the survivors keep their input order.
    pub fn retarget(&self, old_paths: impl IntoIterator<Item = ItemPath>) -> Vec<ItemPath> {
        old_paths
            .into_iter()
            .filter_map(|p| self.new_item_path(p))
            .collect()
    }
}
