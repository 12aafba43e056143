//! Two-level reconciliation: sections first, then items of every surviving section, then
//! cross-section move collapsing.
use crate::changeset::{Changeset, IndexDiff, ItemPath, Move, Update};
use crate::diagnostics::{DiagnosticSink, Level, Side};
use crate::index_diff::{LevelDiff, diff_level, index_identities};
use crate::types::{Diffable, DiffableSection};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

type ItemId<S> = <<S as DiffableSection>::Item as Diffable>::Id;

/// Knobs for a single reconciliation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Collapse an item delete in one surviving section and an insert of the same identity in
    /// another surviving section into one move.
    pub cross_section_moves: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            cross_section_moves: true,
        }
    }
}

impl DiffOptions {
    pub fn cross_section_moves(mut self, enabled: bool) -> Self {
        self.cross_section_moves = enabled;
        self
    }
}

/// Borrowed view over both snapshots for the duration of one call.
pub struct DiffEngine<'a, S: DiffableSection> {
    old: &'a [S],
    new: &'a [S],
    options: DiffOptions,
    sink: &'a mut dyn DiagnosticSink,
}

/// Item-level pass for one matched section pair, in local row indices.
struct SectionPair {
    old_section: usize,
    new_section: usize,
    level: LevelDiff,
}

impl<'a, S: DiffableSection> DiffEngine<'a, S> {
    pub fn new(
        old: &'a [S],
        new: &'a [S],
        options: DiffOptions,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        DiffEngine {
            old,
            new,
            options,
            sink,
        }
    }

    pub fn reconcile(self) -> Changeset {
        let DiffEngine {
            old,
            new,
            options,
            sink,
        } = self;

        let sections = diff_level(old, new, Level::Section, Level::Section, &mut *sink);
        let section_map = sections.old_to_new.clone();

        // Whole-section inserts and deletes imply their items; only scan them for duplicates.
        for &old_section in &sections.diff.deletes {
            report_item_duplicates(&old[old_section], old_section, Side::Old, &mut *sink);
        }
        for &new_section in &sections.diff.inserts {
            report_item_duplicates(&new[new_section], new_section, Side::New, &mut *sink);
        }

        let pairs: Vec<SectionPair> = section_map
            .iter()
            .enumerate()
            .filter_map(|(old_section, matched)| {
                matched.map(|new_section| SectionPair {
                    old_section,
                    new_section,
                    level: diff_level(
                        old[old_section].items(),
                        new[new_section].items(),
                        Level::Item { section: old_section },
                        Level::Item { section: new_section },
                        &mut *sink,
                    ),
                })
            })
            .collect();

        let mut items: IndexDiff<ItemPath> = IndexDiff::default();
        let mut item_map: Vec<Vec<Option<ItemPath>>> =
            old.iter().map(|s| vec![None; s.items().len()]).collect();

        // Pending deletes by identity, in old traversal order.
        let mut orphans: IndexMap<ItemId<S>, Vec<ItemPath>> = IndexMap::new();
        let mut arrivals: Vec<ItemPath> = Vec::new();

        for pair in &pairs {
            let (os, ns) = (pair.old_section, pair.new_section);
            let at_old = |row: usize| ItemPath::new(os, row);
            let at_new = |row: usize| ItemPath::new(ns, row);

            for (row, matched) in pair.level.old_to_new.iter().enumerate() {
                item_map[os][row] = matched.map(at_new);
            }
            for &row in &pair.level.diff.deletes {
                if options.cross_section_moves {
                    orphans
                        .entry(old[os].items()[row].identity())
                        .or_default()
                        .push(at_old(row));
                } else {
                    items.deletes.push(at_old(row));
                }
            }
            if options.cross_section_moves {
                arrivals.extend(pair.level.diff.inserts.iter().map(|&row| at_new(row)));
            } else {
                items
                    .inserts
                    .extend(pair.level.diff.inserts.iter().map(|&row| at_new(row)));
            }
            items.moves.extend(pair.level.diff.moves.iter().map(|m| Move {
                from: at_old(m.from),
                to: at_new(m.to),
                content_changed: m.content_changed,
            }));
            items.updates.extend(pair.level.diff.updates.iter().map(|u| Update {
                from: at_old(u.from),
                to: at_new(u.to),
            }));
        }

        if options.cross_section_moves {
            // Which old section each surviving new section came from.
            let mut origin_of_new = vec![None; new.len()];
            for pair in &pairs {
                origin_of_new[pair.new_section] = Some(pair.old_section);
            }

            let mut cross_moves = 0usize;
            arrivals.sort_unstable();
            for to in arrivals {
                let target = &new[to.section].items()[to.row];
                let home = origin_of_new[to.section];
                let candidate = orphans.get_mut(&target.identity()).and_then(|queue| {
                    let pos = queue.iter().position(|from| Some(from.section) != home)?;
                    Some(queue.remove(pos))
                });
                match candidate {
                    Some(from) => {
                        let source = &old[from.section].items()[from.row];
                        items.moves.push(Move {
                            from,
                            to,
                            content_changed: !source.content_equals(target),
                        });
                        item_map[from.section][from.row] = Some(to);
                        cross_moves += 1;
                    }
                    None => items.inserts.push(to),
                }
            }
            items.deletes.extend(orphans.into_values().flatten());
            log::debug!("DiffEngine: collapsed {} cross-section item moves", cross_moves);
        }

        let changeset = Changeset::new(sections.diff, items, section_map, item_map);
        log::debug!(
            "DiffEngine: sections -{} +{} ~{} !{}, items -{} +{} ~{} !{}",
            changeset.sections().deletes.len(),
            changeset.sections().inserts.len(),
            changeset.sections().moves.len(),
            changeset.sections().updates.len(),
            changeset.items().deletes.len(),
            changeset.items().inserts.len(),
            changeset.items().moves.len(),
            changeset.items().updates.len(),
        );
        changeset
    }
}

fn report_item_duplicates<S: DiffableSection>(
    section: &S,
    index: usize,
    side: Side,
    sink: &mut dyn DiagnosticSink,
) {
    index_identities(section.items(), Level::Item { section: index }, side, sink);
}
