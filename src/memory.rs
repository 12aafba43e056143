//! A headless [`Presentation`] over identity snapshots.
//!
//! Holds only identities: sections as `(section id, item ids)`. Fresh inserts are built from
//! the staged new snapshot, the way a view asks its already-updated data source.
use crate::changeset::ItemPath;
use crate::driver::Presentation;
use crate::types::{Diffable, DiffableSection};

type Snapshot<SI, II> = Vec<(SI, Vec<II>)>;

#[derive(Debug, Clone)]
pub struct InMemoryPresentation<SI, II> {
    live: Snapshot<SI, II>,
    staged: Snapshot<SI, II>,
    refreshed_sections: Vec<usize>,
    refreshed_items: Vec<ItemPath>,
}

fn snapshot<S: DiffableSection>(
    sections: &[S],
) -> Snapshot<S::Id, <S::Item as Diffable>::Id> {
    sections
        .iter()
        .map(|s| (s.identity(), s.items().iter().map(|i| i.identity()).collect()))
        .collect()
}

impl<SI: Clone, II: Clone> InMemoryPresentation<SI, II> {
    pub fn new<S>(sections: &[S]) -> Self
    where
        S: DiffableSection<Id = SI>,
        S::Item: Diffable<Id = II>,
    {
        InMemoryPresentation {
            live: snapshot(sections),
            staged: Vec::new(),
            refreshed_sections: Vec::new(),
            refreshed_items: Vec::new(),
        }
    }

    /// Sets the snapshot that fresh inserts are read from.
    pub fn stage<S>(&mut self, sections: &[S])
    where
        S: DiffableSection<Id = SI>,
        S::Item: Diffable<Id = II>,
    {
        self.staged = snapshot(sections);
        self.refreshed_sections.clear();
        self.refreshed_items.clear();
    }

    pub fn sections(&self) -> &[(SI, Vec<II>)] {
        &self.live
    }

    pub fn refreshed_sections(&self) -> &[usize] {
        &self.refreshed_sections
    }

    pub fn refreshed_items(&self) -> &[ItemPath] {
        &self.refreshed_items
    }
}

impl<SI: Clone, II: Clone> Presentation for InMemoryPresentation<SI, II> {
    type Section = (SI, Vec<II>);
    type Item = II;

    fn section_count(&self) -> usize {
        self.live.len()
    }

    fn item_count(&self, section: usize) -> usize {
        self.live.get(section).map_or(0, |(_, items)| items.len())
    }

    fn remove_item(&mut self, path: ItemPath) -> II {
        self.live[path.section].1.remove(path.row)
    }

    fn remove_section(&mut self, index: usize) -> (SI, Vec<II>) {
        self.live.remove(index)
    }

    fn insert_section(&mut self, index: usize, reused: Option<(SI, Vec<II>)>) {
        let section = match reused {
            Some(section) => section,
            None => match self.staged.get(index) {
                Some(section) => section.clone(),
                None => {
                    log::error!("InMemoryPresentation: no staged section at {}", index);
                    return;
                }
            },
        };
        self.live.insert(index, section);
    }

    fn insert_item(&mut self, path: ItemPath, reused: Option<II>) {
        let item = match reused {
            Some(item) => item,
            None => match self
                .staged
                .get(path.section)
                .and_then(|(_, items)| items.get(path.row))
            {
                Some(item) => item.clone(),
                None => {
                    log::error!("InMemoryPresentation: no staged item at {}", path);
                    return;
                }
            },
        };
        self.live[path.section].1.insert(path.row, item);
    }

    fn refresh_section(&mut self, index: usize) {
        self.refreshed_sections.push(index);
    }

    fn refresh_item(&mut self, path: ItemPath) {
        self.refreshed_items.push(path);
    }
}
