//! Identity and content-equality model shared by every level of the diff.
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Something the engine can match across two snapshots.
///
/// `identity` decides whether two values occupy "the same slot"; it must be supplied by the
/// caller and stay stable between snapshots. `content_equals` is only ever asked about two
/// values that already share an identity, and decides whether a refresh is needed.
pub trait Diffable {
    type Id: Eq + Hash + Clone + Debug;

    fn identity(&self) -> Self::Id;

    fn content_equals(&self, other: &Self) -> bool;
}

/// A diffable value that owns an ordered run of diffable items.
pub trait DiffableSection: Diffable {
    type Item: Diffable;

    fn items(&self) -> &[Self::Item];
}

/// A plain identity/content pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Element<I, C> {
    pub id: I,
    pub content: C,
}

impl<I, C> Element<I, C> {
    pub fn new(id: I, content: C) -> Self {
        Element { id, content }
    }
}

impl<I, C> Diffable for Element<I, C>
where
    I: Eq + Hash + Clone + Debug,
    C: PartialEq,
{
    type Id = I;

    fn identity(&self) -> I {
        self.id.clone()
    }

    fn content_equals(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

/// A section: its own identity and content, plus its items.
///
/// Section content covers only the section itself (header, styling, ...); a change to an
/// item never makes the section unequal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section<I, C, T> {
    pub id: I,
    pub content: C,
    pub items: Vec<T>,
}

impl<I, C, T> Section<I, C, T> {
    pub fn new(id: I, content: C) -> Self {
        Section {
            id,
            content,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = T>) -> Self {
        self.items = items.into_iter().collect();
        self
    }
}

impl<I, C, T> Diffable for Section<I, C, T>
where
    I: Eq + Hash + Clone + Debug,
    C: PartialEq,
{
    type Id = I;

    fn identity(&self) -> I {
        self.id.clone()
    }

    fn content_equals(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl<I, C, T> DiffableSection for Section<I, C, T>
where
    I: Eq + Hash + Clone + Debug,
    C: PartialEq,
    T: Diffable,
{
    type Item = T;

    fn items(&self) -> &[T] {
        &self.items
    }
}
