//! Minimal changesets between two snapshots of a sectioned list.
//!
//! Sections and items are matched by caller-supplied identity. The result lists deletes,
//! inserts, moves and in-place updates at both levels, with items that changed section
//! reported as single moves. Diffing is a pure function over borrowed snapshots.
//!
//! ```
//! use list_reconciler::{diff_lists, Element, Section};
//!
//! let old = vec![Section::new("s1", ()).with_items([
//!     Element::new("a", 1), Element::new("b", 1), Element::new("c", 1),
//! ])];
//! let new = vec![Section::new("s1", ()).with_items([
//!     Element::new("c", 1), Element::new("a", 1), Element::new("b", 1),
//! ])];
//! let changeset = diff_lists(&old, &new);
//! assert_eq!(changeset.items().moves.len(), 1);
//! ```
pub mod changeset;
pub mod diagnostics;
pub mod diff_engine;
pub mod driver;
pub mod errors;
pub mod index_diff;
pub mod memory;
pub mod types;

#[cfg(feature = "python")]
mod converters;
#[cfg(feature = "python")]
mod python;

pub use changeset::{Changeset, IndexDiff, ItemPath, Move, Update};
pub use diagnostics::{Diagnostic, DiagnosticSink, Level, LogSink, NoopSink, Side};
pub use diff_engine::{DiffEngine, DiffOptions};
pub use driver::{ApplyReport, BoundsPolicy, Presentation, apply_changeset};
pub use errors::ReconcilerError;
pub use index_diff::diff_indexed;
pub use memory::InMemoryPresentation;
pub use types::{Diffable, DiffableSection, Element, Section};

/// Diffs two section lists with default options, discarding diagnostics.
pub fn diff_lists<S: DiffableSection>(old: &[S], new: &[S]) -> Changeset {
    DiffEngine::new(old, new, DiffOptions::default(), &mut NoopSink).reconcile()
}

/// Diffs two section lists, reporting duplicate identities to `sink`.
pub fn diff_lists_with<S: DiffableSection>(
    old: &[S],
    new: &[S],
    options: DiffOptions,
    sink: &mut dyn DiagnosticSink,
) -> Changeset {
    DiffEngine::new(old, new, options, sink).reconcile()
}
