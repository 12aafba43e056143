//! Non-fatal findings reported while diffing, delivered through an injected sink.
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Which level of the two-level list a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Level {
    Section,
    /// Items of the section at this index (in the snapshot named by the accompanying `Side`).
    Item { section: usize },
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Section => write!(f, "section"),
            Level::Item { section } => write!(f, "item (section {})", section),
        }
    }
}

/// Which of the two snapshots a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => write!(f, "old"),
            Side::New => write!(f, "new"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Diagnostic {
    /// A later element reused an identity already seen at `first_index`. The later one is
    /// ignored for matching and ends up as a plain delete or insert.
    #[error("duplicate {level} identity {identity} in {side} list at index {index} (first seen at {first_index})")]
    DuplicateIdentity {
        level: Level,
        side: Side,
        identity: String,
        index: usize,
        first_index: usize,
    },
}

/// Receiver for diagnostics. Implementations must not panic.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Discards everything. The default for callers that do not pass a sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl DiagnosticSink for NoopSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// Forwards every diagnostic to the `log` facade at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("list-reconciler: {}", diagnostic);
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}
