//! Python module entry point.
//!
//! Sections arrive as `[{"id": ..., "content": ..., "items": [{"id": ..., "content": ...}]}]`.
//! Ids may be strings or integers; content is any JSON-serializable value compared by value.
use crate::converters::{json_to_pyobject, python_to_json};
use crate::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::diff_engine::DiffOptions;
use crate::errors::ReconcilerError;
use crate::types::{Diffable, DiffableSection};
use pyo3::prelude::*;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
enum WireId {
    Int(i64),
    Str(String),
}

#[derive(Debug, Deserialize)]
struct WireItem {
    id: WireId,
    #[serde(default)]
    content: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireSection {
    id: WireId,
    #[serde(default)]
    content: serde_json::Value,
    #[serde(default)]
    items: Vec<WireItem>,
}

impl Diffable for WireItem {
    type Id = WireId;

    fn identity(&self) -> WireId {
        self.id.clone()
    }

    fn content_equals(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl Diffable for WireSection {
    type Id = WireId;

    fn identity(&self) -> WireId {
        self.id.clone()
    }

    fn content_equals(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl DiffableSection for WireSection {
    type Item = WireItem;

    fn items(&self) -> &[WireItem] {
        &self.items
    }
}

fn parse_sections<'py>(
    py: Python<'py>,
    obj: &Bound<'py, PyAny>,
) -> Result<Vec<WireSection>, ReconcilerError> {
    let value = python_to_json(py, obj)?;
    Ok(serde_json::from_value(value)?)
}

/// Stateless: every `diff` call is independent and may run on any thread.
#[pyclass]
pub struct Reconciler {
    options: DiffOptions,
    log_diagnostics: bool,
}

#[pymethods]
impl Reconciler {
    #[new]
    #[pyo3(signature = (cross_section_moves=true, log_diagnostics=false))]
    fn new(cross_section_moves: bool, log_diagnostics: bool) -> Self {
        Reconciler {
            options: DiffOptions::default().cross_section_moves(cross_section_moves),
            log_diagnostics,
        }
    }

    fn diff<'py>(
        &self,
        py: Python<'py>,
        old_sections: &Bound<'py, PyAny>,
        new_sections: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyAny>> {
        let old = parse_sections(py, old_sections)?;
        let new = parse_sections(py, new_sections)?;

        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let changeset = crate::diff_lists_with(&old, &new, self.options, &mut diagnostics);
        if self.log_diagnostics {
            for diagnostic in &diagnostics {
                LogSink.report(diagnostic.clone());
            }
        }

        let payload = serde_json::json!({
            "changeset": serde_json::to_value(&changeset).map_err(ReconcilerError::from)?,
            "diagnostics": diagnostics.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        });
        json_to_pyobject(py, &payload)
    }
}

#[pymodule]
fn list_reconciler(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Reconciler>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
