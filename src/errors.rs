//! Error types. Diffing itself never fails; these cover changeset replay and the Python edge.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcilerError {
    /// The presentation's live structure does not match the snapshot the changeset was
    /// computed against.
    #[error("{what} address {address} is out of bounds (live count {count})")]
    OutOfBoundsAddress {
        what: &'static str,
        address: String,
        count: usize,
    },

    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversionError { expected: String, actual: String },

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Python call failed: {0}")]
    PythonError(String),
}

#[cfg(feature = "python")]
impl From<ReconcilerError> for pyo3::PyErr {
    fn from(err: ReconcilerError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for ReconcilerError {
    fn from(err: pyo3::PyErr) -> Self {
        ReconcilerError::PythonError(err.to_string())
    }
}
