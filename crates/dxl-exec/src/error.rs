use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use dxl_core::{DxlError, MdId};

/// Errors raised while building or running executor nodes. All of them abort
/// the current query; none is retried.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// A batch could not be rewritten to the output schema an Append node
    /// established with its first batch.
    #[error("cannot rewrite batch schema [{found}] to [{expected}]: {reason}")]
    SchemaMismatch {
        expected: String,
        found: String,
        reason: String,
    },

    #[error("unsupported Arrow type {0}")]
    UnsupportedType(DataType),

    #[error("no Arrow mapping for type {0}")]
    UnknownTypeMdid(MdId),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// The builder met an operator or layout it cannot execute.
    #[error("unsupported plan: {0}")]
    UnsupportedPlan(String),

    #[error(transparent)]
    Dxl(#[from] DxlError),

    /// Failure reported by an access method, row-mark fetch or compiled plan.
    #[error("access method failed: {0}")]
    AccessMethod(String),
}

pub type Result<T> = std::result::Result<T, ExecError>;
