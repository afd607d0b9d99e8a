//! # Errors
//!
//! Every structural rule of the operator tree is reported here as a recoverable
//! error rather than a debug assertion. Callers at the statement
//! boundary decide whether to abort the query; nothing in this crate panics on a
//! malformed plan.

use crate::mdid::MdId;
use crate::operator::DxlOpId;

/// Errors raised while building, validating or interrogating a DXL tree.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DxlError {
    /// A metadata id passed to a constructor is the invalid id.
    #[error("invalid metadata id for attribute {attr} of {op}")]
    InvalidMdId { op: &'static str, attr: &'static str },

    /// A metadata id string could not be parsed.
    #[error("malformed metadata id '{0}'")]
    MalformedMdId(String),

    /// A metadata id carries a kind discriminant this build does not know.
    #[error("unsupported metadata id type {0}")]
    UnsupportedMdIdType(u32),

    /// The number of children does not match the operator's declared arity.
    #[error("{op:?} expects {expected} children, found {found}")]
    Arity {
        op: DxlOpId,
        expected: String,
        found: usize,
    },

    /// A child is of the wrong operator class or kind.
    #[error("child {index} of {op:?} must be {expected}, found {found:?}")]
    ChildKind {
        op: DxlOpId,
        index: usize,
        expected: &'static str,
        found: DxlOpId,
    },

    /// A quantified (ANY/ALL) sub-plan was built without a test expression.
    #[error("{0} sub-plan requires a test expression")]
    MissingTestExpr(&'static str),

    /// A typed downcast was attempted on an operator of a different kind.
    #[error("expected operator {expected}, found {found:?}")]
    OperatorKindMismatch {
        expected: &'static str,
        found: DxlOpId,
    },

    /// `has_bool_result` was called on a container operator.
    #[error("{0:?} is a container operator and has no scalar result")]
    ContainerOperator(DxlOpId),

    /// The metadata accessor has no object for the id.
    #[error("{kind} {mdid} not found in metadata accessor")]
    MetadataLookup { kind: &'static str, mdid: MdId },

    /// The id is pinned by a deletion lock and cannot be released.
    #[error("metadata id {0} is locked against deletion")]
    MdIdLocked(MdId),

    /// `remove_deletion_lock` was called with no outstanding lock.
    #[error("deletion lock count of {0} is already zero")]
    DeletionLockUnderflow(MdId),

    /// Any other malformed-plan condition.
    #[error("malformed plan: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, DxlError>;
