//! # dxl-core: DXL Operator Tree
//!
//! This crate implements the in-memory representation of DXL (Data eXchange
//! Language) plans: the strongly typed operator tree that a cost-based optimizer
//! and an executor exchange. It is the foundation of the codec (`dxl-xml`), the
//! vectorized executor (`dxl-exec`) and the service (`dxl-server`).
//!
//! ## Module Overview
//!
//! - **`mdid`**: Metadata ids, their wire form, and deletion-lock pinning in an
//!   interning cache.
//! - **`md_accessor`**: The `MdAccessor` trait through which operators resolve
//!   types, functions, aggregates and scalar operators, plus an in-memory
//!   implementation.
//! - **`colref`**: Shared column references and table/index descriptors.
//! - **`datum`**: Typed constant values.
//! - **`scalar`** / **`physical`**: One payload struct per operator.
//! - **`operator`**: The closed `DxlOperator` sum type, operator ids, element
//!   names, boolean-result inference and typed downcasts.
//! - **`node`**: The tree container and the plan envelope.
//! - **`validate`**: The structural validation pass.
//! - **`error`**: `DxlError`, returned wherever a malformed plan is detected.

#[macro_use]
mod macros;

pub mod colref;
pub mod datum;
pub mod error;
pub mod md_accessor;
pub mod mdid;
pub mod node;
pub mod operator;
pub mod physical;
pub mod scalar;
pub mod validate;

pub use error::{DxlError, Result};
pub use md_accessor::MdAccessor;
pub use mdid::MdId;
pub use node::{DxlNode, DxlPlan};
pub use operator::{DxlOpId, DxlOperator, OperatorCast, PhysicalOp, ScalarOp};
