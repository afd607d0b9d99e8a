//! # dxl-exec: Vectorized Scan and Append
//!
//! Executor nodes that pull Arrow record batches through a physical DXL plan.
//! A node is driven with `exec` until it returns `Ok(None)`; a returned batch
//! always has at least one row.
//!
//! ## Module Overview
//!
//! - **`context`**: Executor state shared by the nodes of one query slice:
//!   interrupt flags, the EvalPlanQual substitution state, scan direction and
//!   the per-tuple expression context.
//! - **`node`**: The executor-node trait and the collaborator traits the
//!   surrounding executor provides (access methods, row marks, compiled plans,
//!   quals).
//! - **`scan`**: `VecScanState`, the vectorized scan loop.
//! - **`append`**: `VecAppendState`, sub-plan iteration with output schema
//!   unification.
//! - **`schema`**: Type mapping between catalog types and Arrow, and the schema
//!   rewrite strategies used by Append.
//! - **`builder`**: Turns a physical `DxlNode` into executor nodes.
//! - **`error`**: `ExecError`.

pub mod append;
pub mod builder;
pub mod context;
pub mod error;
pub mod node;
pub mod scan;
pub mod schema;

pub use append::{AppendConfig, VecAppendState};
pub use builder::{AccessMethodProvider, ExecBuilder};
pub use context::{EState, EpqState, ExprContext, InterruptFlags, ScanDirection};
pub use error::{ExecError, Result};
pub use node::{RowMarkFetch, ScanAccess, VecPlan, VecPlanState, VecQual};
pub use scan::{Projection, VecScanState};
pub use schema::RewriteStrategy;
