//! # Executor Node Traits
//!
//! `VecPlanState` is implemented by every executor node so that Append can stack
//! scans and nested appends. The other traits are the seams to the surrounding
//! executor: the table access method, the EvalPlanQual row-mark fetch, the
//! compiled filter/projection plan and the boolean qual.

use crate::context::{EState, ExprContext};
use crate::error::Result;
use arrow::array::BooleanArray;
use arrow::record_batch::RecordBatch;

pub trait VecPlanState {
    fn name(&self) -> &'static str;

    /// Next non-empty batch, or `None` once the node is exhausted or the query
    /// is being cancelled.
    fn exec(&mut self, estate: &mut EState) -> Result<Option<RecordBatch>>;

    /// Restart from the beginning. `changed_params` lists the executor
    /// parameters whose values changed since the last scan.
    fn rescan(&mut self, estate: &mut EState, changed_params: &[usize]) -> Result<()>;

    /// Release resources. The node is not used afterwards.
    fn end(&mut self, estate: &mut EState) -> Result<()>;
}

/// Access method of one scanned relation.
///
/// Batches carry the relation's live columns in table-descriptor order.
pub trait ScanAccess {
    fn next(&mut self) -> Result<Option<RecordBatch>>;

    /// Whether a substituted batch still satisfies the scan's access
    /// conditions. Only called while an EvalPlanQual recheck is active.
    fn recheck(&mut self, _batch: &RecordBatch) -> Result<bool> {
        Ok(true)
    }

    fn rescan(&mut self) -> Result<()>;

    fn end(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Fetches the locked row of relation `scanrelid` during an EvalPlanQual
/// recheck. `None` means the row is gone.
pub trait RowMarkFetch {
    fn fetch(&mut self, scanrelid: usize) -> Result<Option<RecordBatch>>;
}

/// A compiled filter/projection plan run over every fetched batch. Returning
/// `None` ends the scan.
pub trait VecPlan {
    fn execute(&mut self, input: RecordBatch, ctx: &mut ExprContext) -> Result<Option<RecordBatch>>;

    fn rescan(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Boolean scan qual. Rows where the result is false or null are dropped.
pub trait VecQual {
    fn evaluate(&self, batch: &RecordBatch, ctx: &mut ExprContext) -> Result<BooleanArray>;
}
