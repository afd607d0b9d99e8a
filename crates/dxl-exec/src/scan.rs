//! # Vectorized Scan
//!
//! `VecScanState` pulls batches from a relation's access method and returns the
//! ones with surviving rows. Each call to `exec` runs this loop:
//!
//! 1. Return `None` at once when the query is finishing or cancelled. Nothing
//!    else is touched.
//! 2. Reset the expression context, fetch, reset it again. The reset happens on
//!    every attempt whatever its outcome.
//! 3. An empty fetch ends the scan.
//! 4. With a compiled plan, the plan's output replaces the batch and a plan
//!    returning `None` ends the scan. Otherwise the qual filters the batch.
//! 5. The projection is applied. An empty target list (a bare `COUNT(*)`)
//!    yields batches with no columns and the fetched row count.
//! 6. A batch left with zero rows does not end the scan; the loop fetches again.
//!
//! ## EvalPlanQual
//!
//! While an EPQ recheck is active the fetch is replaced, for this scan's
//! range-table entry, by one of four substitutions:
//!
//! - `scanrelid == 0` (a pushed-down join has no single entry): recheck the
//!   current scan slot once.
//! - `relsubs_done`: the substitute was already returned, so the scan is empty.
//! - `relsubs_slot`: recheck and return the replacement batch, then mark done.
//! - `relsubs_rowmark`: fetch the locked row through the row mark, recheck it,
//!   then mark done.
//!
//! A relation with none of these falls back to its access method.

use crate::context::{EState, EpqState, ExprContext};
use crate::error::{ExecError, Result};
use crate::node::{ScanAccess, VecPlan, VecPlanState, VecQual};
use crate::schema::{describe, row_count_batch};
use arrow::compute::filter_record_batch;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;
use tracing::{debug, trace};

/// Target list of a scan: which input columns to keep, and under which names.
#[derive(Debug, Clone)]
pub struct Projection {
    columns: Vec<usize>,
    schema: SchemaRef,
}

impl Projection {
    /// Keep the input columns at the given indices, renamed to the given
    /// aliases, in the given order.
    pub fn new(input: &Schema, columns: Vec<(usize, String)>) -> Result<Self> {
        let mut fields = Vec::with_capacity(columns.len());
        let mut indices = Vec::with_capacity(columns.len());
        for (index, alias) in columns {
            let field = input.fields().get(index).ok_or_else(|| ExecError::SchemaMismatch {
                expected: format!("column {index}"),
                found: describe(input),
                reason: "projection refers past the last input column".to_string(),
            })?;
            fields.push(field.as_ref().clone().with_name(alias));
            indices.push(index);
        }
        Ok(Self {
            columns: indices,
            schema: Arc::new(Schema::new(fields)),
        })
    }

    /// Empty target list: only the row count is produced.
    pub fn count_only() -> Self {
        Self {
            columns: Vec::new(),
            schema: Arc::new(Schema::empty()),
        }
    }

    pub fn is_count_only(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    fn apply(&self, batch: RecordBatch) -> Result<RecordBatch> {
        if self.is_count_only() {
            return row_count_batch(self.schema.clone(), batch.num_rows());
        }
        let columns = self
            .columns
            .iter()
            .map(|&index| {
                if index < batch.num_columns() {
                    Ok(batch.column(index).clone())
                } else {
                    Err(ExecError::SchemaMismatch {
                        expected: describe(&self.schema),
                        found: describe(&batch.schema()),
                        reason: format!("batch has no column {index}"),
                    })
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordBatch::try_new(self.schema.clone(), columns)?)
    }
}

pub struct VecScanState {
    scanrelid: usize,
    access: Box<dyn ScanAccess>,
    qual: Option<Box<dyn VecQual>>,
    plan: Option<Box<dyn VecPlan>>,
    projection: Option<Projection>,
    expr_context: ExprContext,
    /// Last batch returned by the access method.
    scan_slot: Option<RecordBatch>,
    access_calls: u64,
}

impl VecScanState {
    /// `scanrelid` is the 1-based range-table index of the scanned relation, or
    /// 0 for a scan that stands for a pushed-down join.
    pub fn new(scanrelid: usize, access: Box<dyn ScanAccess>) -> Self {
        Self {
            scanrelid,
            access,
            qual: None,
            plan: None,
            projection: None,
            expr_context: ExprContext::new(),
            scan_slot: None,
            access_calls: 0,
        }
    }

    pub fn with_qual(mut self, qual: Box<dyn VecQual>) -> Self {
        self.qual = Some(qual);
        self
    }

    pub fn with_plan(mut self, plan: Box<dyn VecPlan>) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn scanrelid(&self) -> usize {
        self.scanrelid
    }

    pub fn expr_context(&self) -> &ExprContext {
        &self.expr_context
    }

    /// How many times the access method has been asked for a batch.
    pub fn access_calls(&self) -> u64 {
        self.access_calls
    }

    fn fetch(&mut self, estate: &mut EState) -> Result<Option<RecordBatch>> {
        if let Some(epq) = estate.epq.as_mut() {
            if self.scanrelid == 0 {
                return match self.scan_slot.take() {
                    Some(slot) => self.recheck(slot),
                    None => Ok(None),
                };
            }
            let index = self.scanrelid - 1;
            if epq.relsubs_done.get(index).copied().unwrap_or(false) {
                trace!("EPQ substitute for relation {} already returned", self.scanrelid);
                return Ok(None);
            }
            if let Some(slot) = epq.relsubs_slot.get(index).cloned().flatten() {
                mark_done(epq, index);
                return self.recheck(slot);
            }
            if let Some(rowmark) = epq.relsubs_rowmark.get_mut(index).and_then(Option::as_mut) {
                let fetched = rowmark.fetch(self.scanrelid)?;
                mark_done(epq, index);
                return match fetched {
                    Some(slot) => self.recheck(slot),
                    None => Ok(None),
                };
            }
        }

        self.access_calls += 1;
        let batch = self.access.next()?;
        self.scan_slot = batch.clone();
        Ok(batch)
    }

    fn recheck(&mut self, slot: RecordBatch) -> Result<Option<RecordBatch>> {
        if self.access.recheck(&slot)? {
            Ok(Some(slot))
        } else {
            trace!("EPQ recheck rejected substitute for relation {}", self.scanrelid);
            Ok(None)
        }
    }

    fn apply_qual(&mut self, batch: RecordBatch) -> Result<RecordBatch> {
        match &self.qual {
            Some(qual) => {
                let mask = qual.evaluate(&batch, &mut self.expr_context)?;
                Ok(filter_record_batch(&batch, &mask)?)
            }
            None => Ok(batch),
        }
    }
}

fn mark_done(epq: &mut EpqState, index: usize) {
    if let Some(done) = epq.relsubs_done.get_mut(index) {
        *done = true;
    }
}

impl VecPlanState for VecScanState {
    fn name(&self) -> &'static str {
        "VecScan"
    }

    fn exec(&mut self, estate: &mut EState) -> Result<Option<RecordBatch>> {
        loop {
            if estate.interrupts.should_stop() {
                debug!("Scan of relation {} stopped by pending interrupt", self.scanrelid);
                return Ok(None);
            }

            self.expr_context.reset();
            let fetched = self.fetch(estate);
            self.expr_context.reset();
            let Some(batch) = fetched? else {
                return Ok(None);
            };

            let batch = match self.plan.as_mut() {
                Some(plan) => match plan.execute(batch, &mut self.expr_context)? {
                    Some(out) => out,
                    None => return Ok(None),
                },
                None => self.apply_qual(batch)?,
            };
            let batch = match &self.projection {
                Some(projection) => projection.apply(batch)?,
                None => batch,
            };

            if batch.num_rows() == 0 {
                trace!("Scan of relation {} skipped an empty batch", self.scanrelid);
                continue;
            }
            trace!("Scan of relation {} produced {} rows", self.scanrelid, batch.num_rows());
            return Ok(Some(batch));
        }
    }

    fn rescan(&mut self, estate: &mut EState, _changed_params: &[usize]) -> Result<()> {
        if self.scanrelid > 0 {
            if let Some(epq) = estate.epq.as_mut() {
                if let Some(done) = epq.relsubs_done.get_mut(self.scanrelid - 1) {
                    *done = false;
                }
            }
        }
        self.scan_slot = None;
        self.expr_context.reset();
        self.access.rescan()?;
        if let Some(plan) = self.plan.as_mut() {
            plan.rescan()?;
        }
        Ok(())
    }

    fn end(&mut self, _estate: &mut EState) -> Result<()> {
        self.scan_slot = None;
        self.expr_context.reset();
        self.access.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, ArrayRef, BooleanArray, Int32Array};
    use arrow::compute::kernels::cmp::gt;
    use arrow::datatypes::{DataType, Field};
    use std::collections::VecDeque;

    fn batch(values: &[i32]) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![
            Field::new("a", DataType::Int32, true),
            Field::new("b", DataType::Int32, true),
        ]));
        let a: ArrayRef = Arc::new(Int32Array::from(values.to_vec()));
        let b: ArrayRef = Arc::new(Int32Array::from(
            values.iter().map(|v| v * 10).collect::<Vec<_>>(),
        ));
        RecordBatch::try_new(schema, vec![a, b]).unwrap()
    }

    struct Batches(VecDeque<RecordBatch>);

    impl ScanAccess for Batches {
        fn next(&mut self) -> Result<Option<RecordBatch>> {
            Ok(self.0.pop_front())
        }

        fn rescan(&mut self) -> Result<()> {
            Ok(())
        }
    }

    /// `a > 2`, with the comparison result parked in the expression context.
    struct AGreaterThanTwo;

    impl VecQual for AGreaterThanTwo {
        fn evaluate(&self, batch: &RecordBatch, ctx: &mut ExprContext) -> Result<BooleanArray> {
            let a = batch
                .column(0)
                .as_any()
                .downcast_ref::<Int32Array>()
                .ok_or_else(|| ExecError::AccessMethod("a is not int4".into()))?;
            let mask = gt(a, &Int32Array::new_scalar(2))?;
            ctx.register(Arc::new(mask.clone()));
            Ok(mask)
        }
    }

    fn scan(batches: Vec<RecordBatch>) -> VecScanState {
        VecScanState::new(1, Box::new(Batches(batches.into())))
    }

    #[test]
    fn test_qual_drops_rows_and_skips_empty_batches() {
        let mut node = scan(vec![batch(&[1, 2]), batch(&[3, 1, 4])]).with_qual(Box::new(AGreaterThanTwo));
        let mut estate = EState::new();

        let out = node.exec(&mut estate).unwrap().unwrap();
        assert_eq!(out.num_rows(), 2);
        assert!(node.exec(&mut estate).unwrap().is_none());
        assert_eq!(node.access_calls(), 3);
    }

    #[test]
    fn test_expr_context_reset_around_every_fetch() {
        let mut node = scan(vec![batch(&[3]), batch(&[4])]).with_qual(Box::new(AGreaterThanTwo));
        let mut estate = EState::new();

        node.exec(&mut estate).unwrap().unwrap();
        assert_eq!(node.expr_context().resets(), 2);
        assert_eq!(node.expr_context().scratch_len(), 1);

        node.exec(&mut estate).unwrap().unwrap();
        assert!(node.exec(&mut estate).unwrap().is_none());
        assert_eq!(node.expr_context().resets(), 6);
        assert_eq!(node.expr_context().scratch_len(), 0);
    }

    #[test]
    fn test_count_only_projection_keeps_row_count() {
        let mut node = scan(vec![batch(&[1, 2, 3])]).with_projection(Projection::count_only());
        let out = node.exec(&mut EState::new()).unwrap().unwrap();
        assert_eq!(out.num_columns(), 0);
        assert_eq!(out.num_rows(), 3);
    }

    #[test]
    fn test_projection_selects_and_renames() {
        let input = batch(&[]).schema();
        let projection = Projection::new(&input, vec![(1, "b_alias".to_string())]).unwrap();
        let mut node = scan(vec![batch(&[7])]).with_projection(projection);
        let out = node.exec(&mut EState::new()).unwrap().unwrap();
        assert_eq!(out.schema().field(0).name(), "b_alias");
        let b = out.column(0).as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(b.value(0), 70);
        assert_eq!(b.len(), 1);

        assert!(Projection::new(&input, vec![(2, "c".to_string())]).is_err());
    }

    struct Truncate;

    impl VecPlan for Truncate {
        fn execute(&mut self, input: RecordBatch, _ctx: &mut ExprContext) -> Result<Option<RecordBatch>> {
            if input.num_rows() > 2 {
                Ok(None)
            } else {
                Ok(Some(input))
            }
        }
    }

    #[test]
    fn test_compiled_plan_returning_none_ends_scan() {
        let mut node = scan(vec![batch(&[1]), batch(&[1, 2, 3]), batch(&[5])]).with_plan(Box::new(Truncate));
        let mut estate = EState::new();
        assert_eq!(node.exec(&mut estate).unwrap().unwrap().num_rows(), 1);
        assert!(node.exec(&mut estate).unwrap().is_none());
        assert_eq!(node.access_calls(), 2);
    }

    #[test]
    fn test_epq_replacement_slot_returned_once() {
        let mut node = scan(vec![batch(&[1, 2])]);
        let mut epq = EpqState::new(1);
        epq.relsubs_slot[0] = Some(batch(&[9]));
        let mut estate = EState::new();
        estate.epq = Some(epq);

        let out = node.exec(&mut estate).unwrap().unwrap();
        assert_eq!(out.num_rows(), 1);
        assert!(node.exec(&mut estate).unwrap().is_none());
        assert_eq!(node.access_calls(), 0);

        node.rescan(&mut estate, &[]).unwrap();
        assert!(node.exec(&mut estate).unwrap().is_some());
    }

    struct Locked(Option<RecordBatch>);

    impl crate::node::RowMarkFetch for Locked {
        fn fetch(&mut self, scanrelid: usize) -> Result<Option<RecordBatch>> {
            assert_eq!(scanrelid, 2);
            Ok(self.0.take())
        }
    }

    #[test]
    fn test_epq_rowmark_fetch() {
        let mut node = VecScanState::new(2, Box::new(Batches(VecDeque::new())));
        let mut epq = EpqState::new(2);
        epq.relsubs_rowmark[1] = Some(Box::new(Locked(Some(batch(&[4])))));
        let mut estate = EState::new();
        estate.epq = Some(epq);

        assert!(node.exec(&mut estate).unwrap().is_some());
        assert!(estate.epq.as_ref().unwrap().relsubs_done[1]);
        assert!(node.exec(&mut estate).unwrap().is_none());
        assert_eq!(node.access_calls(), 0);
    }

    struct RejectAll;

    impl ScanAccess for RejectAll {
        fn next(&mut self) -> Result<Option<RecordBatch>> {
            Ok(Some(batch(&[1])))
        }

        fn recheck(&mut self, _batch: &RecordBatch) -> Result<bool> {
            Ok(false)
        }

        fn rescan(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_epq_failed_recheck_is_empty() {
        let mut node = VecScanState::new(1, Box::new(RejectAll));
        let mut epq = EpqState::new(1);
        epq.relsubs_slot[0] = Some(batch(&[1]));
        let mut estate = EState::new();
        estate.epq = Some(epq);
        assert!(node.exec(&mut estate).unwrap().is_none());
    }

    #[test]
    fn test_epq_without_substitute_uses_access_method() {
        let mut node = scan(vec![batch(&[1])]);
        let mut estate = EState::new();
        estate.epq = Some(EpqState::new(1));
        assert!(node.exec(&mut estate).unwrap().is_some());
        assert_eq!(node.access_calls(), 1);
    }
}
