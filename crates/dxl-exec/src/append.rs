//! # Vectorized Append
//!
//! `VecAppendState` returns the batches of its sub-plans one sub-plan after the
//! other. `whichplan` is the sub-plan being drained. When it is exhausted the
//! node moves to the next one in the estate's scan direction, and leaving
//! `[0, N)` exhausts the node. With no sub-plans the node starts exhausted.
//!
//! The first batch returned fixes the output schema. Later batches with a
//! different schema are rewritten to it with the configured `RewriteStrategy`;
//! a batch that cannot be rewritten fails the query. The established schema
//! survives rescans.
//!
//! Rescan restarts at sub-plan 0 and forwards the changed parameters to every
//! sub-plan. `end` shuts sub-plans down last-first.

use crate::context::{EState, ScanDirection};
use crate::error::Result;
use crate::node::VecPlanState;
use crate::schema::RewriteStrategy;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendConfig {
    pub rewrite: RewriteStrategy,
}

pub struct VecAppendState {
    subplans: Vec<Box<dyn VecPlanState>>,
    whichplan: Option<usize>,
    config: AppendConfig,
    schema: Option<SchemaRef>,
}

impl VecAppendState {
    pub fn new(subplans: Vec<Box<dyn VecPlanState>>, config: AppendConfig) -> Self {
        let whichplan = Self::first_plan(subplans.len());
        Self {
            subplans,
            whichplan,
            config,
            schema: None,
        }
    }

    fn first_plan(nplans: usize) -> Option<usize> {
        (nplans > 0).then_some(0)
    }

    /// Index of the sub-plan being drained, `None` once exhausted.
    pub fn whichplan(&self) -> Option<usize> {
        self.whichplan
    }

    pub fn num_subplans(&self) -> usize {
        self.subplans.len()
    }

    /// Output schema, once the first batch has been returned.
    pub fn schema(&self) -> Option<&SchemaRef> {
        self.schema.as_ref()
    }

    fn advance(&mut self, direction: ScanDirection) {
        self.whichplan = match (self.whichplan, direction) {
            (Some(current), ScanDirection::Forward) => {
                Some(current + 1).filter(|&next| next < self.subplans.len())
            }
            (Some(current), ScanDirection::Backward) => current.checked_sub(1),
            (None, _) => None,
        };
        match self.whichplan {
            Some(next) => debug!("Append switched to sub-plan {} ({})", next, self.subplans[next].name()),
            None => debug!("Append exhausted after {} sub-plans", self.subplans.len()),
        }
    }

    fn unify(&mut self, batch: RecordBatch) -> Result<RecordBatch> {
        let Some(schema) = self.schema.clone() else {
            debug!("Append output schema established with {} columns", batch.num_columns());
            self.schema = Some(batch.schema());
            return Ok(batch);
        };
        if schema == batch.schema() {
            return Ok(batch);
        }
        trace!(
            "Append rewriting batch from sub-plan {:?} with {:?}",
            self.whichplan,
            self.config.rewrite
        );
        self.config.rewrite.rewrite(&batch, &schema)
    }
}

impl VecPlanState for VecAppendState {
    fn name(&self) -> &'static str {
        "VecAppend"
    }

    fn exec(&mut self, estate: &mut EState) -> Result<Option<RecordBatch>> {
        loop {
            if estate.interrupts.should_stop() {
                return Ok(None);
            }
            let Some(current) = self.whichplan else {
                return Ok(None);
            };
            match self.subplans[current].exec(estate)? {
                Some(batch) => return self.unify(batch).map(Some),
                // A sub-plan stopped by cancellation is not exhausted.
                None if estate.interrupts.should_stop() => return Ok(None),
                None => self.advance(estate.direction),
            }
        }
    }

    fn rescan(&mut self, estate: &mut EState, changed_params: &[usize]) -> Result<()> {
        for subplan in &mut self.subplans {
            subplan.rescan(estate, changed_params)?;
        }
        self.whichplan = Self::first_plan(self.subplans.len());
        Ok(())
    }

    fn end(&mut self, estate: &mut EState) -> Result<()> {
        let mut first_error = None;
        for subplan in self.subplans.iter_mut().rev() {
            if let Err(e) = subplan.end(estate) {
                first_error.get_or_insert(e);
            }
        }
        self.whichplan = None;
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecError;
    use arrow::array::{Array, ArrayRef, Int32Array};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    struct Fixed(Vec<RecordBatch>);

    impl VecPlanState for Fixed {
        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn exec(&mut self, _estate: &mut EState) -> Result<Option<RecordBatch>> {
            Ok(if self.0.is_empty() {
                None
            } else {
                Some(self.0.remove(0))
            })
        }

        fn rescan(&mut self, _estate: &mut EState, _changed_params: &[usize]) -> Result<()> {
            Ok(())
        }

        fn end(&mut self, _estate: &mut EState) -> Result<()> {
            Ok(())
        }
    }

    /// Sees a cancellation arrive on its first call, then yields its batch.
    struct CancelledMidway {
        batch: Option<RecordBatch>,
        calls: usize,
    }

    impl VecPlanState for CancelledMidway {
        fn name(&self) -> &'static str {
            "CancelledMidway"
        }

        fn exec(&mut self, estate: &mut EState) -> Result<Option<RecordBatch>> {
            self.calls += 1;
            if self.calls == 1 {
                estate.interrupts.request_interrupt();
                return Ok(None);
            }
            Ok(self.batch.take())
        }

        fn rescan(&mut self, _estate: &mut EState, _changed_params: &[usize]) -> Result<()> {
            Ok(())
        }

        fn end(&mut self, _estate: &mut EState) -> Result<()> {
            Ok(())
        }
    }

    fn ints(name: &str, values: Vec<i32>) -> RecordBatch {
        let schema = Arc::new(Schema::new(vec![Field::new(name, DataType::Int32, true)]));
        let column: ArrayRef = Arc::new(Int32Array::from(values));
        RecordBatch::try_new(schema, vec![column]).unwrap()
    }

    #[test]
    fn test_no_subplans_is_exhausted() {
        let mut node = VecAppendState::new(Vec::new(), AppendConfig::default());
        assert_eq!(node.whichplan(), None);
        assert!(node.exec(&mut EState::new()).unwrap().is_none());
    }

    #[test]
    fn test_cancellation_inside_subplan_keeps_position() {
        let mut node = VecAppendState::new(
            vec![
                Box::new(CancelledMidway {
                    batch: Some(ints("a", vec![1])),
                    calls: 0,
                }),
                Box::new(Fixed(vec![ints("a", vec![2])])),
            ],
            AppendConfig::default(),
        );
        let mut estate = EState::new();
        assert!(node.exec(&mut estate).unwrap().is_none());
        assert_eq!(node.whichplan(), Some(0));

        estate.interrupts.clear();
        let batch = node.exec(&mut estate).unwrap().unwrap();
        let values = batch.column(0).as_any().downcast_ref::<Int32Array>().unwrap();
        assert_eq!(values.value(0), 1);
    }

    #[test]
    fn test_backward_direction_walks_down() {
        let mut node = VecAppendState::new(
            vec![
                Box::new(Fixed(vec![ints("a", vec![1])])),
                Box::new(Fixed(vec![ints("a", vec![2])])),
            ],
            AppendConfig::default(),
        );
        let mut estate = EState::new();
        estate.direction = ScanDirection::Backward;
        assert!(node.exec(&mut estate).unwrap().is_some());
        assert!(node.exec(&mut estate).unwrap().is_none());
        assert_eq!(node.whichplan(), None);
    }

    #[test]
    fn test_incompatible_batch_is_error() {
        let mut node = VecAppendState::new(
            vec![
                Box::new(Fixed(vec![ints("a", vec![1])])),
                Box::new(Fixed(vec![ints("b", vec![2])])),
            ],
            AppendConfig::default(),
        );
        let mut estate = EState::new();
        node.exec(&mut estate).unwrap().unwrap();
        assert!(matches!(
            node.exec(&mut estate),
            Err(ExecError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_by_position_accepts_renamed_column() {
        let mut node = VecAppendState::new(
            vec![
                Box::new(Fixed(vec![ints("a", vec![1])])),
                Box::new(Fixed(vec![ints("b", vec![2])])),
            ],
            AppendConfig {
                rewrite: RewriteStrategy::ByPosition,
            },
        );
        let mut estate = EState::new();
        node.exec(&mut estate).unwrap().unwrap();
        let second = node.exec(&mut estate).unwrap().unwrap();
        assert_eq!(second.schema().field(0).name(), "a");
    }
}
