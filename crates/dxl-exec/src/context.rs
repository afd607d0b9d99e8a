//! # Executor State
//!
//! `EState` is shared by every node of one query slice. It carries:
//!
//! - `InterruptFlags`: the process-wide cancellation flags, shared through an
//!   `Arc` so a signal handler or another thread can raise them while the plan
//!   runs. Scans poll them at the start of every fetch.
//! - `EpqState`: present only while an EvalPlanQual recheck is running. It
//!   holds per-relation substitution bookkeeping indexed by `scanrelid - 1`.
//! - `ScanDirection`: which way Append walks its sub-plans.
//!
//! `ExprContext` is the per-tuple-cycle memory of one scan. Arrays created while
//! evaluating quals and projections are registered in it and released by
//! `reset`.

use crate::node::RowMarkFetch;
use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct InterruptFlags {
    query_finish_pending: AtomicBool,
    interrupt_pending: AtomicBool,
}

impl InterruptFlags {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The query has produced everything its consumer wants; stop quietly.
    pub fn request_finish(&self) {
        self.query_finish_pending.store(true, Ordering::SeqCst);
    }

    /// Cancel the query.
    pub fn request_interrupt(&self) {
        self.interrupt_pending.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.query_finish_pending.store(false, Ordering::SeqCst);
        self.interrupt_pending.store(false, Ordering::SeqCst);
    }

    pub fn finish_pending(&self) -> bool {
        self.query_finish_pending.load(Ordering::SeqCst)
    }

    pub fn interrupt_pending(&self) -> bool {
        self.interrupt_pending.load(Ordering::SeqCst)
    }

    pub fn should_stop(&self) -> bool {
        self.finish_pending() || self.interrupt_pending()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanDirection {
    #[default]
    Forward,
    Backward,
}

/// EvalPlanQual substitution state. While present on the `EState`, a scan with
/// range-table index `scanrelid` consults slot `scanrelid - 1` of each vector
/// before falling back to its access method.
#[derive(Default)]
pub struct EpqState {
    /// The relation's substitute row has already been returned.
    pub relsubs_done: Vec<bool>,
    /// Replacement batch to recheck and return once.
    pub relsubs_slot: Vec<Option<RecordBatch>>,
    /// Row mark used to fetch the replacement when no slot was supplied.
    pub relsubs_rowmark: Vec<Option<Box<dyn RowMarkFetch>>>,
}

impl EpqState {
    /// Bookkeeping for `relations` range-table entries, nothing substituted yet.
    pub fn new(relations: usize) -> Self {
        Self {
            relsubs_done: vec![false; relations],
            relsubs_slot: (0..relations).map(|_| None).collect(),
            relsubs_rowmark: (0..relations).map(|_| None).collect(),
        }
    }

    pub fn relations(&self) -> usize {
        self.relsubs_done.len()
    }
}

impl std::fmt::Debug for EpqState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EpqState")
            .field("relsubs_done", &self.relsubs_done)
            .field(
                "relsubs_slot",
                &self.relsubs_slot.iter().map(Option::is_some).collect::<Vec<_>>(),
            )
            .field(
                "relsubs_rowmark",
                &self
                    .relsubs_rowmark
                    .iter()
                    .map(Option::is_some)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct EState {
    pub interrupts: Arc<InterruptFlags>,
    pub epq: Option<EpqState>,
    pub direction: ScanDirection,
}

impl EState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interrupts(interrupts: Arc<InterruptFlags>) -> Self {
        Self {
            interrupts,
            ..Self::default()
        }
    }
}

/// Per-tuple-cycle scratch memory.
#[derive(Debug, Default)]
pub struct ExprContext {
    scratch: Vec<ArrayRef>,
    resets: u64,
}

impl ExprContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `array` alive until the next reset.
    pub fn register(&mut self, array: ArrayRef) {
        self.scratch.push(array);
    }

    pub fn reset(&mut self) {
        self.scratch.clear();
        self.resets += 1;
    }

    pub fn scratch_len(&self) -> usize {
        self.scratch.len()
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }
}
