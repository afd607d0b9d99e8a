//! # Plan Builder
//!
//! `ExecBuilder` turns a physical DXL tree into executor nodes. It handles
//! `TableScan`, `DynamicTableScan` and `Append`; any other operator is
//! `ExecError::UnsupportedPlan`.
//!
//! Scans are numbered in build order: the first scan built gets range-table
//! index 1. `range_table()` lists the scanned tables in that order, which is
//! what an `EpqState` is sized and indexed by.
//!
//! A scan's `ProjList` becomes its projection. Every `ProjElem` must be a plain
//! column reference; an empty `ProjList` is a `COUNT(*)`-style scan that only
//! produces row counts. A non-empty `Filter` is compiled by the
//! `AccessMethodProvider`.

use crate::append::{AppendConfig, VecAppendState};
use crate::error::{ExecError, Result};
use crate::node::{ScanAccess, VecPlanState, VecQual};
use crate::scan::{Projection, VecScanState};
use crate::schema::table_schema;
use arrow::datatypes::SchemaRef;
use dxl_core::colref::TableDescr;
use dxl_core::scalar::{Ident, ProjElem};
use dxl_core::{DxlNode, DxlOpId, DxlOperator, MdId, PhysicalOp};
use tracing::debug;

/// Opens the storage behind the tables a plan scans.
pub trait AccessMethodProvider {
    /// Access method for `table`. Its batches carry the columns of `schema`.
    fn open(&self, table: &TableDescr, schema: &SchemaRef) -> Result<Box<dyn ScanAccess>>;

    /// Access method over the partitions a dynamic scan selects.
    fn open_dynamic(
        &self,
        table: &TableDescr,
        _selector_ids: &[u32],
        schema: &SchemaRef,
    ) -> Result<Box<dyn ScanAccess>> {
        self.open(table, schema)
    }

    /// Compile a scan's non-empty `Filter` node.
    fn compile_qual(&self, filter: &DxlNode, _schema: &SchemaRef) -> Result<Box<dyn VecQual>> {
        Err(ExecError::UnsupportedPlan(format!(
            "scan filter with {} predicate(s)",
            filter.arity()
        )))
    }
}

pub struct ExecBuilder<'a> {
    provider: &'a dyn AccessMethodProvider,
    config: AppendConfig,
    range_table: Vec<MdId>,
}

impl<'a> ExecBuilder<'a> {
    pub fn new(provider: &'a dyn AccessMethodProvider) -> Self {
        Self {
            provider,
            config: AppendConfig::default(),
            range_table: Vec::new(),
        }
    }

    pub fn with_append_config(mut self, config: AppendConfig) -> Self {
        self.config = config;
        self
    }

    /// Table ids of the scans built so far, by range-table index - 1.
    pub fn range_table(&self) -> &[MdId] {
        &self.range_table
    }

    pub fn build(&mut self, node: &DxlNode) -> Result<Box<dyn VecPlanState>> {
        match &node.op {
            DxlOperator::Physical(PhysicalOp::TableScan(scan)) => self.build_scan(node, &scan.table, None),
            DxlOperator::Physical(PhysicalOp::DynamicTableScan(scan)) => {
                self.build_scan(node, &scan.table, Some(scan.selector_ids.as_slice()))
            }
            DxlOperator::Physical(PhysicalOp::Append(_)) => {
                require_child(node, 0, DxlOpId::ProjList)?;
                let filter = require_child(node, 1, DxlOpId::Filter)?;
                if filter.arity() > 0 {
                    return Err(ExecError::UnsupportedPlan("filter on Append".to_string()));
                }
                let subplans = node.children[2..]
                    .iter()
                    .map(|child| self.build(child))
                    .collect::<Result<Vec<_>>>()?;
                debug!("Built Append over {} sub-plans", subplans.len());
                Ok(Box::new(VecAppendState::new(subplans, self.config)))
            }
            other => Err(ExecError::UnsupportedPlan(other.op_name().to_string())),
        }
    }

    fn build_scan(
        &mut self,
        node: &DxlNode,
        table: &TableDescr,
        selector_ids: Option<&[u32]>,
    ) -> Result<Box<dyn VecPlanState>> {
        let proj_list = require_child(node, 0, DxlOpId::ProjList)?;
        let filter = require_child(node, 1, DxlOpId::Filter)?;
        let schema = table_schema(table)?;
        let projection = projection(proj_list, table, &schema)?;

        let access = match selector_ids {
            Some(ids) => self.provider.open_dynamic(table, ids, &schema)?,
            None => self.provider.open(table, &schema)?,
        };
        self.range_table.push(table.mdid);
        let scanrelid = self.range_table.len();
        debug!("Built scan of {} as range-table entry {}", table.name, scanrelid);

        let mut scan = VecScanState::new(scanrelid, access).with_projection(projection);
        if filter.arity() > 0 {
            scan = scan.with_qual(self.provider.compile_qual(filter, &schema)?);
        }
        Ok(Box::new(scan))
    }
}

fn require_child(node: &DxlNode, index: usize, expected: DxlOpId) -> Result<&DxlNode> {
    match node.child(index) {
        Some(child) if child.op_id() == expected => Ok(child),
        _ => Err(ExecError::UnsupportedPlan(format!(
            "{} without {:?} as child {}",
            node.op.op_name(),
            expected,
            index
        ))),
    }
}

fn projection(proj_list: &DxlNode, table: &TableDescr, schema: &SchemaRef) -> Result<Projection> {
    if proj_list.arity() == 0 {
        return Ok(Projection::count_only());
    }
    let live = table
        .columns
        .iter()
        .filter(|c| !c.is_dropped)
        .map(|c| c.colref.id)
        .collect::<Vec<_>>();

    let mut columns = Vec::with_capacity(proj_list.arity());
    for elem in &proj_list.children {
        let proj_elem = elem.op.cast::<ProjElem>()?;
        let ident = elem
            .child(0)
            .and_then(|expr| expr.op.cast::<Ident>().ok())
            .ok_or_else(|| {
                ExecError::UnsupportedPlan(format!("computed column {}", proj_elem.alias))
            })?;
        let index = live
            .iter()
            .position(|&id| id == ident.colref.id)
            .ok_or_else(|| {
                ExecError::UnsupportedPlan(format!(
                    "column {} is not a live column of {}",
                    ident.colref.name, table.name
                ))
            })?;
        columns.push((index, proj_elem.alias.clone()));
    }
    Projection::new(schema, columns)
}
