//! # Physical Operators
//!
//! Payloads of the physical operators the optimizer emits. Physical nodes carry
//! their scalar sub-trees (projection list, filters, condition lists) as
//! positional children on the enclosing `DxlNode`; the payload only holds the
//! operator's own attributes and nested descriptors.
//!
//! Every physical node shares the same leading layout: child 0 is the `ProjList`.
//! Most nodes follow it with a `Filter`. The per-operator layouts are checked by
//! the validation pass.

use crate::colref::{IndexDescr, TableDescr};
use crate::error::{DxlError, Result};
use crate::mdid::MdId;
use crate::node::DxlNode;
use crate::operator::DxlOpId;
use crate::scalar::WindowFrameEdge;
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Join semantics shared by hash, merge and nested-loop joins.
    pub enum JoinType {
        Inner => "Inner",
        Left => "Left",
        Full => "Full",
        Right => "Right",
        /// Semi join.
        In => "In",
        LeftAntiSemiJoin => "LeftAntiSemiJoin",
        LeftAntiSemiJoinNotIn => "LeftAntiSemiJoinNotIn",
    }
}

wire_enum! {
    pub enum IndexScanDirection {
        Forward => "Forward",
        Backward => "Backward",
        NoMovement => "NoMovement",
    }
}

wire_enum! {
    pub enum AggStrategy {
        Plain => "Plain",
        Sorted => "Sorted",
        Hashed => "Hashed",
    }
}

wire_enum! {
    pub enum FrameSpec {
        Row => "Row",
        Range => "Range",
    }
}

wire_enum! {
    pub enum FrameExclusion {
        None => "None",
        Nulls => "Nulls",
        CurrentRow => "CurrentRow",
        Group => "Group",
        Ties => "Ties",
    }
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableScan {
    pub table: TableDescr,
}

/// Scan over the partitions chosen at run time by the partition selectors named
/// in `selector_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DynamicTableScan {
    pub table: TableDescr,
    pub selector_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexScan {
    pub index: IndexDescr,
    pub table: TableDescr,
    pub direction: IndexScanDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitmapTableScan {
    pub table: TableDescr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubqueryScan {
    pub alias: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableValuedFunction {
    pub func_mdid: MdId,
    pub return_type: MdId,
    pub name: String,
}

impl TableValuedFunction {
    pub fn new(func_mdid: MdId, return_type: MdId, name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            func_mdid: func_mdid.require_valid("TableValuedFunction", "FuncId")?,
            return_type: return_type.require_valid("TableValuedFunction", "TypeMdid")?,
            name: name.into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Joins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashJoin {
    pub join_type: JoinType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NestedLoopJoin {
    pub join_type: JoinType,
    pub index_nlj: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeJoin {
    pub join_type: JoinType,
    pub unique_outer: bool,
}

// ---------------------------------------------------------------------------
// Motions
// ---------------------------------------------------------------------------

/// Kind of data movement between segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionKind {
    Gather,
    Broadcast,
    Redistribute { duplicate_sensitive: bool },
    Random,
    RoutedDistribute { segment_id_col: u32 },
}

impl MotionKind {
    pub fn element_name(&self) -> &'static str {
        match self {
            MotionKind::Gather => "GatherMotion",
            MotionKind::Broadcast => "BroadcastMotion",
            MotionKind::Redistribute { .. } => "RedistributeMotion",
            MotionKind::Random => "RandomMotion",
            MotionKind::RoutedDistribute { .. } => "RoutedDistributeMotion",
        }
    }

    pub const ELEMENT_NAMES: &'static [&'static str] = &[
        "GatherMotion",
        "BroadcastMotion",
        "RedistributeMotion",
        "RandomMotion",
        "RoutedDistributeMotion",
    ];
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Motion {
    pub kind: MotionKind,
    pub input_segments: Vec<i32>,
    pub output_segments: Vec<i32>,
}

impl Motion {
    /// Redistribute motions carry a `HashExprList` before their input.
    pub fn has_hash_exprs(&self) -> bool {
        matches!(self.kind, MotionKind::Redistribute { .. })
    }
}

// ---------------------------------------------------------------------------
// Set, limit, aggregation and materialization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Append {
    pub is_target: bool,
    pub is_zapped: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limit;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultOp;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    pub strategy: AggStrategy,
    pub stream_safe: bool,
    pub grouping_cols: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub discard_duplicates: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Materialize {
    pub eager: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionSelector {
    pub relation_mdid: MdId,
    pub selector_id: u32,
    pub scan_id: u32,
    pub partitions: Vec<u32>,
}

impl PartitionSelector {
    pub fn new(relation_mdid: MdId, selector_id: u32, scan_id: u32, partitions: Vec<u32>) -> Result<Self> {
        Ok(Self {
            relation_mdid: relation_mdid.require_valid("PartitionSelector", "RelationMdid")?,
            selector_id,
            scan_id,
            partitions,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assert {
    pub error_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CteProducer {
    pub cte_id: u32,
    pub col_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CteConsumer {
    pub cte_id: u32,
    pub col_ids: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Frame of a window key: exactly one leading and one trailing edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowFrame {
    pub spec: FrameSpec,
    pub exclusion: FrameExclusion,
    pub leading: DxlNode,
    pub trailing: DxlNode,
}

impl WindowFrame {
    pub fn new(
        spec: FrameSpec,
        exclusion: FrameExclusion,
        leading: DxlNode,
        trailing: DxlNode,
    ) -> Result<Self> {
        check_edge(&leading, true)?;
        check_edge(&trailing, false)?;
        Ok(Self {
            spec,
            exclusion,
            leading,
            trailing,
        })
    }
}

fn check_edge(node: &DxlNode, leading: bool) -> Result<()> {
    let expected = if leading { "LeadingEdge" } else { "TrailingEdge" };
    match node.op.cast::<WindowFrameEdge>() {
        Ok(edge) if edge.leading == leading => Ok(()),
        _ => Err(DxlError::ChildKind {
            op: DxlOpId::Window,
            index: if leading { 0 } else { 1 },
            expected,
            found: node.op_id(),
        }),
    }
}

/// Ordering and framing of one window specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowKey {
    /// A `SortColList` node.
    pub sort_cols: Option<DxlNode>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub partition_cols: Vec<u32>,
    pub keys: Vec<WindowKey>,
}
