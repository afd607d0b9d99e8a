//! # DXL Operators
//!
//! The operator tree is a closed sum type. `DxlOperator` wraps either a scalar
//! operator (`ScalarOp`) or a physical operator (`PhysicalOp`); each variant holds
//! one payload struct from `scalar` or `physical`.
//!
//! ## Operator Ids
//!
//! `DxlOpId` is the stable, data-free discriminant of an operator. It is what
//! errors report, what typed downcasts check, and what the validation pass
//! matches on. Families that share a payload but are distinct operators on the
//! wire (the filter kinds, the condition lists, the two coercions) map to
//! distinct ids; families that are one operator with a kind attribute (`BoolExpr`,
//! `MinMax`, window edges, motions) keep a single id.
//!
//! ## Boolean Results
//!
//! `has_bool_result` answers "does this scalar operator yield a boolean". For
//! predicates the answer is fixed. Operators that wrap a type, function,
//! aggregate or scalar operator resolve it through the metadata accessor, which
//! may miss and is not free. Container operators have no scalar result at all and
//! return `DxlError::ContainerOperator`.

use crate::error::{DxlError, Result};
use crate::md_accessor::MdAccessor;
use crate::physical::*;
use crate::scalar::*;
use serde::{Deserialize, Serialize};

/// Stable discriminant of every DXL operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DxlOpId {
    // Scalar
    Ident,
    ConstValue,
    Comparison,
    DistinctComparison,
    OpExpr,
    ArrayComp,
    BoolExpr,
    BooleanTest,
    NullTest,
    NullIf,
    Cast,
    CoerceToDomain,
    CoerceViaIO,
    ArrayCoerceExpr,
    FuncExpr,
    Aggref,
    WindowRef,
    IfStmt,
    Switch,
    SwitchCase,
    CaseTest,
    Coalesce,
    MinMax,
    Array,
    ArrayRef,
    ArrayRefIndexList,
    SubPlan,
    ProjList,
    ProjElem,
    Filter,
    OneTimeFilter,
    JoinFilter,
    RecheckCond,
    HashCondList,
    MergeCondList,
    IndexCondList,
    HashExprList,
    HashExpr,
    SortColList,
    SortCol,
    LimitCount,
    LimitOffset,
    WindowFrameEdge,
    PartBound,
    PartBoundInclusion,
    PartBoundOpen,
    PartDefault,
    PartOid,
    PartListValues,
    PartListNullTest,
    BitmapBoolOp,
    BitmapIndexProbe,
    AssertConstraintList,
    AssertConstraint,
    DmlAction,
    ValuesList,
    // Physical
    TableScan,
    DynamicTableScan,
    IndexScan,
    BitmapTableScan,
    Result,
    HashJoin,
    NestedLoopJoin,
    MergeJoin,
    Motion,
    Append,
    Limit,
    Aggregate,
    Sort,
    Materialize,
    PartitionSelector,
    Window,
    SubqueryScan,
    Sequence,
    Assert,
    CteProducer,
    CteConsumer,
    TableValuedFunction,
}

impl DxlOpId {
    pub const ALL: &'static [DxlOpId] = &[
        DxlOpId::Ident,
        DxlOpId::ConstValue,
        DxlOpId::Comparison,
        DxlOpId::DistinctComparison,
        DxlOpId::OpExpr,
        DxlOpId::ArrayComp,
        DxlOpId::BoolExpr,
        DxlOpId::BooleanTest,
        DxlOpId::NullTest,
        DxlOpId::NullIf,
        DxlOpId::Cast,
        DxlOpId::CoerceToDomain,
        DxlOpId::CoerceViaIO,
        DxlOpId::ArrayCoerceExpr,
        DxlOpId::FuncExpr,
        DxlOpId::Aggref,
        DxlOpId::WindowRef,
        DxlOpId::IfStmt,
        DxlOpId::Switch,
        DxlOpId::SwitchCase,
        DxlOpId::CaseTest,
        DxlOpId::Coalesce,
        DxlOpId::MinMax,
        DxlOpId::Array,
        DxlOpId::ArrayRef,
        DxlOpId::ArrayRefIndexList,
        DxlOpId::SubPlan,
        DxlOpId::ProjList,
        DxlOpId::ProjElem,
        DxlOpId::Filter,
        DxlOpId::OneTimeFilter,
        DxlOpId::JoinFilter,
        DxlOpId::RecheckCond,
        DxlOpId::HashCondList,
        DxlOpId::MergeCondList,
        DxlOpId::IndexCondList,
        DxlOpId::HashExprList,
        DxlOpId::HashExpr,
        DxlOpId::SortColList,
        DxlOpId::SortCol,
        DxlOpId::LimitCount,
        DxlOpId::LimitOffset,
        DxlOpId::WindowFrameEdge,
        DxlOpId::PartBound,
        DxlOpId::PartBoundInclusion,
        DxlOpId::PartBoundOpen,
        DxlOpId::PartDefault,
        DxlOpId::PartOid,
        DxlOpId::PartListValues,
        DxlOpId::PartListNullTest,
        DxlOpId::BitmapBoolOp,
        DxlOpId::BitmapIndexProbe,
        DxlOpId::AssertConstraintList,
        DxlOpId::AssertConstraint,
        DxlOpId::DmlAction,
        DxlOpId::ValuesList,
        DxlOpId::TableScan,
        DxlOpId::DynamicTableScan,
        DxlOpId::IndexScan,
        DxlOpId::BitmapTableScan,
        DxlOpId::Result,
        DxlOpId::HashJoin,
        DxlOpId::NestedLoopJoin,
        DxlOpId::MergeJoin,
        DxlOpId::Motion,
        DxlOpId::Append,
        DxlOpId::Limit,
        DxlOpId::Aggregate,
        DxlOpId::Sort,
        DxlOpId::Materialize,
        DxlOpId::PartitionSelector,
        DxlOpId::Window,
        DxlOpId::SubqueryScan,
        DxlOpId::Sequence,
        DxlOpId::Assert,
        DxlOpId::CteProducer,
        DxlOpId::CteConsumer,
        DxlOpId::TableValuedFunction,
    ];

    pub fn is_scalar(self) -> bool {
        self < DxlOpId::TableScan
    }

    pub fn is_physical(self) -> bool {
        !self.is_scalar()
    }

    /// Container operators group other scalars and have no scalar result.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            DxlOpId::SwitchCase
                | DxlOpId::ArrayRefIndexList
                | DxlOpId::ProjList
                | DxlOpId::ProjElem
                | DxlOpId::Filter
                | DxlOpId::OneTimeFilter
                | DxlOpId::JoinFilter
                | DxlOpId::RecheckCond
                | DxlOpId::HashCondList
                | DxlOpId::MergeCondList
                | DxlOpId::IndexCondList
                | DxlOpId::HashExprList
                | DxlOpId::HashExpr
                | DxlOpId::SortColList
                | DxlOpId::SortCol
                | DxlOpId::LimitCount
                | DxlOpId::LimitOffset
                | DxlOpId::WindowFrameEdge
                | DxlOpId::AssertConstraintList
                | DxlOpId::AssertConstraint
                | DxlOpId::ValuesList
        )
    }

    /// Every XML element name this operator can appear under.
    pub fn element_names(self) -> &'static [&'static str] {
        match self {
            DxlOpId::Ident => &["Ident"],
            DxlOpId::ConstValue => &["ConstValue"],
            DxlOpId::Comparison => &["Comparison"],
            DxlOpId::DistinctComparison => &["IsDistinctFrom"],
            DxlOpId::OpExpr => &["OpExpr"],
            DxlOpId::ArrayComp => &["ArrayComp"],
            DxlOpId::BoolExpr => &["And", "Or", "Not"],
            DxlOpId::BooleanTest => &[
                "IsTrue",
                "IsNotTrue",
                "IsFalse",
                "IsNotFalse",
                "IsUnknown",
                "IsNotUnknown",
            ],
            DxlOpId::NullTest => &["IsNull", "IsNotNull"],
            DxlOpId::NullIf => &["NullIf"],
            DxlOpId::Cast => &["Cast"],
            DxlOpId::CoerceToDomain => &["CoerceToDomain"],
            DxlOpId::CoerceViaIO => &["CoerceViaIO"],
            DxlOpId::ArrayCoerceExpr => &["ArrayCoerceExpr"],
            DxlOpId::FuncExpr => &["FuncExpr"],
            DxlOpId::Aggref => &["AggFunc"],
            DxlOpId::WindowRef => &["WindowFunc"],
            DxlOpId::IfStmt => &["If"],
            DxlOpId::Switch => &["Switch"],
            DxlOpId::SwitchCase => &["SwitchCase"],
            DxlOpId::CaseTest => &["CaseTest"],
            DxlOpId::Coalesce => &["Coalesce"],
            DxlOpId::MinMax => &["Min", "Max"],
            DxlOpId::Array => &["Array"],
            DxlOpId::ArrayRef => &["ArrayRef"],
            DxlOpId::ArrayRefIndexList => &["ArrayIndexList"],
            DxlOpId::SubPlan => &["SubPlan"],
            DxlOpId::ProjList => &["ProjList"],
            DxlOpId::ProjElem => &["ProjElem"],
            DxlOpId::Filter => &["Filter"],
            DxlOpId::OneTimeFilter => &["OneTimeFilter"],
            DxlOpId::JoinFilter => &["JoinFilter"],
            DxlOpId::RecheckCond => &["RecheckCond"],
            DxlOpId::HashCondList => &["HashCondList"],
            DxlOpId::MergeCondList => &["MergeCondList"],
            DxlOpId::IndexCondList => &["IndexCondList"],
            DxlOpId::HashExprList => &["HashExprList"],
            DxlOpId::HashExpr => &["HashExpr"],
            DxlOpId::SortColList => &["SortingColumnList"],
            DxlOpId::SortCol => &["SortingColumn"],
            DxlOpId::LimitCount => &["LimitCount"],
            DxlOpId::LimitOffset => &["LimitOffset"],
            DxlOpId::WindowFrameEdge => &["LeadingEdge", "TrailingEdge"],
            DxlOpId::PartBound => &["PartBound"],
            DxlOpId::PartBoundInclusion => &["PartBoundInclusion"],
            DxlOpId::PartBoundOpen => &["PartBoundOpen"],
            DxlOpId::PartDefault => &["DefaultPart"],
            DxlOpId::PartOid => &["PartOid"],
            DxlOpId::PartListValues => &["PartListValues"],
            DxlOpId::PartListNullTest => &["PartListNullTest"],
            DxlOpId::BitmapBoolOp => &["BitmapAnd", "BitmapOr"],
            DxlOpId::BitmapIndexProbe => &["BitmapIndexProbe"],
            DxlOpId::AssertConstraintList => &["AssertConstraintList"],
            DxlOpId::AssertConstraint => &["AssertConstraint"],
            DxlOpId::DmlAction => &["DMLAction"],
            DxlOpId::ValuesList => &["ValuesList"],
            DxlOpId::TableScan => &["TableScan"],
            DxlOpId::DynamicTableScan => &["DynamicTableScan"],
            DxlOpId::IndexScan => &["IndexScan"],
            DxlOpId::BitmapTableScan => &["BitmapTableScan"],
            DxlOpId::Result => &["Result"],
            DxlOpId::HashJoin => &["HashJoin"],
            DxlOpId::NestedLoopJoin => &["NestedLoopJoin"],
            DxlOpId::MergeJoin => &["MergeJoin"],
            DxlOpId::Motion => MotionKind::ELEMENT_NAMES,
            DxlOpId::Append => &["Append"],
            DxlOpId::Limit => &["Limit"],
            DxlOpId::Aggregate => &["Aggregate"],
            DxlOpId::Sort => &["Sort"],
            DxlOpId::Materialize => &["Materialize"],
            DxlOpId::PartitionSelector => &["PartitionSelector"],
            DxlOpId::Window => &["Window"],
            DxlOpId::SubqueryScan => &["SubqueryScan"],
            DxlOpId::Sequence => &["Sequence"],
            DxlOpId::Assert => &["Assert"],
            DxlOpId::CteProducer => &["CTEProducer"],
            DxlOpId::CteConsumer => &["CTEConsumer"],
            DxlOpId::TableValuedFunction => &["TableValuedFunction"],
        }
    }
}

/// Scalar operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarOp {
    Ident(Ident),
    ConstValue(ConstValue),
    Comparison(Comparison),
    DistinctComparison(DistinctComparison),
    OpExpr(OpExpr),
    ArrayComp(ArrayComp),
    BoolExpr(BoolExpr),
    BooleanTest(BooleanTest),
    NullTest(NullTest),
    NullIf(NullIf),
    Cast(Cast),
    Coerce(Coerce),
    ArrayCoerceExpr(ArrayCoerceExpr),
    FuncExpr(FuncExpr),
    Aggref(Aggref),
    WindowRef(WindowRef),
    IfStmt(IfStmt),
    Switch(Switch),
    SwitchCase(SwitchCase),
    CaseTest(CaseTest),
    Coalesce(Coalesce),
    MinMax(MinMax),
    Array(Array),
    ArrayRef(ArrayRef),
    ArrayRefIndexList(ArrayRefIndexList),
    SubPlan(SubPlan),
    ProjList(ProjList),
    ProjElem(ProjElem),
    Filter(Filter),
    CondList(CondList),
    HashExprList(HashExprList),
    HashExpr(HashExpr),
    SortColList(SortColList),
    SortCol(SortCol),
    LimitCount(LimitCount),
    LimitOffset(LimitOffset),
    WindowFrameEdge(WindowFrameEdge),
    PartBound(PartBound),
    PartBoundInclusion(PartBoundInclusion),
    PartBoundOpen(PartBoundOpen),
    PartDefault(PartDefault),
    PartOid(PartOid),
    PartListValues(PartListValues),
    PartListNullTest(PartListNullTest),
    BitmapBoolOp(BitmapBoolOp),
    BitmapIndexProbe(BitmapIndexProbe),
    AssertConstraintList(AssertConstraintList),
    AssertConstraint(AssertConstraint),
    DmlAction(DmlAction),
    ValuesList(ValuesList),
}

impl ScalarOp {
    pub fn op_id(&self) -> DxlOpId {
        match self {
            ScalarOp::Ident(_) => DxlOpId::Ident,
            ScalarOp::ConstValue(_) => DxlOpId::ConstValue,
            ScalarOp::Comparison(_) => DxlOpId::Comparison,
            ScalarOp::DistinctComparison(_) => DxlOpId::DistinctComparison,
            ScalarOp::OpExpr(_) => DxlOpId::OpExpr,
            ScalarOp::ArrayComp(_) => DxlOpId::ArrayComp,
            ScalarOp::BoolExpr(_) => DxlOpId::BoolExpr,
            ScalarOp::BooleanTest(_) => DxlOpId::BooleanTest,
            ScalarOp::NullTest(_) => DxlOpId::NullTest,
            ScalarOp::NullIf(_) => DxlOpId::NullIf,
            ScalarOp::Cast(_) => DxlOpId::Cast,
            ScalarOp::Coerce(c) => match c.kind {
                CoerceKind::ToDomain => DxlOpId::CoerceToDomain,
                CoerceKind::ViaIO => DxlOpId::CoerceViaIO,
            },
            ScalarOp::ArrayCoerceExpr(_) => DxlOpId::ArrayCoerceExpr,
            ScalarOp::FuncExpr(_) => DxlOpId::FuncExpr,
            ScalarOp::Aggref(_) => DxlOpId::Aggref,
            ScalarOp::WindowRef(_) => DxlOpId::WindowRef,
            ScalarOp::IfStmt(_) => DxlOpId::IfStmt,
            ScalarOp::Switch(_) => DxlOpId::Switch,
            ScalarOp::SwitchCase(_) => DxlOpId::SwitchCase,
            ScalarOp::CaseTest(_) => DxlOpId::CaseTest,
            ScalarOp::Coalesce(_) => DxlOpId::Coalesce,
            ScalarOp::MinMax(_) => DxlOpId::MinMax,
            ScalarOp::Array(_) => DxlOpId::Array,
            ScalarOp::ArrayRef(_) => DxlOpId::ArrayRef,
            ScalarOp::ArrayRefIndexList(_) => DxlOpId::ArrayRefIndexList,
            ScalarOp::SubPlan(_) => DxlOpId::SubPlan,
            ScalarOp::ProjList(_) => DxlOpId::ProjList,
            ScalarOp::ProjElem(_) => DxlOpId::ProjElem,
            ScalarOp::Filter(f) => match f.kind {
                FilterKind::Filter => DxlOpId::Filter,
                FilterKind::OneTimeFilter => DxlOpId::OneTimeFilter,
                FilterKind::JoinFilter => DxlOpId::JoinFilter,
                FilterKind::RecheckCond => DxlOpId::RecheckCond,
            },
            ScalarOp::CondList(c) => match c.kind {
                CondListKind::Hash => DxlOpId::HashCondList,
                CondListKind::Merge => DxlOpId::MergeCondList,
                CondListKind::Index => DxlOpId::IndexCondList,
            },
            ScalarOp::HashExprList(_) => DxlOpId::HashExprList,
            ScalarOp::HashExpr(_) => DxlOpId::HashExpr,
            ScalarOp::SortColList(_) => DxlOpId::SortColList,
            ScalarOp::SortCol(_) => DxlOpId::SortCol,
            ScalarOp::LimitCount(_) => DxlOpId::LimitCount,
            ScalarOp::LimitOffset(_) => DxlOpId::LimitOffset,
            ScalarOp::WindowFrameEdge(_) => DxlOpId::WindowFrameEdge,
            ScalarOp::PartBound(_) => DxlOpId::PartBound,
            ScalarOp::PartBoundInclusion(_) => DxlOpId::PartBoundInclusion,
            ScalarOp::PartBoundOpen(_) => DxlOpId::PartBoundOpen,
            ScalarOp::PartDefault(_) => DxlOpId::PartDefault,
            ScalarOp::PartOid(_) => DxlOpId::PartOid,
            ScalarOp::PartListValues(_) => DxlOpId::PartListValues,
            ScalarOp::PartListNullTest(_) => DxlOpId::PartListNullTest,
            ScalarOp::BitmapBoolOp(_) => DxlOpId::BitmapBoolOp,
            ScalarOp::BitmapIndexProbe(_) => DxlOpId::BitmapIndexProbe,
            ScalarOp::AssertConstraintList(_) => DxlOpId::AssertConstraintList,
            ScalarOp::AssertConstraint(_) => DxlOpId::AssertConstraint,
            ScalarOp::DmlAction(_) => DxlOpId::DmlAction,
            ScalarOp::ValuesList(_) => DxlOpId::ValuesList,
        }
    }

    /// XML element name. For families it follows the payload's kind.
    pub fn op_name(&self) -> &'static str {
        match self {
            ScalarOp::BoolExpr(b) => b.bool_type.name(),
            ScalarOp::BooleanTest(t) => t.test.name(),
            ScalarOp::NullTest(n) => {
                if n.is_null {
                    "IsNull"
                } else {
                    "IsNotNull"
                }
            }
            ScalarOp::Coerce(c) => c.kind.name(),
            ScalarOp::MinMax(m) => m.kind.name(),
            ScalarOp::Filter(f) => f.kind.name(),
            ScalarOp::CondList(c) => c.kind.name(),
            ScalarOp::WindowFrameEdge(e) => e.element_name(),
            ScalarOp::BitmapBoolOp(b) => b.op.name(),
            other => other.op_id().element_names()[0],
        }
    }

    pub fn has_bool_result(&self, md: &dyn MdAccessor) -> Result<bool> {
        match self {
            ScalarOp::Ident(i) => md.is_bool_type(&i.colref.type_mdid),
            ScalarOp::ConstValue(c) => md.is_bool_type(&c.datum.type_mdid),
            ScalarOp::Comparison(_)
            | ScalarOp::DistinctComparison(_)
            | ScalarOp::ArrayComp(_)
            | ScalarOp::BoolExpr(_)
            | ScalarOp::BooleanTest(_)
            | ScalarOp::NullTest(_)
            | ScalarOp::PartBoundInclusion(_)
            | ScalarOp::PartBoundOpen(_)
            | ScalarOp::PartDefault(_)
            | ScalarOp::PartListNullTest(_) => Ok(true),
            ScalarOp::Array(_)
            | ScalarOp::PartBound(_)
            | ScalarOp::PartOid(_)
            | ScalarOp::PartListValues(_)
            | ScalarOp::BitmapBoolOp(_)
            | ScalarOp::BitmapIndexProbe(_)
            | ScalarOp::DmlAction(_) => Ok(false),
            ScalarOp::OpExpr(o) => {
                let op = md.lookup_scalar_op(&o.op_mdid)?;
                md.is_bool_type(&op.result_type)
            }
            ScalarOp::FuncExpr(f) => {
                let func = md.lookup_function(&f.func_mdid)?;
                md.is_bool_type(&func.result_type)
            }
            ScalarOp::WindowRef(w) => {
                let func = md.lookup_function(&w.func_mdid)?;
                md.is_bool_type(&func.result_type)
            }
            ScalarOp::Aggref(a) => {
                let agg = md.lookup_aggregate(&a.agg_mdid)?;
                md.is_bool_type(&agg.result_type)
            }
            ScalarOp::NullIf(n) => md.is_bool_type(&n.type_mdid),
            ScalarOp::Cast(c) => md.is_bool_type(&c.type_mdid),
            ScalarOp::Coerce(c) => md.is_bool_type(&c.type_mdid),
            ScalarOp::ArrayCoerceExpr(a) => md.is_bool_type(&a.type_mdid),
            ScalarOp::IfStmt(i) => md.is_bool_type(&i.type_mdid),
            ScalarOp::Switch(s) => md.is_bool_type(&s.type_mdid),
            ScalarOp::CaseTest(c) => md.is_bool_type(&c.type_mdid),
            ScalarOp::Coalesce(c) => md.is_bool_type(&c.type_mdid),
            ScalarOp::MinMax(m) => md.is_bool_type(&m.type_mdid),
            ScalarOp::ArrayRef(a) => md.is_bool_type(&a.return_type),
            ScalarOp::SubPlan(s) => match s.subplan_type {
                SubPlanType::Scalar => md.is_bool_type(&s.type_mdid),
                _ => Ok(true),
            },
            container => Err(DxlError::ContainerOperator(container.op_id())),
        }
    }
}

/// Physical operators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhysicalOp {
    TableScan(TableScan),
    DynamicTableScan(DynamicTableScan),
    IndexScan(IndexScan),
    BitmapTableScan(BitmapTableScan),
    Result(ResultOp),
    HashJoin(HashJoin),
    NestedLoopJoin(NestedLoopJoin),
    MergeJoin(MergeJoin),
    Motion(Motion),
    Append(Append),
    Limit(Limit),
    Aggregate(Aggregate),
    Sort(Sort),
    Materialize(Materialize),
    PartitionSelector(PartitionSelector),
    Window(Window),
    SubqueryScan(SubqueryScan),
    Sequence(Sequence),
    Assert(Assert),
    CteProducer(CteProducer),
    CteConsumer(CteConsumer),
    TableValuedFunction(TableValuedFunction),
}

impl PhysicalOp {
    pub fn op_id(&self) -> DxlOpId {
        match self {
            PhysicalOp::TableScan(_) => DxlOpId::TableScan,
            PhysicalOp::DynamicTableScan(_) => DxlOpId::DynamicTableScan,
            PhysicalOp::IndexScan(_) => DxlOpId::IndexScan,
            PhysicalOp::BitmapTableScan(_) => DxlOpId::BitmapTableScan,
            PhysicalOp::Result(_) => DxlOpId::Result,
            PhysicalOp::HashJoin(_) => DxlOpId::HashJoin,
            PhysicalOp::NestedLoopJoin(_) => DxlOpId::NestedLoopJoin,
            PhysicalOp::MergeJoin(_) => DxlOpId::MergeJoin,
            PhysicalOp::Motion(_) => DxlOpId::Motion,
            PhysicalOp::Append(_) => DxlOpId::Append,
            PhysicalOp::Limit(_) => DxlOpId::Limit,
            PhysicalOp::Aggregate(_) => DxlOpId::Aggregate,
            PhysicalOp::Sort(_) => DxlOpId::Sort,
            PhysicalOp::Materialize(_) => DxlOpId::Materialize,
            PhysicalOp::PartitionSelector(_) => DxlOpId::PartitionSelector,
            PhysicalOp::Window(_) => DxlOpId::Window,
            PhysicalOp::SubqueryScan(_) => DxlOpId::SubqueryScan,
            PhysicalOp::Sequence(_) => DxlOpId::Sequence,
            PhysicalOp::Assert(_) => DxlOpId::Assert,
            PhysicalOp::CteProducer(_) => DxlOpId::CteProducer,
            PhysicalOp::CteConsumer(_) => DxlOpId::CteConsumer,
            PhysicalOp::TableValuedFunction(_) => DxlOpId::TableValuedFunction,
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            PhysicalOp::Motion(m) => m.kind.element_name(),
            other => other.op_id().element_names()[0],
        }
    }
}

/// Operator payload of a `DxlNode`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DxlOperator {
    Scalar(ScalarOp),
    Physical(PhysicalOp),
}

impl DxlOperator {
    pub fn is_scalar(&self) -> bool {
        matches!(self, DxlOperator::Scalar(_))
    }

    pub fn is_physical(&self) -> bool {
        matches!(self, DxlOperator::Physical(_))
    }

    pub fn op_id(&self) -> DxlOpId {
        match self {
            DxlOperator::Scalar(s) => s.op_id(),
            DxlOperator::Physical(p) => p.op_id(),
        }
    }

    pub fn op_name(&self) -> &'static str {
        match self {
            DxlOperator::Scalar(s) => s.op_name(),
            DxlOperator::Physical(p) => p.op_name(),
        }
    }

    /// Whether the operator yields a boolean. Physical operators have no scalar
    /// result.
    pub fn has_bool_result(&self, md: &dyn MdAccessor) -> Result<bool> {
        match self {
            DxlOperator::Scalar(s) => s.has_bool_result(md),
            DxlOperator::Physical(p) => Err(DxlError::OperatorKindMismatch {
                expected: "scalar operator",
                found: p.op_id(),
            }),
        }
    }

    /// Typed downcast to a payload.
    pub fn cast<T: OperatorCast>(&self) -> Result<&T> {
        T::cast(self)
    }
}

/// Safe downcast from a `DxlOperator` to one payload type.
pub trait OperatorCast: Sized {
    fn cast(op: &DxlOperator) -> Result<&Self>;
}

macro_rules! impl_cast {
    ($class:ident, $enum:ident: $($variant:ident => $ty:ty),+ $(,)?) => {
        $(
            impl OperatorCast for $ty {
                fn cast(op: &DxlOperator) -> Result<&Self> {
                    match op {
                        DxlOperator::$class($enum::$variant(inner)) => Ok(inner),
                        other => Err(DxlError::OperatorKindMismatch {
                            expected: stringify!($variant),
                            found: other.op_id(),
                        }),
                    }
                }
            }
        )+
    };
}

impl_cast!(Scalar, ScalarOp:
    Ident => Ident,
    ConstValue => ConstValue,
    Comparison => Comparison,
    DistinctComparison => DistinctComparison,
    OpExpr => OpExpr,
    ArrayComp => ArrayComp,
    BoolExpr => BoolExpr,
    BooleanTest => BooleanTest,
    NullTest => NullTest,
    NullIf => NullIf,
    Cast => Cast,
    Coerce => Coerce,
    ArrayCoerceExpr => ArrayCoerceExpr,
    FuncExpr => FuncExpr,
    Aggref => Aggref,
    WindowRef => WindowRef,
    IfStmt => IfStmt,
    Switch => Switch,
    SwitchCase => SwitchCase,
    CaseTest => CaseTest,
    Coalesce => Coalesce,
    MinMax => MinMax,
    Array => Array,
    ArrayRef => ArrayRef,
    ArrayRefIndexList => ArrayRefIndexList,
    SubPlan => SubPlan,
    ProjList => ProjList,
    ProjElem => ProjElem,
    Filter => Filter,
    CondList => CondList,
    HashExprList => HashExprList,
    HashExpr => HashExpr,
    SortColList => SortColList,
    SortCol => SortCol,
    LimitCount => LimitCount,
    LimitOffset => LimitOffset,
    WindowFrameEdge => WindowFrameEdge,
    PartBound => PartBound,
    PartBoundInclusion => PartBoundInclusion,
    PartBoundOpen => PartBoundOpen,
    PartDefault => PartDefault,
    PartOid => PartOid,
    PartListValues => PartListValues,
    PartListNullTest => PartListNullTest,
    BitmapBoolOp => BitmapBoolOp,
    BitmapIndexProbe => BitmapIndexProbe,
    AssertConstraintList => AssertConstraintList,
    AssertConstraint => AssertConstraint,
    DmlAction => DmlAction,
    ValuesList => ValuesList,
);

impl_cast!(Physical, PhysicalOp:
    TableScan => TableScan,
    DynamicTableScan => DynamicTableScan,
    IndexScan => IndexScan,
    BitmapTableScan => BitmapTableScan,
    Result => ResultOp,
    HashJoin => HashJoin,
    NestedLoopJoin => NestedLoopJoin,
    MergeJoin => MergeJoin,
    Motion => Motion,
    Append => Append,
    Limit => Limit,
    Aggregate => Aggregate,
    Sort => Sort,
    Materialize => Materialize,
    PartitionSelector => PartitionSelector,
    Window => Window,
    SubqueryScan => SubqueryScan,
    Sequence => Sequence,
    Assert => Assert,
    CteProducer => CteProducer,
    CteConsumer => CteConsumer,
    TableValuedFunction => TableValuedFunction,
);

impl From<ScalarOp> for DxlOperator {
    fn from(op: ScalarOp) -> Self {
        DxlOperator::Scalar(op)
    }
}

impl From<PhysicalOp> for DxlOperator {
    fn from(op: PhysicalOp) -> Self {
        DxlOperator::Physical(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colref::ColRef;
    use crate::datum::Datum;
    use crate::md_accessor::{
        AggregateDescriptor, FunctionDescriptor, InMemoryMdAccessor, ScalarOpDescriptor,
    };
    use crate::mdid::MdId;

    fn md() -> InMemoryMdAccessor {
        let mut md = InMemoryMdAccessor::with_builtin_types();
        md.add_function(FunctionDescriptor {
            mdid: MdId::gpdb(1000),
            name: "is_even".into(),
            result_type: MdId::gpdb(16),
            returns_set: false,
        });
        md.add_function(FunctionDescriptor {
            mdid: MdId::gpdb(1001),
            name: "abs".into(),
            result_type: MdId::gpdb(23),
            returns_set: false,
        });
        md.add_aggregate(AggregateDescriptor {
            mdid: MdId::gpdb(2000),
            name: "bool_and".into(),
            result_type: MdId::gpdb(16),
        });
        md.add_scalar_op(ScalarOpDescriptor {
            mdid: MdId::gpdb(96),
            name: "=".into(),
            left_type: Some(MdId::gpdb(23)),
            right_type: Some(MdId::gpdb(23)),
            result_type: MdId::gpdb(16),
        });
        md
    }

    fn containers() -> Vec<ScalarOp> {
        vec![
            ScalarOp::ProjList(ProjList),
            ScalarOp::ProjElem(ProjElem::new(1, "a")),
            ScalarOp::SortColList(SortColList),
            ScalarOp::HashExprList(HashExprList),
            ScalarOp::CondList(CondList::new(CondListKind::Hash)),
            ScalarOp::CondList(CondList::new(CondListKind::Merge)),
            ScalarOp::CondList(CondList::new(CondListKind::Index)),
            ScalarOp::Filter(Filter::new(FilterKind::JoinFilter)),
            ScalarOp::WindowFrameEdge(WindowFrameEdge::new(true, FrameBoundary::CurrentRow)),
            ScalarOp::ValuesList(ValuesList),
        ]
    }

    #[test]
    fn test_containers_never_answer_bool_result() {
        let md = md();
        for op in containers() {
            assert!(op.op_id().is_container());
            assert_eq!(
                op.has_bool_result(&md),
                Err(DxlError::ContainerOperator(op.op_id()))
            );
        }
    }

    #[test]
    fn test_bool_result_delegates_to_accessor() {
        let md = md();
        let even = FuncExpr::new(MdId::gpdb(1000), MdId::gpdb(16), -1, false).unwrap();
        let abs = FuncExpr::new(MdId::gpdb(1001), MdId::gpdb(23), -1, false).unwrap();
        assert!(ScalarOp::FuncExpr(even).has_bool_result(&md).unwrap());
        assert!(!ScalarOp::FuncExpr(abs).has_bool_result(&md).unwrap());

        let agg = Aggref::new(MdId::gpdb(2000), None, false, AggStage::Normal).unwrap();
        assert!(ScalarOp::Aggref(agg).has_bool_result(&md).unwrap());

        let eq = OpExpr::new("=", MdId::gpdb(96), None).unwrap();
        assert!(ScalarOp::OpExpr(eq).has_bool_result(&md).unwrap());

        let col = ColRef::new(1, "flag", MdId::gpdb(16)).unwrap();
        assert!(ScalarOp::Ident(Ident::new(col)).has_bool_result(&md).unwrap());
        assert!(!ScalarOp::ConstValue(ConstValue::new(Datum::int4(1)))
            .has_bool_result(&md)
            .unwrap());
    }

    #[test]
    fn test_bool_result_lookup_miss_propagates() {
        let md = md();
        let unknown = FuncExpr::new(MdId::gpdb(4242), MdId::gpdb(16), -1, false).unwrap();
        assert!(matches!(
            ScalarOp::FuncExpr(unknown).has_bool_result(&md),
            Err(DxlError::MetadataLookup { kind: "function", .. })
        ));
    }

    #[test]
    fn test_cast_checks_operator_id() {
        let op = DxlOperator::Scalar(ScalarOp::BoolExpr(BoolExpr::new(BoolExprType::Or)));
        assert_eq!(op.cast::<BoolExpr>().unwrap().bool_type, BoolExprType::Or);
        assert_eq!(
            op.cast::<Comparison>().unwrap_err(),
            DxlError::OperatorKindMismatch {
                expected: "Comparison",
                found: DxlOpId::BoolExpr
            }
        );
        let result = DxlOperator::Physical(PhysicalOp::Result(ResultOp));
        assert!(result.cast::<ResultOp>().is_ok());
        assert!(result.has_bool_result(&md()).is_err());
    }

    #[test]
    fn test_family_names_and_ids() {
        let one_time = ScalarOp::Filter(Filter::new(FilterKind::OneTimeFilter));
        assert_eq!(one_time.op_id(), DxlOpId::OneTimeFilter);
        assert_eq!(one_time.op_name(), "OneTimeFilter");
        let trailing = ScalarOp::WindowFrameEdge(WindowFrameEdge::new(
            false,
            FrameBoundary::UnboundedFollowing,
        ));
        assert_eq!(trailing.op_name(), "TrailingEdge");
        assert_eq!(
            ScalarOp::NullTest(NullTest::new(false)).op_name(),
            "IsNotNull"
        );
        assert!(DxlOpId::ALL.iter().filter(|id| id.is_physical()).count() == 22);
        assert!(DxlOpId::ALL.iter().all(|id| !id.element_names().is_empty()));
    }
}
