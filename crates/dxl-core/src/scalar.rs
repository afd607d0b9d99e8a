//! # Scalar Operators
//!
//! Payloads of every scalar operator. Each payload owns its scalar attributes
//! (metadata ids, flags, enum codes) and nothing else; children live on the
//! enclosing `DxlNode`.
//!
//! ## Construction
//!
//! Payloads with metadata-id attributes are built through `new` constructors that
//! reject the invalid id with `DxlError::InvalidMdId`. A few ids may legitimately
//! be invalid on the wire (the function of a binary-coercible `Cast`, the element
//! function of an `ArrayCoerceExpr`) and are stored as given.
//!
//! ## Families
//!
//! Some payloads stand for a family of closely related operators that differ only
//! in a kind field: `BoolExpr` (And/Or/Not), `Filter` (Filter, OneTimeFilter,
//! JoinFilter, RecheckCond), `CondList` (hash, merge and index conditions). The
//! element name, and for `Filter`/`CondList` also the operator id, follow the
//! kind.

use crate::colref::ColRef;
use crate::colref::IndexDescr;
use crate::datum::Datum;
use crate::error::{DxlError, Result};
use crate::mdid::MdId;
use crate::node::DxlNode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Wire enums
// ---------------------------------------------------------------------------

wire_enum! {
    /// Kind of a logical connective.
    pub enum BoolExprType {
        And => "And",
        Or => "Or",
        Not => "Not",
    }
}

wire_enum! {
    pub enum BooleanTestType {
        IsTrue => "IsTrue",
        IsNotTrue => "IsNotTrue",
        IsFalse => "IsFalse",
        IsNotFalse => "IsNotFalse",
        IsUnknown => "IsUnknown",
        IsNotUnknown => "IsNotUnknown",
    }
}

wire_enum! {
    /// Quantifier of an array comparison (`x = ANY(arr)`).
    pub enum ArrayCompType {
        Any => "Any",
        All => "All",
    }
}

wire_enum! {
    /// Execution stage of an aggregate in a multi-stage aggregation.
    pub enum AggStage {
        Normal => "Normal",
        Partial => "Partial",
        Intermediate => "Intermediate",
        Final => "Final",
    }
}

wire_enum! {
    /// Evaluation strategy of a window function.
    pub enum WindowStage {
        Immediate => "Immediate",
        Preliminary => "Preliminary",
        RowKey => "RowKey",
    }
}

wire_enum! {
    pub enum MinMaxType {
        Min => "Min",
        Max => "Max",
    }
}

wire_enum! {
    pub enum IndexListBound {
        Upper => "Upper",
        Lower => "Lower",
    }
}

wire_enum! {
    pub enum SubPlanType {
        Scalar => "ScalarSubPlan",
        Exists => "ExistsSubPlan",
        NotExists => "NotExistsSubPlan",
        Any => "AnySubPlan",
        All => "AllSubPlan",
    }
}

wire_enum! {
    pub enum FilterKind {
        Filter => "Filter",
        OneTimeFilter => "OneTimeFilter",
        JoinFilter => "JoinFilter",
        RecheckCond => "RecheckCond",
    }
}

wire_enum! {
    pub enum CondListKind {
        Hash => "HashCondList",
        Merge => "MergeCondList",
        Index => "IndexCondList",
    }
}

wire_enum! {
    pub enum CoerceKind {
        ToDomain => "CoerceToDomain",
        ViaIO => "CoerceViaIO",
    }
}

wire_enum! {
    pub enum BitmapOpType {
        And => "BitmapAnd",
        Or => "BitmapOr",
    }
}

wire_enum! {
    /// Boundary of a window frame edge.
    pub enum FrameBoundary {
        UnboundedPreceding => "UnboundedPreceding",
        BoundedPreceding => "BoundedPreceding",
        CurrentRow => "CurrentRow",
        UnboundedFollowing => "UnboundedFollowing",
        BoundedFollowing => "BoundedFollowing",
        DelayedBoundedPreceding => "DelayedBoundedPreceding",
        DelayedBoundedFollowing => "DelayedBoundedFollowing",
    }
}

impl FrameBoundary {
    /// Bounded edges carry exactly one offset expression; the others carry none.
    pub fn is_bounded(self) -> bool {
        matches!(
            self,
            FrameBoundary::BoundedPreceding
                | FrameBoundary::BoundedFollowing
                | FrameBoundary::DelayedBoundedPreceding
                | FrameBoundary::DelayedBoundedFollowing
        )
    }
}

/// How a coercion appears in the source query. Written as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoercionForm {
    ExplicitCall = 0,
    ExplicitCast = 1,
    ImplicitCast = 2,
    DontCare = 3,
}

impl CoercionForm {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => CoercionForm::ExplicitCall,
            1 => CoercionForm::ExplicitCast,
            2 => CoercionForm::ImplicitCast,
            3 => CoercionForm::DontCare,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Leaf expressions
// ---------------------------------------------------------------------------

/// Reference to a column defined elsewhere in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub colref: Arc<ColRef>,
}

impl Ident {
    pub fn new(colref: Arc<ColRef>) -> Self {
        Self { colref }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstValue {
    pub datum: Datum,
}

impl ConstValue {
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }
}

/// Placeholder for the switch argument inside a `Switch` case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseTest {
    pub type_mdid: MdId,
}

impl CaseTest {
    pub fn new(type_mdid: MdId) -> Result<Self> {
        Ok(Self {
            type_mdid: type_mdid.require_valid("CaseTest", "TypeMdid")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Operators and predicates
// ---------------------------------------------------------------------------

/// Binary comparison such as `a = b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comparison {
    pub op_name: String,
    pub op_mdid: MdId,
}

impl Comparison {
    pub fn new(op_name: impl Into<String>, op_mdid: MdId) -> Result<Self> {
        Ok(Self {
            op_name: op_name.into(),
            op_mdid: op_mdid.require_valid("Comparison", "OperatorMdid")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistinctComparison {
    pub op_mdid: MdId,
}

impl DistinctComparison {
    pub fn new(op_mdid: MdId) -> Result<Self> {
        Ok(Self {
            op_mdid: op_mdid.require_valid("IsDistinctFrom", "OperatorMdid")?,
        })
    }
}

/// Unary or binary operator application. The result type is optional on the
/// wire; `has_bool_result` consults the operator's catalog entry instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpExpr {
    pub op_name: String,
    pub op_mdid: MdId,
    pub return_type: Option<MdId>,
}

impl OpExpr {
    pub fn new(
        op_name: impl Into<String>,
        op_mdid: MdId,
        return_type: Option<MdId>,
    ) -> Result<Self> {
        let return_type = match return_type {
            Some(t) => Some(t.require_valid("OpExpr", "OperatorType")?),
            None => None,
        };
        Ok(Self {
            op_name: op_name.into(),
            op_mdid: op_mdid.require_valid("OpExpr", "OperatorMdid")?,
            return_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayComp {
    pub op_name: String,
    pub op_mdid: MdId,
    pub comp_type: ArrayCompType,
}

impl ArrayComp {
    pub fn new(op_name: impl Into<String>, op_mdid: MdId, comp_type: ArrayCompType) -> Result<Self> {
        Ok(Self {
            op_name: op_name.into(),
            op_mdid: op_mdid.require_valid("ArrayComp", "OperatorMdid")?,
            comp_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoolExpr {
    pub bool_type: BoolExprType,
}

impl BoolExpr {
    pub fn new(bool_type: BoolExprType) -> Self {
        Self { bool_type }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BooleanTest {
    pub test: BooleanTestType,
}

impl BooleanTest {
    pub fn new(test: BooleanTestType) -> Self {
        Self { test }
    }
}

/// `IS NULL` when `is_null`, `IS NOT NULL` otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NullTest {
    pub is_null: bool,
}

impl NullTest {
    pub fn new(is_null: bool) -> Self {
        Self { is_null }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NullIf {
    pub op_mdid: MdId,
    pub type_mdid: MdId,
}

impl NullIf {
    pub fn new(op_mdid: MdId, type_mdid: MdId) -> Result<Self> {
        Ok(Self {
            op_mdid: op_mdid.require_valid("NullIf", "OperatorMdid")?,
            type_mdid: type_mdid.require_valid("NullIf", "TypeMdid")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Casts and coercions
// ---------------------------------------------------------------------------

/// Type cast. `func_mdid` is the invalid id for binary-coercible casts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cast {
    pub type_mdid: MdId,
    pub func_mdid: MdId,
}

impl Cast {
    pub fn new(type_mdid: MdId, func_mdid: MdId) -> Result<Self> {
        Ok(Self {
            type_mdid: type_mdid.require_valid("Cast", "TypeMdid")?,
            func_mdid,
        })
    }
}

/// `CoerceToDomain` and `CoerceViaIO`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coerce {
    pub kind: CoerceKind,
    pub type_mdid: MdId,
    pub type_mod: i32,
    pub coercion_form: CoercionForm,
    pub location: i32,
}

impl Coerce {
    pub fn new(
        kind: CoerceKind,
        type_mdid: MdId,
        type_mod: i32,
        coercion_form: CoercionForm,
        location: i32,
    ) -> Result<Self> {
        Ok(Self {
            kind,
            type_mdid: type_mdid.require_valid(kind.name(), "TypeMdid")?,
            type_mod,
            coercion_form,
            location,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayCoerceExpr {
    pub element_func: MdId,
    pub type_mdid: MdId,
    pub type_mod: i32,
    pub is_explicit: bool,
    pub coercion_form: CoercionForm,
    pub location: i32,
}

impl ArrayCoerceExpr {
    pub fn new(
        element_func: MdId,
        type_mdid: MdId,
        type_mod: i32,
        is_explicit: bool,
        coercion_form: CoercionForm,
        location: i32,
    ) -> Result<Self> {
        Ok(Self {
            element_func,
            type_mdid: type_mdid.require_valid("ArrayCoerceExpr", "TypeMdid")?,
            type_mod,
            is_explicit,
            coercion_form,
            location,
        })
    }
}

// ---------------------------------------------------------------------------
// Functions, aggregates, window functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FuncExpr {
    pub func_mdid: MdId,
    pub return_type: MdId,
    pub type_mod: i32,
    pub returns_set: bool,
}

impl FuncExpr {
    pub fn new(func_mdid: MdId, return_type: MdId, type_mod: i32, returns_set: bool) -> Result<Self> {
        Ok(Self {
            func_mdid: func_mdid.require_valid("FuncExpr", "FuncId")?,
            return_type: return_type.require_valid("FuncExpr", "TypeMdid")?,
            type_mod,
            returns_set,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggref {
    pub agg_mdid: MdId,
    /// Resolved return type for polymorphic aggregates.
    pub resolved_return_type: Option<MdId>,
    pub distinct: bool,
    pub stage: AggStage,
}

impl Aggref {
    pub fn new(
        agg_mdid: MdId,
        resolved_return_type: Option<MdId>,
        distinct: bool,
        stage: AggStage,
    ) -> Result<Self> {
        let resolved_return_type = match resolved_return_type {
            Some(t) => Some(t.require_valid("AggFunc", "TypeMdid")?),
            None => None,
        };
        Ok(Self {
            agg_mdid: agg_mdid.require_valid("AggFunc", "AggMdid")?,
            resolved_return_type,
            distinct,
            stage,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowRef {
    pub func_mdid: MdId,
    pub return_type: MdId,
    pub distinct: bool,
    pub star_arg: bool,
    pub simple_agg: bool,
    pub stage: WindowStage,
    /// Position of the window specification in the enclosing `Window`.
    pub win_spec_pos: u32,
}

impl WindowRef {
    pub fn new(
        func_mdid: MdId,
        return_type: MdId,
        distinct: bool,
        star_arg: bool,
        simple_agg: bool,
        stage: WindowStage,
        win_spec_pos: u32,
    ) -> Result<Self> {
        Ok(Self {
            func_mdid: func_mdid.require_valid("WindowFunc", "Mdid")?,
            return_type: return_type.require_valid("WindowFunc", "TypeMdid")?,
            distinct,
            star_arg,
            simple_agg,
            stage,
            win_spec_pos,
        })
    }
}

// ---------------------------------------------------------------------------
// Conditionals
// ---------------------------------------------------------------------------

macro_rules! typed_payload {
    ($(#[$meta:meta])* $name:ident, $elem:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name {
            pub type_mdid: MdId,
        }

        impl $name {
            pub fn new(type_mdid: MdId) -> Result<Self> {
                Ok(Self {
                    type_mdid: type_mdid.require_valid($elem, "TypeMdid")?,
                })
            }
        }
    };
}

typed_payload!(
    /// `If` with condition, then and else children.
    IfStmt,
    "If"
);
typed_payload!(Switch, "Switch");
typed_payload!(Coalesce, "Coalesce");
typed_payload!(
    /// Hash expression of a redistribute motion.
    HashExpr,
    "HashExpr"
);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinMax {
    pub kind: MinMaxType,
    pub type_mdid: MdId,
}

impl MinMax {
    pub fn new(kind: MinMaxType, type_mdid: MdId) -> Result<Self> {
        Ok(Self {
            kind,
            type_mdid: type_mdid.require_valid(kind.name(), "TypeMdid")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Array {
    pub elem_type: MdId,
    pub array_type: MdId,
    pub multi_dimensional: bool,
}

impl Array {
    pub fn new(elem_type: MdId, array_type: MdId, multi_dimensional: bool) -> Result<Self> {
        Ok(Self {
            elem_type: elem_type.require_valid("Array", "ElementType")?,
            array_type: array_type.require_valid("Array", "ArrayType")?,
            multi_dimensional,
        })
    }
}

/// Subscript of an array (`arr[i]`), optionally assigning to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayRef {
    pub elem_type: MdId,
    pub type_mod: i32,
    pub array_type: MdId,
    pub return_type: MdId,
}

impl ArrayRef {
    pub fn new(elem_type: MdId, type_mod: i32, array_type: MdId, return_type: MdId) -> Result<Self> {
        Ok(Self {
            elem_type: elem_type.require_valid("ArrayRef", "ElementType")?,
            type_mod,
            array_type: array_type.require_valid("ArrayRef", "ArrayType")?,
            return_type: return_type.require_valid("ArrayRef", "TypeMdid")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayRefIndexList {
    pub bound: IndexListBound,
}

impl ArrayRefIndexList {
    pub fn new(bound: IndexListBound) -> Self {
        Self { bound }
    }
}

// ---------------------------------------------------------------------------
// Sub-plans
// ---------------------------------------------------------------------------

/// Nested plan evaluated as a scalar expression.
///
/// Quantified sub-plans (`Any`, `All`) compare the outer value against each row
/// through `test_expr`, which is therefore mandatory for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubPlan {
    pub type_mdid: MdId,
    pub subplan_type: SubPlanType,
    pub test_expr: Option<Box<DxlNode>>,
    pub params: Vec<Arc<ColRef>>,
}

impl SubPlan {
    pub fn new(
        type_mdid: MdId,
        subplan_type: SubPlanType,
        test_expr: Option<DxlNode>,
        params: Vec<Arc<ColRef>>,
    ) -> Result<Self> {
        let type_mdid = type_mdid.require_valid("SubPlan", "TypeMdid")?;
        if matches!(subplan_type, SubPlanType::Any | SubPlanType::All) && test_expr.is_none() {
            return Err(DxlError::MissingTestExpr(subplan_type.name()));
        }
        Ok(Self {
            type_mdid,
            subplan_type,
            test_expr: test_expr.map(Box::new),
            params,
        })
    }
}

// ---------------------------------------------------------------------------
// Projections, lists and containers
// ---------------------------------------------------------------------------

macro_rules! unit_payload {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
            pub struct $name;
        )+
    };
}

unit_payload!(
    /// List of `ProjElem` children defining a node's output columns.
    ProjList,
    /// One `WHEN` arm of a `Switch`.
    SwitchCase,
    HashExprList,
    SortColList,
    LimitCount,
    LimitOffset,
    AssertConstraintList,
    DmlAction,
    ValuesList,
);

/// Output column of a projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjElem {
    pub col_id: u32,
    pub alias: String,
}

impl ProjElem {
    pub fn new(col_id: u32, alias: impl Into<String>) -> Self {
        Self {
            col_id,
            alias: alias.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub kind: FilterKind,
}

impl Filter {
    pub fn new(kind: FilterKind) -> Self {
        Self { kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CondList {
    pub kind: CondListKind,
}

impl CondList {
    pub fn new(kind: CondListKind) -> Self {
        Self { kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortCol {
    pub col_id: u32,
    pub sort_op_mdid: MdId,
    pub sort_op_name: String,
    pub nulls_first: bool,
}

impl SortCol {
    pub fn new(
        col_id: u32,
        sort_op_mdid: MdId,
        sort_op_name: impl Into<String>,
        nulls_first: bool,
    ) -> Result<Self> {
        Ok(Self {
            col_id,
            sort_op_mdid: sort_op_mdid.require_valid("SortingColumn", "SortOperatorMdid")?,
            sort_op_name: sort_op_name.into(),
            nulls_first,
        })
    }
}

/// Leading or trailing edge of a window frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowFrameEdge {
    pub leading: bool,
    pub boundary: FrameBoundary,
}

impl WindowFrameEdge {
    pub fn new(leading: bool, boundary: FrameBoundary) -> Self {
        Self { leading, boundary }
    }

    pub fn element_name(&self) -> &'static str {
        if self.leading {
            "LeadingEdge"
        } else {
            "TrailingEdge"
        }
    }
}

// ---------------------------------------------------------------------------
// Partition predicates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartBound {
    pub level: u32,
    pub type_mdid: MdId,
    pub is_lower: bool,
}

impl PartBound {
    pub fn new(level: u32, type_mdid: MdId, is_lower: bool) -> Result<Self> {
        Ok(Self {
            level,
            type_mdid: type_mdid.require_valid("PartBound", "TypeMdid")?,
            is_lower,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartBoundInclusion {
    pub level: u32,
    pub is_lower: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartBoundOpen {
    pub level: u32,
    pub is_lower: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartDefault {
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartOid {
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartListValues {
    pub level: u32,
    pub result_type: MdId,
    pub elem_type: MdId,
}

impl PartListValues {
    pub fn new(level: u32, result_type: MdId, elem_type: MdId) -> Result<Self> {
        Ok(Self {
            level,
            result_type: result_type.require_valid("PartListValues", "ResultType")?,
            elem_type: elem_type.require_valid("PartListValues", "ElementType")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartListNullTest {
    pub level: u32,
    pub is_null: bool,
}

// ---------------------------------------------------------------------------
// Bitmap access paths and assertions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitmapBoolOp {
    pub op: BitmapOpType,
    pub type_mdid: MdId,
}

impl BitmapBoolOp {
    pub fn new(op: BitmapOpType, type_mdid: MdId) -> Result<Self> {
        Ok(Self {
            op,
            type_mdid: type_mdid.require_valid(op.name(), "TypeMdid")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitmapIndexProbe {
    pub index: IndexDescr,
}

impl BitmapIndexProbe {
    pub fn new(index: IndexDescr) -> Self {
        Self { index }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssertConstraint {
    pub error_message: String,
}

impl AssertConstraint {
    pub fn new(error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{DxlOperator, ScalarOp};

    #[test]
    fn test_quantified_subplan_requires_test_expr() {
        for t in [SubPlanType::Any, SubPlanType::All] {
            let err = SubPlan::new(MdId::gpdb(16), t, None, vec![]).unwrap_err();
            assert_eq!(err, DxlError::MissingTestExpr(t.name()));
        }
        for t in [SubPlanType::Scalar, SubPlanType::Exists, SubPlanType::NotExists] {
            assert!(SubPlan::new(MdId::gpdb(16), t, None, vec![]).is_ok());
        }
        let test = DxlNode::new(DxlOperator::Scalar(ScalarOp::ConstValue(ConstValue::new(
            Datum::bool(true),
        ))));
        let sp = SubPlan::new(MdId::gpdb(16), SubPlanType::Any, Some(test), vec![]).unwrap();
        assert!(sp.test_expr.is_some());
    }

    #[test]
    fn test_constructors_reject_invalid_ids() {
        assert_eq!(
            Comparison::new("=", MdId::invalid()).unwrap_err(),
            DxlError::InvalidMdId {
                op: "Comparison",
                attr: "OperatorMdid"
            }
        );
        assert!(FuncExpr::new(MdId::gpdb(1), MdId::invalid(), -1, false).is_err());
        assert!(Cast::new(MdId::gpdb(20), MdId::invalid()).is_ok());
        assert!(IfStmt::new(MdId::invalid()).is_err());
    }

    #[test]
    fn test_frame_boundary_classification() {
        let bounded: Vec<_> = FrameBoundary::ALL
            .iter()
            .filter(|b| b.is_bounded())
            .map(|b| b.name())
            .collect();
        assert_eq!(
            bounded,
            vec![
                "BoundedPreceding",
                "BoundedFollowing",
                "DelayedBoundedPreceding",
                "DelayedBoundedFollowing"
            ]
        );
    }

    #[test]
    fn test_wire_names_round_trip() {
        for s in SubPlanType::ALL {
            assert_eq!(SubPlanType::from_name(s.name()), Some(*s));
        }
        assert_eq!(AggStage::from_name("Intermediate"), Some(AggStage::Intermediate));
        assert_eq!(WindowStage::from_name("Bogus"), None);
        assert_eq!(CoercionForm::from_code(2), Some(CoercionForm::ImplicitCast));
    }
}
