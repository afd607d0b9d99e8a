//! # Structural Validation
//!
//! Checks the declared arity and per-child typing of every operator. The check is
//! a separate pass rather than a side effect of construction so that tests and
//! the service can run it on any tree, and so that partially built trees can be
//! checked one level at a time.
//!
//! ## Layouts
//!
//! Each operator declares a layout: a fixed prefix of positional slots followed by
//! an optional tail. A slot constrains one child:
//!
//! ```text
//! Scalar        any non-container scalar
//! Bool          non-container scalar whose has_bool_result is true
//! Physical      any physical operator
//! Op(id)        exactly the operator `id`
//! IndexList(b)  ArrayIndexList with bound b
//! BitmapPath    BitmapIndexProbe, BitmapAnd or BitmapOr
//! ```
//!
//! Boolean slots consult the metadata accessor, so validation can fail with a
//! lookup error as well as with a structural one.
//!
//! ## Recursion
//!
//! With `validate_children` unset only the node itself is checked. With it set the
//! check recurses into children and into nodes held by the payload (sub-plan test
//! expressions, window keys).

use crate::error::{DxlError, Result};
use crate::md_accessor::MdAccessor;
use crate::node::DxlNode;
use crate::operator::{DxlOpId, DxlOperator, PhysicalOp, ScalarOp};
use crate::scalar::{ArrayRefIndexList, BoolExprType, IndexListBound};
use tracing::trace;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Scalar,
    Bool,
    Physical,
    Op(DxlOpId),
    IndexList(IndexListBound),
    BitmapPath,
}

impl Slot {
    fn describe(self) -> &'static str {
        match self {
            Slot::Scalar => "a scalar expression",
            Slot::Bool => "a boolean scalar expression",
            Slot::Physical => "a physical operator",
            Slot::Op(id) => id.element_names()[0],
            Slot::IndexList(IndexListBound::Upper) => "an upper ArrayIndexList",
            Slot::IndexList(IndexListBound::Lower) => "a lower ArrayIndexList",
            Slot::BitmapPath => "a bitmap access path",
        }
    }

    fn accepts(self, child: &DxlNode, md: &dyn MdAccessor) -> Result<bool> {
        let id = child.op_id();
        Ok(match self {
            Slot::Scalar => id.is_scalar() && !id.is_container(),
            Slot::Bool => id.is_scalar() && !id.is_container() && child.op.has_bool_result(md)?,
            Slot::Physical => id.is_physical(),
            Slot::Op(expected) => id == expected,
            Slot::IndexList(bound) => child
                .op
                .cast::<ArrayRefIndexList>()
                .map_or(false, |l| l.bound == bound),
            Slot::BitmapPath => matches!(id, DxlOpId::BitmapIndexProbe | DxlOpId::BitmapBoolOp),
        })
    }
}

/// Children after the fixed prefix.
#[derive(Debug, Clone, Copy)]
enum Tail {
    None,
    Optional(Slot),
    Many { slot: Slot, min: usize },
}

struct Layout {
    fixed: Vec<Slot>,
    tail: Tail,
}

impl Layout {
    fn exact(fixed: Vec<Slot>) -> Self {
        Self {
            fixed,
            tail: Tail::None,
        }
    }

    fn optional(fixed: Vec<Slot>, slot: Slot) -> Self {
        Self {
            fixed,
            tail: Tail::Optional(slot),
        }
    }

    fn many(fixed: Vec<Slot>, slot: Slot, min: usize) -> Self {
        Self {
            fixed,
            tail: Tail::Many { slot, min },
        }
    }

    fn expected_arity(&self) -> String {
        let n = self.fixed.len();
        match self.tail {
            Tail::None => n.to_string(),
            Tail::Optional(_) => format!("{} or {}", n, n + 1),
            Tail::Many { min, .. } => format!("at least {}", n + min),
        }
    }

    fn check(&self, node: &DxlNode, md: &dyn MdAccessor) -> Result<()> {
        let op = node.op_id();
        let found = node.arity();
        let n = self.fixed.len();
        let arity_ok = match self.tail {
            Tail::None => found == n,
            Tail::Optional(_) => found == n || found == n + 1,
            Tail::Many { min, .. } => found >= n + min,
        };
        if !arity_ok {
            return Err(DxlError::Arity {
                op,
                expected: self.expected_arity(),
                found,
            });
        }
        for (index, child) in node.children.iter().enumerate() {
            let tail = match self.tail {
                Tail::Optional(slot) | Tail::Many { slot, .. } => Some(slot),
                Tail::None => None,
            };
            let Some(slot) = self.fixed.get(index).copied().or(tail) else {
                continue;
            };
            if !slot.accepts(child, md)? {
                return Err(DxlError::ChildKind {
                    op,
                    index,
                    expected: slot.describe(),
                    found: child.op_id(),
                });
            }
        }
        Ok(())
    }
}

fn scalar_layout(op: &ScalarOp) -> Option<Layout> {
    use Slot::*;
    Some(match op {
        ScalarOp::Ident(_)
        | ScalarOp::ConstValue(_)
        | ScalarOp::CaseTest(_)
        | ScalarOp::SortCol(_)
        | ScalarOp::PartBound(_)
        | ScalarOp::PartBoundInclusion(_)
        | ScalarOp::PartBoundOpen(_)
        | ScalarOp::PartDefault(_)
        | ScalarOp::PartOid(_)
        | ScalarOp::PartListValues(_)
        | ScalarOp::PartListNullTest(_)
        | ScalarOp::DmlAction(_) => Layout::exact(vec![]),
        ScalarOp::Comparison(_)
        | ScalarOp::DistinctComparison(_)
        | ScalarOp::ArrayComp(_)
        | ScalarOp::NullIf(_)
        | ScalarOp::SwitchCase(_) => Layout::exact(vec![Scalar, Scalar]),
        ScalarOp::OpExpr(_) => Layout::optional(vec![Scalar], Scalar),
        ScalarOp::BoolExpr(b) => match b.bool_type {
            BoolExprType::Not => Layout::exact(vec![Bool]),
            BoolExprType::And | BoolExprType::Or => Layout::many(vec![], Bool, 2),
        },
        ScalarOp::BooleanTest(_)
        | ScalarOp::NullTest(_)
        | ScalarOp::Cast(_)
        | ScalarOp::Coerce(_)
        | ScalarOp::ArrayCoerceExpr(_)
        | ScalarOp::ProjElem(_)
        | ScalarOp::HashExpr(_) => Layout::exact(vec![Scalar]),
        ScalarOp::AssertConstraint(_) => Layout::exact(vec![Bool]),
        ScalarOp::FuncExpr(_)
        | ScalarOp::Aggref(_)
        | ScalarOp::WindowRef(_)
        | ScalarOp::Array(_)
        | ScalarOp::ArrayRefIndexList(_)
        | ScalarOp::ValuesList(_) => Layout::many(vec![], Scalar, 0),
        ScalarOp::IfStmt(_) => Layout::exact(vec![Bool, Scalar, Scalar]),
        // Checked by `check_switch`.
        ScalarOp::Switch(_) => return None,
        ScalarOp::Coalesce(_) | ScalarOp::MinMax(_) => Layout::many(vec![], Scalar, 1),
        ScalarOp::ArrayRef(_) => Layout::optional(
            vec![
                IndexList(IndexListBound::Upper),
                IndexList(IndexListBound::Lower),
                Scalar,
            ],
            Scalar,
        ),
        ScalarOp::SubPlan(_) => Layout::exact(vec![Physical]),
        ScalarOp::ProjList(_) => Layout::many(vec![], Op(DxlOpId::ProjElem), 0),
        ScalarOp::Filter(_) => Layout::optional(vec![], Bool),
        ScalarOp::CondList(_) => Layout::many(vec![], Bool, 0),
        ScalarOp::HashExprList(_) => Layout::many(vec![], Op(DxlOpId::HashExpr), 1),
        ScalarOp::SortColList(_) => Layout::many(vec![], Op(DxlOpId::SortCol), 0),
        ScalarOp::LimitCount(_) | ScalarOp::LimitOffset(_) => Layout::optional(vec![], Scalar),
        ScalarOp::WindowFrameEdge(e) => {
            if e.boundary.is_bounded() {
                Layout::exact(vec![Scalar])
            } else {
                Layout::exact(vec![])
            }
        }
        ScalarOp::BitmapBoolOp(_) => Layout::many(vec![], BitmapPath, 2),
        ScalarOp::BitmapIndexProbe(_) => Layout::exact(vec![Op(DxlOpId::IndexCondList)]),
        ScalarOp::AssertConstraintList(_) => {
            Layout::many(vec![], Op(DxlOpId::AssertConstraint), 1)
        }
    })
}

fn physical_layout(op: &PhysicalOp) -> Layout {
    use Slot::*;
    let proj = Op(DxlOpId::ProjList);
    let filter = Op(DxlOpId::Filter);
    match op {
        PhysicalOp::TableScan(_) | PhysicalOp::DynamicTableScan(_) => {
            Layout::exact(vec![proj, filter])
        }
        PhysicalOp::IndexScan(_) => Layout::exact(vec![proj, filter, Op(DxlOpId::IndexCondList)]),
        PhysicalOp::BitmapTableScan(_) => {
            Layout::exact(vec![proj, filter, Op(DxlOpId::RecheckCond), BitmapPath])
        }
        PhysicalOp::Result(_) => {
            Layout::optional(vec![proj, filter, Op(DxlOpId::OneTimeFilter)], Physical)
        }
        PhysicalOp::HashJoin(_) => Layout::exact(vec![
            proj,
            filter,
            Op(DxlOpId::JoinFilter),
            Op(DxlOpId::HashCondList),
            Physical,
            Physical,
        ]),
        PhysicalOp::NestedLoopJoin(_) => Layout::exact(vec![
            proj,
            filter,
            Op(DxlOpId::JoinFilter),
            Physical,
            Physical,
        ]),
        PhysicalOp::MergeJoin(_) => Layout::exact(vec![
            proj,
            filter,
            Op(DxlOpId::JoinFilter),
            Op(DxlOpId::MergeCondList),
            Physical,
            Physical,
        ]),
        PhysicalOp::Motion(m) => {
            let mut fixed = vec![proj, filter, Op(DxlOpId::SortColList)];
            if m.has_hash_exprs() {
                fixed.push(Op(DxlOpId::HashExprList));
            }
            fixed.push(Physical);
            Layout::exact(fixed)
        }
        PhysicalOp::Append(_) => Layout::many(vec![proj, filter], Physical, 0),
        PhysicalOp::Limit(_) => Layout::exact(vec![
            proj,
            Physical,
            Op(DxlOpId::LimitCount),
            Op(DxlOpId::LimitOffset),
        ]),
        PhysicalOp::Sort(_) => Layout::exact(vec![
            proj,
            filter,
            Op(DxlOpId::SortColList),
            Op(DxlOpId::LimitCount),
            Op(DxlOpId::LimitOffset),
            Physical,
        ]),
        PhysicalOp::Aggregate(_)
        | PhysicalOp::Materialize(_)
        | PhysicalOp::Window(_)
        | PhysicalOp::SubqueryScan(_) => Layout::exact(vec![proj, filter, Physical]),
        PhysicalOp::PartitionSelector(_) => Layout::exact(vec![proj, Scalar, Physical]),
        PhysicalOp::Sequence(_) => Layout::many(vec![proj], Physical, 1),
        PhysicalOp::Assert(_) => {
            Layout::exact(vec![proj, Op(DxlOpId::AssertConstraintList), Physical])
        }
        PhysicalOp::CteProducer(_) => Layout::exact(vec![proj, Physical]),
        PhysicalOp::CteConsumer(_) => Layout::exact(vec![proj]),
        PhysicalOp::TableValuedFunction(_) => Layout::many(vec![proj], Scalar, 0),
    }
}

/// `Switch`: the argument, at least one `SwitchCase`, then an optional default
/// expression.
fn check_switch(node: &DxlNode) -> Result<()> {
    let op = DxlOpId::Switch;
    let children = &node.children;
    let cases = children
        .iter()
        .skip(1)
        .filter(|c| c.op_id() == DxlOpId::SwitchCase)
        .count();
    if children.len() < 2 || cases == 0 {
        return Err(DxlError::Arity {
            op,
            expected: "at least 2".into(),
            found: children.len(),
        });
    }
    let last = children.len() - 1;
    for (index, child) in children.iter().enumerate() {
        let id = child.op_id();
        let ok = match index {
            0 => id.is_scalar() && !id.is_container(),
            i if i == last && id != DxlOpId::SwitchCase => id.is_scalar() && !id.is_container(),
            _ => id == DxlOpId::SwitchCase,
        };
        if !ok {
            return Err(DxlError::ChildKind {
                op,
                index,
                expected: if index == 0 || index == last {
                    "a scalar expression"
                } else {
                    "SwitchCase"
                },
                found: id,
            });
        }
    }
    Ok(())
}

fn check_nested(node: &DxlNode) -> Result<()> {
    if let DxlOperator::Scalar(ScalarOp::SubPlan(sp)) = &node.op {
        if let Some(test) = &sp.test_expr {
            if !test.is_scalar() {
                return Err(DxlError::ChildKind {
                    op: DxlOpId::SubPlan,
                    index: 0,
                    expected: "a scalar test expression",
                    found: test.op_id(),
                });
            }
        }
    }
    if let DxlOperator::Physical(PhysicalOp::Window(w)) = &node.op {
        for key in &w.keys {
            if let Some(sort) = &key.sort_cols {
                if sort.op_id() != DxlOpId::SortColList {
                    return Err(DxlError::ChildKind {
                        op: DxlOpId::Window,
                        index: 0,
                        expected: "SortingColumnList",
                        found: sort.op_id(),
                    });
                }
            }
        }
    }
    Ok(())
}

impl DxlNode {
    /// Check this node's arity and child typing.
    ///
    /// With `validate_children` set the check recurses through the whole tree,
    /// including nodes nested in payloads.
    pub fn validate(&self, md: &dyn MdAccessor, validate_children: bool) -> Result<()> {
        trace!(op = ?self.op_id(), arity = self.arity(), "validating node");
        match &self.op {
            DxlOperator::Scalar(ScalarOp::Switch(_)) => check_switch(self)?,
            DxlOperator::Scalar(op) => {
                if let Some(layout) = scalar_layout(op) {
                    layout.check(self, md)?;
                }
            }
            DxlOperator::Physical(op) => physical_layout(op).check(self, md)?,
        }
        check_nested(self)?;
        if validate_children {
            for nested in self.nested_nodes() {
                nested.validate(md, true)?;
            }
            for child in &self.children {
                child.validate(md, true)?;
            }
        }
        Ok(())
    }
}
