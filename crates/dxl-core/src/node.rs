//! # Tree Container
//!
//! `DxlNode` owns an operator payload and an ordered list of child nodes. Children
//! are exclusively owned, so dropping the root drops the whole tree; only
//! column references (`Arc<ColRef>`) are shared across nodes.
//!
//! Child order is significant. It encodes operand order of non-commutative
//! operators, projection order, and the positional layout of physical nodes
//! (`ProjList`, `Filter`, ..., inputs). Serialization preserves it.
//!
//! Trees are immutable once built: rewrites build new nodes.

use crate::operator::{DxlOpId, DxlOperator, PhysicalOp, ScalarOp};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Optimizer cost estimates attached to a physical node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalProperties {
    pub startup_cost: OrderedFloat<f64>,
    pub total_cost: OrderedFloat<f64>,
    pub rows: OrderedFloat<f64>,
    pub width: OrderedFloat<f64>,
}

impl PhysicalProperties {
    pub fn new(startup_cost: f64, total_cost: f64, rows: f64, width: f64) -> Self {
        Self {
            startup_cost: OrderedFloat(startup_cost),
            total_cost: OrderedFloat(total_cost),
            rows: OrderedFloat(rows),
            width: OrderedFloat(width),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DxlNode {
    pub op: DxlOperator,
    pub properties: Option<PhysicalProperties>,
    pub children: Vec<DxlNode>,
}

impl DxlNode {
    pub fn new(op: impl Into<DxlOperator>) -> Self {
        Self {
            op: op.into(),
            properties: None,
            children: Vec::new(),
        }
    }

    pub fn scalar(op: ScalarOp) -> Self {
        Self::new(op)
    }

    pub fn physical(op: PhysicalOp) -> Self {
        Self::new(op)
    }

    pub fn with_children(mut self, children: Vec<DxlNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_properties(mut self, properties: PhysicalProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn add_child(&mut self, child: DxlNode) {
        self.children.push(child);
    }

    pub fn child(&self, index: usize) -> Option<&DxlNode> {
        self.children.get(index)
    }

    pub fn arity(&self) -> usize {
        self.children.len()
    }

    pub fn op_id(&self) -> DxlOpId {
        self.op.op_id()
    }

    pub fn is_scalar(&self) -> bool {
        self.op.is_scalar()
    }

    pub fn is_physical(&self) -> bool {
        self.op.is_physical()
    }

    /// Number of nodes in the tree, including nested test expressions and
    /// window-frame edges.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Pre-order traversal over every node reachable from `self`.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a DxlNode)) {
        f(self);
        for nested in self.nested_nodes() {
            nested.walk(f);
        }
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Nodes held by the payload itself rather than as children.
    pub fn nested_nodes(&self) -> Vec<&DxlNode> {
        match &self.op {
            DxlOperator::Scalar(ScalarOp::SubPlan(sp)) => sp.test_expr.iter().map(|b| &**b).collect(),
            DxlOperator::Physical(PhysicalOp::Window(w)) => w
                .keys
                .iter()
                .flat_map(|k| {
                    let frame = k.frame.iter().flat_map(|f| [&f.leading, &f.trailing]);
                    k.sort_cols.iter().chain(frame)
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A complete plan as shipped between optimizer and executor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DxlPlan {
    pub id: u64,
    pub space_size: u64,
    pub root: DxlNode,
}

impl DxlPlan {
    pub fn new(id: u64, space_size: u64, root: DxlNode) -> Self {
        Self {
            id,
            space_size,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datum::Datum;
    use crate::mdid::MdId;
    use crate::scalar::{BoolExpr, BoolExprType, ConstValue, SubPlan, SubPlanType};
    use crate::physical::ResultOp;

    fn konst(v: bool) -> DxlNode {
        DxlNode::scalar(ScalarOp::ConstValue(ConstValue::new(Datum::bool(v))))
    }

    #[test]
    fn test_children_keep_order() {
        let and = DxlNode::scalar(ScalarOp::BoolExpr(BoolExpr::new(BoolExprType::And)))
            .with_children(vec![konst(true), konst(false)]);
        assert_eq!(and.arity(), 2);
        assert_eq!(and.child(1), Some(&konst(false)));
        assert_eq!(and.child(2), None);
    }

    #[test]
    fn test_node_count_includes_nested_nodes() {
        let sp = SubPlan::new(MdId::gpdb(16), SubPlanType::Any, Some(konst(true)), vec![]).unwrap();
        let node = DxlNode::scalar(ScalarOp::SubPlan(sp))
            .with_children(vec![DxlNode::physical(PhysicalOp::Result(ResultOp))]);
        assert_eq!(node.node_count(), 3);
        assert!(node.is_scalar());
        assert!(node.children[0].is_physical());
    }
}
