//! # DXL Producer (Serialization)
//!
//! This module converts a `DxlNode` tree into the DXL XML wire format. It is the
//! `SerializeToDXL` side of the codec: every operator writes one element named
//! by `op_name()`, its own attributes in a fixed order, any nested descriptor
//! elements, and then its children in order.
//!
//! ## Element Layout
//!
//! ```text
//! <dxl:OpName Attr1=".." Attr2="..">
//!   <dxl:Properties>...</dxl:Properties>     physical nodes with cost estimates
//!   <dxl:TableDescriptor>...</...>           nested descriptors, per operator
//!   child 0
//!   child 1
//!   ...
//! </dxl:OpName>
//! ```
//!
//! Optional attributes are omitted rather than written empty. A type modifier of
//! `-1` counts as absent. Costs are written with six fractional digits; other
//! floating point values use the shortest form that parses back to the same
//! value.

use crate::serializer::{ProduceError, SerializerOptions, XmlSerializer};
use crate::tokens as t;
use dxl_core::colref::{ColRef, DEFAULT_TYPE_MODIFIER, IndexDescr, TableDescr};
use dxl_core::node::{DxlNode, DxlPlan, PhysicalProperties};
use dxl_core::operator::{DxlOperator, PhysicalOp, ScalarOp};
use dxl_core::physical::{MotionKind, Window};
use tracing::debug;

/// Serialize a complete plan inside the `DXLMessage` envelope.
pub fn serialize_plan(plan: &DxlPlan, options: &SerializerOptions) -> Result<String, ProduceError> {
    let mut ser = XmlSerializer::new(options)?;
    ser.open_element(t::DXL_MESSAGE)?;
    ser.add_attribute(&format!("xmlns:{}", t::NAMESPACE_PREFIX), t::NAMESPACE_URI)?;
    ser.open_element(t::PLAN)?;
    ser.add_attribute(t::ID, plan.id)?;
    ser.add_attribute(t::SPACE_SIZE, plan.space_size)?;
    serialize_node_into(&plan.root, &mut ser)?;
    ser.close_element(t::PLAN)?;
    ser.close_element(t::DXL_MESSAGE)?;
    let xml = ser.finish()?;
    debug!(plan_id = plan.id, bytes = xml.len(), "serialized DXL plan");
    Ok(xml)
}

/// Serialize a bare operator tree without the envelope.
pub fn serialize_node(node: &DxlNode, options: &SerializerOptions) -> Result<String, ProduceError> {
    let mut ser = XmlSerializer::new(options)?;
    serialize_node_into(node, &mut ser)?;
    ser.finish()
}

/// Write one node and, recursively, its children.
pub fn serialize_node_into(node: &DxlNode, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    let name = node.op.op_name();
    ser.open_element(name)?;
    match &node.op {
        DxlOperator::Scalar(op) => serialize_scalar(op, ser)?,
        DxlOperator::Physical(op) => {
            serialize_physical_attrs(op, ser)?;
            if let Some(props) = &node.properties {
                serialize_properties(props, ser)?;
            }
            serialize_physical_nested(op, ser)?;
        }
    }
    serialize_children(node, ser)?;
    ser.close_element(name)
}

fn serialize_children(node: &DxlNode, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    for child in &node.children {
        serialize_node_into(child, ser)?;
    }
    Ok(())
}

fn add_type_modifier(ser: &mut XmlSerializer, type_mod: i32) -> Result<(), ProduceError> {
    if type_mod != DEFAULT_TYPE_MODIFIER {
        ser.add_attribute(t::TYPE_MODIFIER, type_mod)?;
    }
    Ok(())
}

fn add_colref_attrs(ser: &mut XmlSerializer, colref: &ColRef) -> Result<(), ProduceError> {
    ser.add_attribute(t::COL_ID, colref.id)?;
    ser.add_attribute(t::COL_NAME, &colref.name)?;
    ser.add_attribute(t::TYPE_MDID, colref.type_mdid)?;
    add_type_modifier(ser, colref.type_mod)
}

// ---------------------------------------------------------------------------
// Scalar operators
// ---------------------------------------------------------------------------

fn serialize_scalar(op: &ScalarOp, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    match op {
        ScalarOp::Ident(i) => {
            add_colref_attrs(ser, &i.colref)?;
            ser.add_opt_attribute(t::COLLATION, i.colref.collation)?;
        }
        ScalarOp::ConstValue(c) => {
            let d = &c.datum;
            ser.add_attribute(t::TYPE_MDID, d.type_mdid)?;
            add_type_modifier(ser, d.type_mod)?;
            ser.add_attribute(t::IS_NULL, d.is_null())?;
            ser.add_attribute(t::IS_BY_VALUE, d.by_value)?;
            ser.add_opt_attribute(t::VALUE, d.value_string())?;
            ser.add_opt_attribute(t::LINT_VALUE, d.lint_value())?;
            ser.add_opt_attribute(t::DOUBLE_VALUE, d.double_value())?;
        }
        ScalarOp::Comparison(c) => {
            ser.add_attribute(t::COMPARISON_OPERATOR, &c.op_name)?;
            ser.add_attribute(t::OPERATOR_MDID, c.op_mdid)?;
        }
        ScalarOp::DistinctComparison(d) => ser.add_attribute(t::OPERATOR_MDID, d.op_mdid)?,
        ScalarOp::OpExpr(o) => {
            ser.add_attribute(t::OPERATOR_NAME, &o.op_name)?;
            ser.add_attribute(t::OPERATOR_MDID, o.op_mdid)?;
            ser.add_opt_attribute(t::OPERATOR_TYPE, o.return_type)?;
        }
        ScalarOp::ArrayComp(a) => {
            ser.add_attribute(t::OPERATOR_NAME, &a.op_name)?;
            ser.add_attribute(t::OPERATOR_MDID, a.op_mdid)?;
            ser.add_attribute(t::OPERATOR_TYPE, a.comp_type.name())?;
        }
        ScalarOp::NullIf(n) => {
            ser.add_attribute(t::OPERATOR_MDID, n.op_mdid)?;
            ser.add_attribute(t::TYPE_MDID, n.type_mdid)?;
        }
        ScalarOp::Cast(c) => {
            ser.add_attribute(t::TYPE_MDID, c.type_mdid)?;
            ser.add_attribute(t::FUNC_ID, c.func_mdid)?;
        }
        ScalarOp::Coerce(c) => {
            ser.add_attribute(t::TYPE_MDID, c.type_mdid)?;
            ser.add_attribute(t::TYPE_MODIFIER, c.type_mod)?;
            ser.add_attribute(t::COERCION_FORM, c.coercion_form.code())?;
            ser.add_attribute(t::LOCATION, c.location)?;
        }
        ScalarOp::ArrayCoerceExpr(a) => {
            ser.add_attribute(t::ELEMENT_FUNC, a.element_func)?;
            ser.add_attribute(t::TYPE_MDID, a.type_mdid)?;
            ser.add_attribute(t::TYPE_MODIFIER, a.type_mod)?;
            ser.add_attribute(t::IS_EXPLICIT, a.is_explicit)?;
            ser.add_attribute(t::COERCION_FORM, a.coercion_form.code())?;
            ser.add_attribute(t::LOCATION, a.location)?;
        }
        ScalarOp::FuncExpr(f) => {
            ser.add_attribute(t::FUNC_ID, f.func_mdid)?;
            ser.add_attribute(t::FUNC_RET_SET, f.returns_set)?;
            ser.add_attribute(t::TYPE_MDID, f.return_type)?;
            add_type_modifier(ser, f.type_mod)?;
        }
        ScalarOp::Aggref(a) => {
            ser.add_attribute(t::AGG_MDID, a.agg_mdid)?;
            ser.add_attribute(t::AGG_DISTINCT, a.distinct)?;
            ser.add_attribute(t::AGG_STAGE, a.stage.name())?;
            ser.add_opt_attribute(t::TYPE_MDID, a.resolved_return_type)?;
        }
        ScalarOp::WindowRef(w) => {
            ser.add_attribute(t::MDID, w.func_mdid)?;
            ser.add_attribute(t::TYPE_MDID, w.return_type)?;
            ser.add_attribute(t::DISTINCT, w.distinct)?;
            ser.add_attribute(t::WINDOW_STAR_ARG, w.star_arg)?;
            ser.add_attribute(t::WINDOW_SIMPLE_AGG, w.simple_agg)?;
            ser.add_attribute(t::WINDOW_STRATEGY, w.stage.name())?;
            ser.add_attribute(t::WIN_SPEC_POS, w.win_spec_pos)?;
        }
        ScalarOp::IfStmt(x) => ser.add_attribute(t::TYPE_MDID, x.type_mdid)?,
        ScalarOp::Switch(x) => ser.add_attribute(t::TYPE_MDID, x.type_mdid)?,
        ScalarOp::CaseTest(x) => ser.add_attribute(t::TYPE_MDID, x.type_mdid)?,
        ScalarOp::Coalesce(x) => ser.add_attribute(t::TYPE_MDID, x.type_mdid)?,
        ScalarOp::MinMax(x) => ser.add_attribute(t::TYPE_MDID, x.type_mdid)?,
        ScalarOp::HashExpr(x) => ser.add_attribute(t::TYPE_MDID, x.type_mdid)?,
        ScalarOp::BitmapBoolOp(x) => ser.add_attribute(t::TYPE_MDID, x.type_mdid)?,
        ScalarOp::Array(a) => {
            ser.add_attribute(t::ELEMENT_TYPE, a.elem_type)?;
            ser.add_attribute(t::ARRAY_TYPE, a.array_type)?;
            ser.add_attribute(t::MULTI_DIMENSIONAL, a.multi_dimensional)?;
        }
        ScalarOp::ArrayRef(a) => {
            ser.add_attribute(t::ELEMENT_TYPE, a.elem_type)?;
            add_type_modifier(ser, a.type_mod)?;
            ser.add_attribute(t::ARRAY_TYPE, a.array_type)?;
            ser.add_attribute(t::TYPE_MDID, a.return_type)?;
        }
        ScalarOp::ArrayRefIndexList(l) => ser.add_attribute(t::INDEX_LIST_BOUND, l.bound.name())?,
        ScalarOp::SubPlan(sp) => {
            ser.add_attribute(t::TYPE_MDID, sp.type_mdid)?;
            ser.add_attribute(t::SUB_PLAN_TYPE, sp.subplan_type.name())?;
            if let Some(test) = &sp.test_expr {
                ser.open_element(t::TEST_EXPR)?;
                serialize_node_into(test, ser)?;
                ser.close_element(t::TEST_EXPR)?;
            }
            ser.open_element(t::PARAM_LIST)?;
            for param in &sp.params {
                ser.open_element(t::PARAM)?;
                add_colref_attrs(ser, param)?;
                ser.close_element(t::PARAM)?;
            }
            ser.close_element(t::PARAM_LIST)?;
        }
        ScalarOp::ProjElem(p) => {
            ser.add_attribute(t::COL_ID, p.col_id)?;
            ser.add_attribute(t::ALIAS, &p.alias)?;
        }
        ScalarOp::SortCol(s) => {
            ser.add_attribute(t::COL_ID, s.col_id)?;
            ser.add_attribute(t::SORT_OPERATOR_MDID, s.sort_op_mdid)?;
            ser.add_attribute(t::SORT_OPERATOR_NAME, &s.sort_op_name)?;
            ser.add_attribute(t::SORT_NULLS_FIRST, s.nulls_first)?;
        }
        ScalarOp::WindowFrameEdge(e) => ser.add_attribute(t::FRAME_BOUNDARY, e.boundary.name())?,
        ScalarOp::PartBound(p) => {
            ser.add_attribute(t::LEVEL, p.level)?;
            ser.add_attribute(t::TYPE_MDID, p.type_mdid)?;
            ser.add_attribute(t::IS_LOWER_BOUND, p.is_lower)?;
        }
        ScalarOp::PartBoundInclusion(p) => {
            ser.add_attribute(t::LEVEL, p.level)?;
            ser.add_attribute(t::IS_LOWER_BOUND, p.is_lower)?;
        }
        ScalarOp::PartBoundOpen(p) => {
            ser.add_attribute(t::LEVEL, p.level)?;
            ser.add_attribute(t::IS_LOWER_BOUND, p.is_lower)?;
        }
        ScalarOp::PartDefault(p) => ser.add_attribute(t::LEVEL, p.level)?,
        ScalarOp::PartOid(p) => ser.add_attribute(t::LEVEL, p.level)?,
        ScalarOp::PartListValues(p) => {
            ser.add_attribute(t::LEVEL, p.level)?;
            ser.add_attribute(t::RESULT_TYPE, p.result_type)?;
            ser.add_attribute(t::ELEMENT_TYPE, p.elem_type)?;
        }
        ScalarOp::PartListNullTest(p) => {
            ser.add_attribute(t::LEVEL, p.level)?;
            ser.add_attribute(t::IS_NULL, p.is_null)?;
        }
        ScalarOp::BitmapIndexProbe(b) => serialize_index_descr(&b.index, ser)?,
        ScalarOp::AssertConstraint(a) => ser.add_attribute(t::ERROR_MESSAGE, &a.error_message)?,
        ScalarOp::BoolExpr(_)
        | ScalarOp::BooleanTest(_)
        | ScalarOp::NullTest(_)
        | ScalarOp::SwitchCase(_)
        | ScalarOp::ProjList(_)
        | ScalarOp::Filter(_)
        | ScalarOp::CondList(_)
        | ScalarOp::HashExprList(_)
        | ScalarOp::SortColList(_)
        | ScalarOp::LimitCount(_)
        | ScalarOp::LimitOffset(_)
        | ScalarOp::AssertConstraintList(_)
        | ScalarOp::DmlAction(_)
        | ScalarOp::ValuesList(_) => {}
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Physical operators
// ---------------------------------------------------------------------------

fn serialize_physical_attrs(op: &PhysicalOp, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    match op {
        PhysicalOp::DynamicTableScan(d) => ser.add_list_attribute(t::SELECTOR_IDS, &d.selector_ids)?,
        PhysicalOp::IndexScan(i) => ser.add_attribute(t::INDEX_SCAN_DIRECTION, i.direction.name())?,
        PhysicalOp::HashJoin(j) => ser.add_attribute(t::JOIN_TYPE, j.join_type.name())?,
        PhysicalOp::NestedLoopJoin(j) => {
            ser.add_attribute(t::JOIN_TYPE, j.join_type.name())?;
            ser.add_attribute(t::INDEX_NESTED_LOOP_JOIN, j.index_nlj)?;
        }
        PhysicalOp::MergeJoin(j) => {
            ser.add_attribute(t::JOIN_TYPE, j.join_type.name())?;
            ser.add_attribute(t::UNIQUE_OUTER, j.unique_outer)?;
        }
        PhysicalOp::Motion(m) => {
            ser.add_list_attribute(t::INPUT_SEGMENTS, &m.input_segments)?;
            ser.add_list_attribute(t::OUTPUT_SEGMENTS, &m.output_segments)?;
            match m.kind {
                MotionKind::Redistribute {
                    duplicate_sensitive,
                } => ser.add_attribute(t::DUPLICATE_SENSITIVE, duplicate_sensitive)?,
                MotionKind::RoutedDistribute { segment_id_col } => {
                    ser.add_attribute(t::SEGMENT_ID_COL, segment_id_col)?
                }
                MotionKind::Gather | MotionKind::Broadcast | MotionKind::Random => {}
            }
        }
        PhysicalOp::Append(a) => {
            ser.add_attribute(t::IS_TARGET, a.is_target)?;
            ser.add_attribute(t::IS_ZAPPED, a.is_zapped)?;
        }
        PhysicalOp::Aggregate(a) => {
            ser.add_attribute(t::AGGREGATION_STRATEGY, a.strategy.name())?;
            ser.add_attribute(t::STREAM_SAFE, a.stream_safe)?;
        }
        PhysicalOp::Sort(s) => ser.add_attribute(t::SORT_DISCARD_DUPLICATES, s.discard_duplicates)?,
        PhysicalOp::Materialize(m) => ser.add_attribute(t::EAGER, m.eager)?,
        PhysicalOp::PartitionSelector(p) => {
            ser.add_attribute(t::RELATION_MDID, p.relation_mdid)?;
            ser.add_attribute(t::SELECTOR_ID, p.selector_id)?;
            ser.add_attribute(t::SCAN_ID, p.scan_id)?;
            ser.add_list_attribute(t::PARTITIONS, &p.partitions)?;
        }
        PhysicalOp::Window(w) => ser.add_list_attribute(t::PARTITION_COLUMNS, &w.partition_cols)?,
        PhysicalOp::SubqueryScan(s) => ser.add_attribute(t::ALIAS, &s.alias)?,
        PhysicalOp::Assert(a) => ser.add_attribute(t::ERROR_CODE, &a.error_code)?,
        PhysicalOp::CteProducer(c) => {
            ser.add_attribute(t::CTE_ID, c.cte_id)?;
            ser.add_list_attribute(t::CTE_COLUMNS, &c.col_ids)?;
        }
        PhysicalOp::CteConsumer(c) => {
            ser.add_attribute(t::CTE_ID, c.cte_id)?;
            ser.add_list_attribute(t::CTE_COLUMNS, &c.col_ids)?;
        }
        PhysicalOp::TableValuedFunction(f) => {
            ser.add_attribute(t::FUNC_ID, f.func_mdid)?;
            ser.add_attribute(t::TYPE_MDID, f.return_type)?;
            ser.add_attribute(t::NAME, &f.name)?;
        }
        PhysicalOp::TableScan(_)
        | PhysicalOp::BitmapTableScan(_)
        | PhysicalOp::Result(_)
        | PhysicalOp::Limit(_)
        | PhysicalOp::Sequence(_) => {}
    }
    Ok(())
}

fn serialize_physical_nested(op: &PhysicalOp, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    match op {
        PhysicalOp::TableScan(s) => serialize_table_descr(&s.table, ser),
        PhysicalOp::DynamicTableScan(s) => serialize_table_descr(&s.table, ser),
        PhysicalOp::BitmapTableScan(s) => serialize_table_descr(&s.table, ser),
        PhysicalOp::IndexScan(s) => {
            serialize_index_descr(&s.index, ser)?;
            serialize_table_descr(&s.table, ser)
        }
        PhysicalOp::Aggregate(a) => {
            ser.open_element(t::GROUPING_COLUMNS)?;
            for col in &a.grouping_cols {
                ser.open_element(t::GROUPING_COLUMN)?;
                ser.add_attribute(t::COL_ID, col)?;
                ser.close_element(t::GROUPING_COLUMN)?;
            }
            ser.close_element(t::GROUPING_COLUMNS)
        }
        PhysicalOp::Window(w) => serialize_window_keys(w, ser),
        _ => Ok(()),
    }
}

fn serialize_properties(props: &PhysicalProperties, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    ser.open_element(t::PROPERTIES)?;
    ser.open_element(t::COST)?;
    ser.add_attribute(t::STARTUP_COST, format!("{:.6}", props.startup_cost.0))?;
    ser.add_attribute(t::TOTAL_COST, format!("{:.6}", props.total_cost.0))?;
    ser.add_attribute(t::ROWS, format!("{:.6}", props.rows.0))?;
    ser.add_attribute(t::WIDTH, format!("{:.6}", props.width.0))?;
    ser.close_element(t::COST)?;
    ser.close_element(t::PROPERTIES)
}

fn serialize_table_descr(table: &TableDescr, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    ser.open_element(t::TABLE_DESCRIPTOR)?;
    ser.add_attribute(t::MDID, table.mdid)?;
    ser.add_attribute(t::TABLE_NAME, &table.name)?;
    ser.add_opt_attribute(t::EXECUTE_AS_USER, table.execute_as_user)?;
    ser.open_element(t::COLUMNS)?;
    for col in &table.columns {
        ser.open_element(t::COLUMN)?;
        ser.add_attribute(t::COL_ID, col.colref.id)?;
        ser.add_attribute(t::ATTNO, col.attno)?;
        ser.add_attribute(t::COL_NAME, &col.colref.name)?;
        ser.add_attribute(t::TYPE_MDID, col.colref.type_mdid)?;
        add_type_modifier(ser, col.colref.type_mod)?;
        ser.add_opt_attribute(t::COL_WIDTH, col.width)?;
        if col.is_dropped {
            ser.add_attribute(t::IS_DROPPED, true)?;
        }
        ser.close_element(t::COLUMN)?;
    }
    ser.close_element(t::COLUMNS)?;
    ser.close_element(t::TABLE_DESCRIPTOR)
}

fn serialize_index_descr(index: &IndexDescr, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    ser.open_element(t::INDEX_DESCRIPTOR)?;
    ser.add_attribute(t::MDID, index.mdid)?;
    ser.add_attribute(t::INDEX_NAME, &index.name)?;
    ser.close_element(t::INDEX_DESCRIPTOR)
}

fn serialize_window_keys(window: &Window, ser: &mut XmlSerializer) -> Result<(), ProduceError> {
    ser.open_element(t::WINDOW_KEY_LIST)?;
    for key in &window.keys {
        ser.open_element(t::WINDOW_KEY)?;
        if let Some(sort) = &key.sort_cols {
            serialize_node_into(sort, ser)?;
        }
        if let Some(frame) = &key.frame {
            ser.open_element(t::WINDOW_FRAME)?;
            ser.add_attribute(t::FRAME_SPEC, frame.spec.name())?;
            ser.add_attribute(t::EXCLUSION_STRATEGY, frame.exclusion.name())?;
            serialize_node_into(&frame.leading, ser)?;
            serialize_node_into(&frame.trailing, ser)?;
            ser.close_element(t::WINDOW_FRAME)?;
        }
        ser.close_element(t::WINDOW_KEY)?;
    }
    ser.close_element(t::WINDOW_KEY_LIST)
}
