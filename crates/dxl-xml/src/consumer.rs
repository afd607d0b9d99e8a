//! # DXL Consumer (Deserialization)
//!
//! This module is the parse-handler side of the codec: it turns DXL XML back into
//! a `DxlNode` tree that serializes to the same bytes it was read from.
//!
//! ```text
//! DXL XML text
//!   -> read_tree()          quick-xml events folded into an element tree
//!   -> Consumer::node()     element name selects the operator,
//!                           attributes and nested elements build its payload,
//!                           remaining child elements become child nodes
//!   -> DxlNode / DxlPlan
//! ```
//!
//! ## Strictness
//!
//! Unknown elements, unknown enum strings, missing required attributes and
//! malformed metadata ids are rejected with a `ConsumeError` naming the attribute
//! and the element. Operator constructors run on every parsed node, so an invalid
//! metadata id in a mandatory position surfaces as `ConsumeError::Dxl`.
//! Structural rules that span several nodes (arity, child kinds) are left to the
//! validation pass.
//!
//! ## Column References
//!
//! A plan names each column once in the query-wide column-id namespace. The
//! consumer keeps a registry keyed by column id so a table descriptor column, the
//! `Ident` nodes that reference it and sub-plan parameters share one
//! `Arc<ColRef>`.

use crate::tokens as t;
use dxl_core::colref::{ColRef, ColumnDescr, IndexDescr, TableDescr, DEFAULT_TYPE_MODIFIER};
use dxl_core::datum::Datum;
use dxl_core::error::DxlError;
use dxl_core::mdid::MdId;
use dxl_core::node::{DxlNode, DxlPlan, PhysicalProperties};
use dxl_core::operator::{DxlOpId, PhysicalOp, ScalarOp};
use dxl_core::physical::*;
use dxl_core::scalar::*;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, trace};

/// Errors that can occur while reading DXL.
#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unknown DXL element {0}")]
    UnknownElement(String),

    #[error("missing attribute {attr} in element {element}")]
    MissingAttribute { attr: String, element: String },

    #[error("invalid value '{value}' for attribute {attr} in element {element}")]
    InvalidAttribute {
        attr: String,
        element: String,
        value: String,
    },

    #[error("unexpected DXL structure: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Dxl(#[from] DxlError),

    #[error("empty DXL document")]
    Empty,
}

/// Result of [`parse_dxl`]: a full plan message or a bare operator tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDxl {
    Plan(DxlPlan),
    Fragment(DxlNode),
}

impl ParsedDxl {
    pub fn root(&self) -> &DxlNode {
        match self {
            ParsedDxl::Plan(plan) => &plan.root,
            ParsedDxl::Fragment(node) => node,
        }
    }
}

/// Parse a `DXLMessage` document holding one plan.
pub fn parse_plan(xml: &str) -> Result<DxlPlan, ConsumeError> {
    let root = read_tree(xml)?;
    let plan = Consumer::default().plan(&root)?;
    debug!(plan_id = plan.id, nodes = plan.root.node_count(), "parsed DXL plan");
    Ok(plan)
}

/// Parse a document whose root element is an operator.
pub fn parse_node(xml: &str) -> Result<DxlNode, ConsumeError> {
    let root = read_tree(xml)?;
    Consumer::default().node(&root)
}

/// Parse either form, deciding by the root element.
pub fn parse_dxl(xml: &str) -> Result<ParsedDxl, ConsumeError> {
    let root = read_tree(xml)?;
    let mut consumer = Consumer::default();
    if root.name == t::DXL_MESSAGE {
        Ok(ParsedDxl::Plan(consumer.plan(&root)?))
    } else {
        Ok(ParsedDxl::Fragment(consumer.node(&root)?))
    }
}

// ---------------------------------------------------------------------------
// Element tree
// ---------------------------------------------------------------------------

/// One XML element with its namespace prefix stripped.
#[derive(Debug, Clone, PartialEq)]
struct Element {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    fn from_start(start: &BytesStart<'_>) -> Result<Self, ConsumeError> {
        let qname_bytes = start.name();
        let qname = utf8(qname_bytes.as_ref())?;
        let name = match qname.split_once(':') {
            Some((_, local)) => local.to_string(),
            None => qname.to_string(),
        };
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = utf8(attr.key.as_ref())?;
            if key == "xmlns" || key.starts_with("xmlns:") {
                continue;
            }
            attrs.push((key.to_string(), attr.unescape_value()?.into_owned()));
        }
        Ok(Self {
            name,
            attrs,
            children: Vec::new(),
        })
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn required(&self, name: &str) -> Result<&str, ConsumeError> {
        self.attr(name).ok_or_else(|| ConsumeError::MissingAttribute {
            attr: name.to_string(),
            element: self.name.clone(),
        })
    }

    fn invalid(&self, name: &str, value: &str) -> ConsumeError {
        ConsumeError::InvalidAttribute {
            attr: name.to_string(),
            element: self.name.clone(),
            value: value.to_string(),
        }
    }

    fn parse<T: FromStr>(&self, name: &str) -> Result<T, ConsumeError> {
        let raw = self.required(name)?;
        raw.parse().map_err(|_| self.invalid(name, raw))
    }

    fn parse_opt<T: FromStr>(&self, name: &str) -> Result<Option<T>, ConsumeError> {
        match self.attr(name) {
            Some(raw) => raw.parse().map(Some).map_err(|_| self.invalid(name, raw)),
            None => Ok(None),
        }
    }

    fn type_modifier(&self) -> Result<i32, ConsumeError> {
        Ok(self.parse_opt(t::TYPE_MODIFIER)?.unwrap_or(DEFAULT_TYPE_MODIFIER))
    }

    /// Comma-separated list; the empty string is the empty list.
    fn parse_list<T: FromStr>(&self, name: &str) -> Result<Vec<T>, ConsumeError> {
        let raw = self.required(name)?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        raw.split(',')
            .map(|item| item.parse().map_err(|_| self.invalid(name, raw)))
            .collect()
    }

    fn parse_enum<T>(&self, name: &str, lookup: fn(&str) -> Option<T>) -> Result<T, ConsumeError> {
        let raw = self.required(name)?;
        lookup(raw).ok_or_else(|| self.invalid(name, raw))
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ConsumeError> {
    std::str::from_utf8(bytes).map_err(|e| ConsumeError::Unexpected(format!("non UTF-8 name: {}", e)))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, elem: Element) -> Result<(), ConsumeError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(elem),
        None if root.is_none() => *root = Some(elem),
        None => {
            return Err(ConsumeError::Unexpected(format!(
                "second root element {}",
                elem.name
            )))
        }
    }
    Ok(())
}

fn read_tree(xml: &str) -> Result<Element, ConsumeError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;
    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let elem = Element::from_start(&start)?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::End(_) => {
                let elem = stack
                    .pop()
                    .ok_or_else(|| ConsumeError::Unexpected("unbalanced end tag".into()))?;
                attach(&mut stack, &mut root, elem)?;
            }
            Event::Text(text) => {
                let text = text.unescape()?;
                if !text.trim().is_empty() {
                    return Err(ConsumeError::Unexpected(format!(
                        "text content '{}'",
                        text.trim()
                    )));
                }
            }
            Event::CData(_) => return Err(ConsumeError::Unexpected("CDATA section".into())),
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }
    if let Some(open) = stack.last() {
        return Err(ConsumeError::Unexpected(format!("unclosed element {}", open.name)));
    }
    root.ok_or(ConsumeError::Empty)
}

/// Walks the child elements of one element, consuming nested descriptor
/// elements from the front before the operator children.
struct Cursor<'a> {
    elem: &'a Element,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(elem: &'a Element) -> Self {
        Self { elem, pos: 0 }
    }

    fn take(&mut self, name: &str) -> Option<&'a Element> {
        match self.elem.children.get(self.pos) {
            Some(child) if child.name == name => {
                self.pos += 1;
                Some(child)
            }
            _ => None,
        }
    }

    fn expect(&mut self, name: &str) -> Result<&'a Element, ConsumeError> {
        self.take(name).ok_or_else(|| {
            ConsumeError::Unexpected(format!("{} requires a nested {} element", self.elem.name, name))
        })
    }

    fn rest(&self) -> &'a [Element] {
        self.elem.children.get(self.pos..).unwrap_or(&[])
    }
}

fn is_physical_element(name: &str) -> bool {
    DxlOpId::ALL
        .iter()
        .filter(|id| id.is_physical())
        .any(|id| id.element_names().contains(&name))
}

// ---------------------------------------------------------------------------
// Consumer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Consumer {
    colrefs: HashMap<u32, Arc<ColRef>>,
}

impl Consumer {
    fn plan(&mut self, root: &Element) -> Result<DxlPlan, ConsumeError> {
        if root.name != t::DXL_MESSAGE {
            return Err(ConsumeError::Unexpected(format!(
                "expected {} root, found {}",
                t::DXL_MESSAGE,
                root.name
            )));
        }
        let plan = match root.children.as_slice() {
            [plan] if plan.name == t::PLAN => plan,
            _ => {
                return Err(ConsumeError::Unexpected(format!(
                    "{} must contain exactly one {} element",
                    t::DXL_MESSAGE,
                    t::PLAN
                )))
            }
        };
        let tree = match plan.children.as_slice() {
            [tree] => self.node(tree)?,
            other => {
                return Err(ConsumeError::Unexpected(format!(
                    "{} must contain exactly one operator, found {}",
                    t::PLAN,
                    other.len()
                )))
            }
        };
        Ok(DxlPlan::new(plan.parse(t::ID)?, plan.parse(t::SPACE_SIZE)?, tree))
    }

    fn node(&mut self, elem: &Element) -> Result<DxlNode, ConsumeError> {
        let mut cursor = Cursor::new(elem);
        let mut node = if is_physical_element(&elem.name) {
            let properties = match cursor.take(t::PROPERTIES) {
                Some(props) => Some(parse_properties(props)?),
                None => None,
            };
            let op = self.physical(elem, &mut cursor)?;
            let node = DxlNode::physical(op);
            match properties {
                Some(props) => node.with_properties(props),
                None => node,
            }
        } else {
            DxlNode::scalar(self.scalar(elem, &mut cursor)?)
        };
        for child in cursor.rest() {
            node.add_child(self.node(child)?);
        }
        trace!(element = %elem.name, children = node.arity(), "consumed DXL node");
        Ok(node)
    }

    /// Return the registered column for `colref.id` when it describes the same
    /// column, registering it otherwise.
    fn intern_colref(&mut self, colref: Arc<ColRef>) -> Arc<ColRef> {
        match self.colrefs.get(&colref.id) {
            Some(known) if **known == *colref => Arc::clone(known),
            Some(_) => colref,
            None => {
                self.colrefs.insert(colref.id, Arc::clone(&colref));
                colref
            }
        }
    }

    fn colref(&mut self, elem: &Element, collation: Option<MdId>) -> Result<Arc<ColRef>, ConsumeError> {
        let colref = ColRef::with_modifier(
            elem.parse(t::COL_ID)?,
            elem.required(t::COL_NAME)?,
            elem.parse(t::TYPE_MDID)?,
            elem.type_modifier()?,
            collation,
        )?;
        Ok(self.intern_colref(colref))
    }

    fn single_scalar_child(&mut self, elem: &Element) -> Result<DxlNode, ConsumeError> {
        match elem.children.as_slice() {
            [child] => self.node(child),
            other => Err(ConsumeError::Unexpected(format!(
                "{} must contain exactly one expression, found {}",
                elem.name,
                other.len()
            ))),
        }
    }

    fn scalar(&mut self, elem: &Element, cursor: &mut Cursor<'_>) -> Result<ScalarOp, ConsumeError> {
        let name = elem.name.as_str();
        if let Some(bool_type) = BoolExprType::from_name(name) {
            return Ok(ScalarOp::BoolExpr(BoolExpr::new(bool_type)));
        }
        if let Some(test) = BooleanTestType::from_name(name) {
            return Ok(ScalarOp::BooleanTest(BooleanTest::new(test)));
        }
        if let Some(kind) = FilterKind::from_name(name) {
            return Ok(ScalarOp::Filter(Filter::new(kind)));
        }
        if let Some(kind) = CondListKind::from_name(name) {
            return Ok(ScalarOp::CondList(CondList::new(kind)));
        }
        if let Some(kind) = CoerceKind::from_name(name) {
            return Ok(ScalarOp::Coerce(Coerce::new(
                kind,
                elem.parse(t::TYPE_MDID)?,
                elem.parse(t::TYPE_MODIFIER)?,
                parse_coercion_form(elem)?,
                elem.parse(t::LOCATION)?,
            )?));
        }
        if let Some(kind) = MinMaxType::from_name(name) {
            return Ok(ScalarOp::MinMax(MinMax::new(kind, elem.parse(t::TYPE_MDID)?)?));
        }
        if let Some(op) = BitmapOpType::from_name(name) {
            return Ok(ScalarOp::BitmapBoolOp(BitmapBoolOp::new(
                op,
                elem.parse(t::TYPE_MDID)?,
            )?));
        }

        let op = match name {
            "Ident" => {
                let collation = elem.parse_opt(t::COLLATION)?;
                ScalarOp::Ident(Ident::new(self.colref(elem, collation)?))
            }
            "ConstValue" => ScalarOp::ConstValue(ConstValue::new(Datum::decode(
                elem.parse(t::TYPE_MDID)?,
                elem.type_modifier()?,
                elem.parse(t::IS_NULL)?,
                elem.parse(t::IS_BY_VALUE)?,
                elem.attr(t::VALUE),
                elem.parse_opt(t::LINT_VALUE)?,
                elem.parse_opt(t::DOUBLE_VALUE)?,
            )?)),
            "Comparison" => ScalarOp::Comparison(Comparison::new(
                elem.required(t::COMPARISON_OPERATOR)?,
                elem.parse(t::OPERATOR_MDID)?,
            )?),
            "IsDistinctFrom" => {
                ScalarOp::DistinctComparison(DistinctComparison::new(elem.parse(t::OPERATOR_MDID)?)?)
            }
            "OpExpr" => ScalarOp::OpExpr(OpExpr::new(
                elem.required(t::OPERATOR_NAME)?,
                elem.parse(t::OPERATOR_MDID)?,
                elem.parse_opt(t::OPERATOR_TYPE)?,
            )?),
            "ArrayComp" => ScalarOp::ArrayComp(ArrayComp::new(
                elem.required(t::OPERATOR_NAME)?,
                elem.parse(t::OPERATOR_MDID)?,
                elem.parse_enum(t::OPERATOR_TYPE, ArrayCompType::from_name)?,
            )?),
            "IsNull" => ScalarOp::NullTest(NullTest::new(true)),
            "IsNotNull" => ScalarOp::NullTest(NullTest::new(false)),
            "NullIf" => ScalarOp::NullIf(NullIf::new(
                elem.parse(t::OPERATOR_MDID)?,
                elem.parse(t::TYPE_MDID)?,
            )?),
            "Cast" => ScalarOp::Cast(Cast::new(elem.parse(t::TYPE_MDID)?, elem.parse(t::FUNC_ID)?)?),
            "ArrayCoerceExpr" => ScalarOp::ArrayCoerceExpr(ArrayCoerceExpr::new(
                elem.parse(t::ELEMENT_FUNC)?,
                elem.parse(t::TYPE_MDID)?,
                elem.parse(t::TYPE_MODIFIER)?,
                elem.parse(t::IS_EXPLICIT)?,
                parse_coercion_form(elem)?,
                elem.parse(t::LOCATION)?,
            )?),
            "FuncExpr" => ScalarOp::FuncExpr(FuncExpr::new(
                elem.parse(t::FUNC_ID)?,
                elem.parse(t::TYPE_MDID)?,
                elem.type_modifier()?,
                elem.parse(t::FUNC_RET_SET)?,
            )?),
            "AggFunc" => ScalarOp::Aggref(Aggref::new(
                elem.parse(t::AGG_MDID)?,
                elem.parse_opt(t::TYPE_MDID)?,
                elem.parse(t::AGG_DISTINCT)?,
                elem.parse_enum(t::AGG_STAGE, AggStage::from_name)?,
            )?),
            "WindowFunc" => ScalarOp::WindowRef(WindowRef::new(
                elem.parse(t::MDID)?,
                elem.parse(t::TYPE_MDID)?,
                elem.parse(t::DISTINCT)?,
                elem.parse(t::WINDOW_STAR_ARG)?,
                elem.parse(t::WINDOW_SIMPLE_AGG)?,
                elem.parse_enum(t::WINDOW_STRATEGY, WindowStage::from_name)?,
                elem.parse(t::WIN_SPEC_POS)?,
            )?),
            "If" => ScalarOp::IfStmt(IfStmt::new(elem.parse(t::TYPE_MDID)?)?),
            "Switch" => ScalarOp::Switch(Switch::new(elem.parse(t::TYPE_MDID)?)?),
            "SwitchCase" => ScalarOp::SwitchCase(SwitchCase),
            "CaseTest" => ScalarOp::CaseTest(CaseTest::new(elem.parse(t::TYPE_MDID)?)?),
            "Coalesce" => ScalarOp::Coalesce(Coalesce::new(elem.parse(t::TYPE_MDID)?)?),
            "Array" => ScalarOp::Array(Array::new(
                elem.parse(t::ELEMENT_TYPE)?,
                elem.parse(t::ARRAY_TYPE)?,
                elem.parse(t::MULTI_DIMENSIONAL)?,
            )?),
            "ArrayRef" => ScalarOp::ArrayRef(ArrayRef::new(
                elem.parse(t::ELEMENT_TYPE)?,
                elem.type_modifier()?,
                elem.parse(t::ARRAY_TYPE)?,
                elem.parse(t::TYPE_MDID)?,
            )?),
            "ArrayIndexList" => ScalarOp::ArrayRefIndexList(ArrayRefIndexList::new(
                elem.parse_enum(t::INDEX_LIST_BOUND, IndexListBound::from_name)?,
            )),
            "SubPlan" => {
                let test_expr = match cursor.take(t::TEST_EXPR) {
                    Some(test) => Some(self.single_scalar_child(test)?),
                    None => None,
                };
                let mut params = Vec::new();
                if let Some(list) = cursor.take(t::PARAM_LIST) {
                    for param in &list.children {
                        if param.name != t::PARAM {
                            return Err(ConsumeError::UnknownElement(param.name.clone()));
                        }
                        params.push(self.colref(param, None)?);
                    }
                }
                ScalarOp::SubPlan(SubPlan::new(
                    elem.parse(t::TYPE_MDID)?,
                    elem.parse_enum(t::SUB_PLAN_TYPE, SubPlanType::from_name)?,
                    test_expr,
                    params,
                )?)
            }
            "ProjList" => ScalarOp::ProjList(ProjList),
            "ProjElem" => ScalarOp::ProjElem(ProjElem::new(
                elem.parse(t::COL_ID)?,
                elem.required(t::ALIAS)?,
            )),
            "HashExprList" => ScalarOp::HashExprList(HashExprList),
            "HashExpr" => ScalarOp::HashExpr(HashExpr::new(elem.parse(t::TYPE_MDID)?)?),
            "SortingColumnList" => ScalarOp::SortColList(SortColList),
            "SortingColumn" => ScalarOp::SortCol(SortCol::new(
                elem.parse(t::COL_ID)?,
                elem.parse(t::SORT_OPERATOR_MDID)?,
                elem.required(t::SORT_OPERATOR_NAME)?,
                elem.parse(t::SORT_NULLS_FIRST)?,
            )?),
            "LimitCount" => ScalarOp::LimitCount(LimitCount),
            "LimitOffset" => ScalarOp::LimitOffset(LimitOffset),
            "LeadingEdge" | "TrailingEdge" => ScalarOp::WindowFrameEdge(WindowFrameEdge::new(
                name == "LeadingEdge",
                elem.parse_enum(t::FRAME_BOUNDARY, FrameBoundary::from_name)?,
            )),
            "PartBound" => ScalarOp::PartBound(PartBound::new(
                elem.parse(t::LEVEL)?,
                elem.parse(t::TYPE_MDID)?,
                elem.parse(t::IS_LOWER_BOUND)?,
            )?),
            "PartBoundInclusion" => ScalarOp::PartBoundInclusion(PartBoundInclusion {
                level: elem.parse(t::LEVEL)?,
                is_lower: elem.parse(t::IS_LOWER_BOUND)?,
            }),
            "PartBoundOpen" => ScalarOp::PartBoundOpen(PartBoundOpen {
                level: elem.parse(t::LEVEL)?,
                is_lower: elem.parse(t::IS_LOWER_BOUND)?,
            }),
            "DefaultPart" => ScalarOp::PartDefault(PartDefault {
                level: elem.parse(t::LEVEL)?,
            }),
            "PartOid" => ScalarOp::PartOid(PartOid {
                level: elem.parse(t::LEVEL)?,
            }),
            "PartListValues" => ScalarOp::PartListValues(PartListValues::new(
                elem.parse(t::LEVEL)?,
                elem.parse(t::RESULT_TYPE)?,
                elem.parse(t::ELEMENT_TYPE)?,
            )?),
            "PartListNullTest" => ScalarOp::PartListNullTest(PartListNullTest {
                level: elem.parse(t::LEVEL)?,
                is_null: elem.parse(t::IS_NULL)?,
            }),
            "BitmapIndexProbe" => ScalarOp::BitmapIndexProbe(BitmapIndexProbe::new(
                parse_index_descr(cursor.expect(t::INDEX_DESCRIPTOR)?)?,
            )),
            "AssertConstraintList" => ScalarOp::AssertConstraintList(AssertConstraintList),
            "AssertConstraint" => {
                ScalarOp::AssertConstraint(AssertConstraint::new(elem.required(t::ERROR_MESSAGE)?))
            }
            "DMLAction" => ScalarOp::DmlAction(DmlAction),
            "ValuesList" => ScalarOp::ValuesList(ValuesList),
            other => return Err(ConsumeError::UnknownElement(other.to_string())),
        };
        Ok(op)
    }

    fn physical(&mut self, elem: &Element, cursor: &mut Cursor<'_>) -> Result<PhysicalOp, ConsumeError> {
        let name = elem.name.as_str();
        let op = match name {
            "TableScan" => PhysicalOp::TableScan(TableScan {
                table: self.table_descr(cursor.expect(t::TABLE_DESCRIPTOR)?)?,
            }),
            "DynamicTableScan" => PhysicalOp::DynamicTableScan(DynamicTableScan {
                selector_ids: elem.parse_list(t::SELECTOR_IDS)?,
                table: self.table_descr(cursor.expect(t::TABLE_DESCRIPTOR)?)?,
            }),
            "IndexScan" => {
                let direction =
                    elem.parse_enum(t::INDEX_SCAN_DIRECTION, IndexScanDirection::from_name)?;
                let index = parse_index_descr(cursor.expect(t::INDEX_DESCRIPTOR)?)?;
                let table = self.table_descr(cursor.expect(t::TABLE_DESCRIPTOR)?)?;
                PhysicalOp::IndexScan(IndexScan {
                    index,
                    table,
                    direction,
                })
            }
            "BitmapTableScan" => PhysicalOp::BitmapTableScan(BitmapTableScan {
                table: self.table_descr(cursor.expect(t::TABLE_DESCRIPTOR)?)?,
            }),
            "Result" => PhysicalOp::Result(ResultOp),
            "HashJoin" => PhysicalOp::HashJoin(HashJoin {
                join_type: elem.parse_enum(t::JOIN_TYPE, JoinType::from_name)?,
            }),
            "NestedLoopJoin" => PhysicalOp::NestedLoopJoin(NestedLoopJoin {
                join_type: elem.parse_enum(t::JOIN_TYPE, JoinType::from_name)?,
                index_nlj: elem.parse(t::INDEX_NESTED_LOOP_JOIN)?,
            }),
            "MergeJoin" => PhysicalOp::MergeJoin(MergeJoin {
                join_type: elem.parse_enum(t::JOIN_TYPE, JoinType::from_name)?,
                unique_outer: elem.parse(t::UNIQUE_OUTER)?,
            }),
            "GatherMotion" | "BroadcastMotion" | "RedistributeMotion" | "RandomMotion"
            | "RoutedDistributeMotion" => {
                let kind = match name {
                    "GatherMotion" => MotionKind::Gather,
                    "BroadcastMotion" => MotionKind::Broadcast,
                    "RedistributeMotion" => MotionKind::Redistribute {
                        duplicate_sensitive: elem.parse(t::DUPLICATE_SENSITIVE)?,
                    },
                    "RandomMotion" => MotionKind::Random,
                    _ => MotionKind::RoutedDistribute {
                        segment_id_col: elem.parse(t::SEGMENT_ID_COL)?,
                    },
                };
                PhysicalOp::Motion(Motion {
                    kind,
                    input_segments: elem.parse_list(t::INPUT_SEGMENTS)?,
                    output_segments: elem.parse_list(t::OUTPUT_SEGMENTS)?,
                })
            }
            "Append" => PhysicalOp::Append(Append {
                is_target: elem.parse(t::IS_TARGET)?,
                is_zapped: elem.parse(t::IS_ZAPPED)?,
            }),
            "Limit" => PhysicalOp::Limit(Limit),
            "Aggregate" => {
                let mut grouping_cols = Vec::new();
                if let Some(cols) = cursor.take(t::GROUPING_COLUMNS) {
                    for col in &cols.children {
                        if col.name != t::GROUPING_COLUMN {
                            return Err(ConsumeError::UnknownElement(col.name.clone()));
                        }
                        grouping_cols.push(col.parse(t::COL_ID)?);
                    }
                }
                PhysicalOp::Aggregate(Aggregate {
                    strategy: elem.parse_enum(t::AGGREGATION_STRATEGY, AggStrategy::from_name)?,
                    stream_safe: elem.parse(t::STREAM_SAFE)?,
                    grouping_cols,
                })
            }
            "Sort" => PhysicalOp::Sort(Sort {
                discard_duplicates: elem.parse(t::SORT_DISCARD_DUPLICATES)?,
            }),
            "Materialize" => PhysicalOp::Materialize(Materialize {
                eager: elem.parse(t::EAGER)?,
            }),
            "PartitionSelector" => PhysicalOp::PartitionSelector(PartitionSelector::new(
                elem.parse(t::RELATION_MDID)?,
                elem.parse(t::SELECTOR_ID)?,
                elem.parse(t::SCAN_ID)?,
                elem.parse_list(t::PARTITIONS)?,
            )?),
            "Window" => {
                let keys = match cursor.take(t::WINDOW_KEY_LIST) {
                    Some(list) => list
                        .children
                        .iter()
                        .map(|key| self.window_key(key))
                        .collect::<Result<Vec<_>, _>>()?,
                    None => Vec::new(),
                };
                PhysicalOp::Window(Window {
                    partition_cols: elem.parse_list(t::PARTITION_COLUMNS)?,
                    keys,
                })
            }
            "SubqueryScan" => PhysicalOp::SubqueryScan(SubqueryScan {
                alias: elem.required(t::ALIAS)?.to_string(),
            }),
            "Sequence" => PhysicalOp::Sequence(Sequence),
            "Assert" => PhysicalOp::Assert(Assert {
                error_code: elem.required(t::ERROR_CODE)?.to_string(),
            }),
            "CTEProducer" => PhysicalOp::CteProducer(CteProducer {
                cte_id: elem.parse(t::CTE_ID)?,
                col_ids: elem.parse_list(t::CTE_COLUMNS)?,
            }),
            "CTEConsumer" => PhysicalOp::CteConsumer(CteConsumer {
                cte_id: elem.parse(t::CTE_ID)?,
                col_ids: elem.parse_list(t::CTE_COLUMNS)?,
            }),
            "TableValuedFunction" => PhysicalOp::TableValuedFunction(TableValuedFunction::new(
                elem.parse(t::FUNC_ID)?,
                elem.parse(t::TYPE_MDID)?,
                elem.required(t::NAME)?,
            )?),
            other => return Err(ConsumeError::UnknownElement(other.to_string())),
        };
        Ok(op)
    }

    fn table_descr(&mut self, elem: &Element) -> Result<TableDescr, ConsumeError> {
        let mut cursor = Cursor::new(elem);
        let mut columns = Vec::new();
        if let Some(cols) = cursor.take(t::COLUMNS) {
            for col in &cols.children {
                if col.name != t::COLUMN {
                    return Err(ConsumeError::UnknownElement(col.name.clone()));
                }
                let mut descr = ColumnDescr::new(self.colref(col, None)?, col.parse(t::ATTNO)?);
                descr.width = col.parse_opt(t::COL_WIDTH)?;
                descr.is_dropped = col.parse_opt(t::IS_DROPPED)?.unwrap_or(false);
                columns.push(descr);
            }
        }
        if let Some(extra) = cursor.rest().first() {
            return Err(ConsumeError::UnknownElement(extra.name.clone()));
        }
        let mut table = TableDescr::new(elem.parse(t::MDID)?, elem.required(t::TABLE_NAME)?, columns)?;
        table.execute_as_user = elem.parse_opt(t::EXECUTE_AS_USER)?;
        Ok(table)
    }

    fn window_key(&mut self, elem: &Element) -> Result<WindowKey, ConsumeError> {
        if elem.name != t::WINDOW_KEY {
            return Err(ConsumeError::UnknownElement(elem.name.clone()));
        }
        let mut cursor = Cursor::new(elem);
        let sort_cols = match cursor.take("SortingColumnList") {
            Some(list) => Some(self.node(list)?),
            None => None,
        };
        let frame = match cursor.take(t::WINDOW_FRAME) {
            Some(frame) => {
                let (leading, trailing) = match frame.children.as_slice() {
                    [leading, trailing] => (self.node(leading)?, self.node(trailing)?),
                    other => {
                        return Err(ConsumeError::Unexpected(format!(
                            "{} must contain a leading and a trailing edge, found {} elements",
                            t::WINDOW_FRAME,
                            other.len()
                        )))
                    }
                };
                Some(WindowFrame::new(
                    frame.parse_enum(t::FRAME_SPEC, FrameSpec::from_name)?,
                    frame.parse_enum(t::EXCLUSION_STRATEGY, FrameExclusion::from_name)?,
                    leading,
                    trailing,
                )?)
            }
            None => None,
        };
        if let Some(extra) = cursor.rest().first() {
            return Err(ConsumeError::UnknownElement(extra.name.clone()));
        }
        Ok(WindowKey { sort_cols, frame })
    }
}

fn parse_coercion_form(elem: &Element) -> Result<CoercionForm, ConsumeError> {
    let code: i32 = elem.parse(t::COERCION_FORM)?;
    CoercionForm::from_code(code).ok_or_else(|| elem.invalid(t::COERCION_FORM, &code.to_string()))
}

fn parse_index_descr(elem: &Element) -> Result<IndexDescr, ConsumeError> {
    Ok(IndexDescr::new(elem.parse(t::MDID)?, elem.required(t::INDEX_NAME)?)?)
}

fn parse_properties(elem: &Element) -> Result<PhysicalProperties, ConsumeError> {
    let cost = match elem.children.as_slice() {
        [cost] if cost.name == t::COST => cost,
        _ => {
            return Err(ConsumeError::Unexpected(format!(
                "{} must contain exactly one {} element",
                t::PROPERTIES,
                t::COST
            )))
        }
    };
    Ok(PhysicalProperties::new(
        cost.parse(t::STARTUP_COST)?,
        cost.parse(t::TOTAL_COST)?,
        cost.parse(t::ROWS)?,
        cost.parse(t::WIDTH)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comparison_fragment() {
        let node = parse_node(concat!(
            r#"<dxl:Comparison ComparisonOperator="=" OperatorMdid="0.96.1.0">"#,
            r#"<dxl:Ident ColId="1" ColName="a" TypeMdid="0.23.1.0"/>"#,
            r#"<dxl:ConstValue TypeMdid="0.23.1.0" IsNull="false" IsByValue="true" Value="5"/>"#,
            "</dxl:Comparison>"
        ))
        .unwrap();
        assert_eq!(node.op_id(), DxlOpId::Comparison);
        assert_eq!(node.arity(), 2);
        let ident = node.children[0].op.cast::<Ident>().unwrap();
        assert_eq!(ident.colref.name, "a");
        let value = node.children[1].op.cast::<ConstValue>().unwrap();
        assert_eq!(value.datum, Datum::int4(5));
    }

    #[test]
    fn test_colrefs_are_shared() {
        let node = parse_node(concat!(
            r#"<dxl:And>"#,
            r#"<dxl:IsNull><dxl:Ident ColId="3" ColName="x" TypeMdid="0.20.1.0"/></dxl:IsNull>"#,
            r#"<dxl:IsNotNull><dxl:Ident ColId="3" ColName="x" TypeMdid="0.20.1.0"/></dxl:IsNotNull>"#,
            "</dxl:And>"
        ))
        .unwrap();
        let a = node.children[0].children[0].op.cast::<Ident>().unwrap();
        let b = node.children[1].children[0].op.cast::<Ident>().unwrap();
        assert!(Arc::ptr_eq(&a.colref, &b.colref));
    }

    #[test]
    fn test_errors_name_attribute_and_element() {
        let err = parse_node(r#"<dxl:Cast FuncId="0.0.0.0"/>"#).unwrap_err();
        match err {
            ConsumeError::MissingAttribute { attr, element } => {
                assert_eq!(attr, "TypeMdid");
                assert_eq!(element, "Cast");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let err = parse_node(r#"<dxl:CaseTest TypeMdid="0.23.x.0"/>"#).unwrap_err();
        assert!(matches!(
            err,
            ConsumeError::InvalidAttribute { ref attr, ref value, .. } if attr == "TypeMdid" && value == "0.23.x.0"
        ));

        let err = parse_node(r#"<dxl:AggFunc AggMdid="0.2108.1.0" AggDistinct="false" AggStage="Sometimes"/>"#)
            .unwrap_err();
        assert!(matches!(err, ConsumeError::InvalidAttribute { ref attr, .. } if attr == "AggStage"));
    }

    #[test]
    fn test_rejects_unknown_and_malformed_documents() {
        assert!(matches!(
            parse_node("<dxl:Frobnicate/>"),
            Err(ConsumeError::UnknownElement(name)) if name == "Frobnicate"
        ));
        assert!(matches!(parse_node(""), Err(ConsumeError::Empty)));
        assert!(matches!(
            parse_node("<dxl:ProjList>text</dxl:ProjList>"),
            Err(ConsumeError::Unexpected(_))
        ));
        assert!(matches!(
            parse_node(r#"<dxl:CaseTest TypeMdid="0.0.0.0"/>"#),
            Err(ConsumeError::Dxl(DxlError::InvalidMdId { .. }))
        ));
        assert!(matches!(
            parse_node(r#"<dxl:SubPlan TypeMdid="0.16.1.0" SubPlanType="AnySubPlan"/>"#),
            Err(ConsumeError::Dxl(DxlError::MissingTestExpr(_)))
        ));
    }

    #[test]
    fn test_parse_dxl_detects_envelope() {
        let doc = concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<dxl:DXLMessage xmlns:dxl="http://greenplum.com/dxl/2010/12/">"#,
            r#"<dxl:Plan Id="4" SpaceSize="9"><dxl:Result><dxl:ProjList/><dxl:Filter/><dxl:OneTimeFilter/></dxl:Result></dxl:Plan>"#,
            "</dxl:DXLMessage>"
        );
        match parse_dxl(doc).unwrap() {
            ParsedDxl::Plan(plan) => {
                assert_eq!((plan.id, plan.space_size), (4, 9));
                assert_eq!(plan.root.op_id(), DxlOpId::Result);
            }
            ParsedDxl::Fragment(_) => panic!("expected a plan"),
        }
        assert!(matches!(parse_dxl("<dxl:ProjList/>").unwrap(), ParsedDxl::Fragment(_)));
    }
}
