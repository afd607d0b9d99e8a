//! End-to-end DXL round-trip tests.
//!
//! A single plan touches every physical operator and, through projection lists,
//! filters and nested descriptors, every scalar operator. A handful of fragments
//! cover the containers that cannot appear at those positions. For each tree we
//! check that
//!
//! - serializing, parsing and serializing again is byte-identical,
//! - the parsed tree equals the original,
//! - the plan passes deep structural validation before and after the trip.

use dxl_core::colref::{ColRef, ColumnDescr, IndexDescr, TableDescr};
use dxl_core::datum::Datum;
use dxl_core::md_accessor::{AggregateDescriptor, FunctionDescriptor, InMemoryMdAccessor};
use dxl_core::mdid::MdId;
use dxl_core::node::{DxlNode, DxlPlan, PhysicalProperties};
use dxl_core::operator::{DxlOpId, PhysicalOp, ScalarOp};
use dxl_core::physical::*;
use dxl_core::scalar::*;
use dxl_xml::{parse_node, parse_plan, serialize_node, serialize_plan, SerializerOptions};
use std::collections::BTreeSet;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const BOOL: u32 = 16;
const INT8: u32 = 20;
const INT4: u32 = 23;
const TEXT: u32 = 25;
const NUMERIC: u32 = 1700;
const INT4_ARRAY: u32 = 1007;

fn md(oid: u32) -> MdId {
    MdId::gpdb(oid)
}

fn col(id: u32, name: &str, oid: u32) -> Arc<ColRef> {
    ColRef::new(id, name, md(oid)).unwrap()
}

fn scalar(op: ScalarOp) -> DxlNode {
    DxlNode::scalar(op)
}

fn ident(c: &Arc<ColRef>) -> DxlNode {
    scalar(ScalarOp::Ident(Ident::new(Arc::clone(c))))
}

fn int4(v: i32) -> DxlNode {
    scalar(ScalarOp::ConstValue(ConstValue::new(Datum::int4(v))))
}

fn boolean(v: bool) -> DxlNode {
    scalar(ScalarOp::ConstValue(ConstValue::new(Datum::bool(v))))
}

fn eq(left: DxlNode, right: DxlNode) -> DxlNode {
    scalar(ScalarOp::Comparison(Comparison::new("=", md(96)).unwrap())).with_children(vec![left, right])
}

fn proj_elem(id: u32, alias: &str, expr: DxlNode) -> DxlNode {
    scalar(ScalarOp::ProjElem(ProjElem::new(id, alias))).with_children(vec![expr])
}

fn proj_list(cols: &[&Arc<ColRef>]) -> DxlNode {
    scalar(ScalarOp::ProjList(ProjList)).with_children(
        cols.iter()
            .map(|c| proj_elem(c.id, &c.name, ident(c)))
            .collect(),
    )
}

fn filter_of(kind: FilterKind, pred: Option<DxlNode>) -> DxlNode {
    scalar(ScalarOp::Filter(Filter::new(kind))).with_children(pred.into_iter().collect())
}

fn filter() -> DxlNode {
    filter_of(FilterKind::Filter, None)
}

fn cond_list(kind: CondListKind, conds: Vec<DxlNode>) -> DxlNode {
    scalar(ScalarOp::CondList(CondList::new(kind))).with_children(conds)
}

fn sort_cols(cols: &[&Arc<ColRef>]) -> DxlNode {
    scalar(ScalarOp::SortColList(SortColList)).with_children(
        cols.iter()
            .map(|c| scalar(ScalarOp::SortCol(SortCol::new(c.id, md(97), "<", false).unwrap())))
            .collect(),
    )
}

fn table(oid: u32, name: &str, cols: &[&Arc<ColRef>]) -> TableDescr {
    let columns = cols
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut descr = ColumnDescr::new(Arc::clone(c), i as i32 + 1);
            descr.width = Some(4);
            descr
        })
        .collect();
    TableDescr::new(md(oid), name, columns).unwrap()
}

fn physical(op: PhysicalOp, children: Vec<DxlNode>) -> DxlNode {
    DxlNode::physical(op)
        .with_properties(PhysicalProperties::new(0.0, 431.25, 1000.0, 8.0))
        .with_children(children)
}

fn motion(kind: MotionKind, mut children: Vec<DxlNode>, cols: &[&Arc<ColRef>]) -> DxlNode {
    let mut all = vec![proj_list(cols), filter(), sort_cols(&[])];
    all.append(&mut children);
    physical(
        PhysicalOp::Motion(Motion {
            kind,
            input_segments: vec![0, 1, 2],
            output_segments: vec![-1],
        }),
        all,
    )
}

fn accessor() -> InMemoryMdAccessor {
    let mut md_acc = InMemoryMdAccessor::with_builtin_types();
    md_acc.add_function(FunctionDescriptor {
        mdid: md(2101),
        name: "lower".into(),
        result_type: md(TEXT),
        returns_set: false,
    });
    md_acc.add_function(FunctionDescriptor {
        mdid: md(3100),
        name: "row_number".into(),
        result_type: md(INT8),
        returns_set: false,
    });
    md_acc.add_aggregate(AggregateDescriptor {
        mdid: md(2147),
        name: "count".into(),
        result_type: md(INT8),
    });
    md_acc
}

fn compact() -> SerializerOptions {
    SerializerOptions {
        indent: false,
        include_header: false,
    }
}

fn collect_ids(node: &DxlNode, ids: &mut BTreeSet<DxlOpId>) {
    node.walk(&mut |n| {
        ids.insert(n.op_id());
    });
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Projection elements exercising the expression operators.
fn expression_zoo(a: &Arc<ColRef>, b: &Arc<ColRef>, s: &Arc<ColRef>) -> DxlNode {
    let text_coll = ColRef::with_modifier(s.id, &s.name, s.type_mdid, s.type_mod, Some(md(100))).unwrap();
    let exprs = vec![
        scalar(ScalarOp::OpExpr(OpExpr::new("+", md(551), Some(md(INT4))).unwrap()))
            .with_children(vec![ident(a), int4(1)]),
        scalar(ScalarOp::ArrayComp(
            ArrayComp::new("=", md(96), ArrayCompType::Any).unwrap(),
        ))
        .with_children(vec![
            ident(a),
            scalar(ScalarOp::Array(Array::new(md(INT4), md(INT4_ARRAY), false).unwrap()))
                .with_children(vec![int4(1), int4(2), int4(3)]),
        ]),
        scalar(ScalarOp::IfStmt(IfStmt::new(md(INT4)).unwrap()))
            .with_children(vec![eq(ident(a), ident(b)), int4(1), int4(0)]),
        scalar(ScalarOp::Switch(Switch::new(md(INT4)).unwrap())).with_children(vec![
            ident(a),
            scalar(ScalarOp::SwitchCase(SwitchCase)).with_children(vec![
                scalar(ScalarOp::CaseTest(CaseTest::new(md(INT4)).unwrap())),
                int4(10),
            ]),
            int4(0),
        ]),
        scalar(ScalarOp::Coalesce(Coalesce::new(md(INT4)).unwrap()))
            .with_children(vec![ident(a), int4(0)]),
        scalar(ScalarOp::MinMax(MinMax::new(MinMaxType::Max, md(INT4)).unwrap()))
            .with_children(vec![ident(a), ident(b)]),
        scalar(ScalarOp::Cast(Cast::new(md(INT8), md(481)).unwrap())).with_children(vec![ident(a)]),
        scalar(ScalarOp::Cast(Cast::new(md(INT4), MdId::invalid()).unwrap()))
            .with_children(vec![ident(b)]),
        scalar(ScalarOp::Coerce(
            Coerce::new(CoerceKind::ToDomain, md(16400), -1, CoercionForm::ImplicitCast, -1).unwrap(),
        ))
        .with_children(vec![ident(a)]),
        scalar(ScalarOp::Coerce(
            Coerce::new(CoerceKind::ViaIO, md(TEXT), 36, CoercionForm::ExplicitCast, 12).unwrap(),
        ))
        .with_children(vec![ident(a)]),
        scalar(ScalarOp::ArrayCoerceExpr(
            ArrayCoerceExpr::new(md(481), md(1016), -1, true, CoercionForm::ExplicitCall, 7).unwrap(),
        ))
        .with_children(vec![ident(a)]),
        scalar(ScalarOp::FuncExpr(FuncExpr::new(md(2101), md(TEXT), -1, false).unwrap()))
            .with_children(vec![scalar(ScalarOp::Ident(Ident::new(text_coll)))]),
        scalar(ScalarOp::ArrayRef(
            ArrayRef::new(md(INT4), -1, md(INT4_ARRAY), md(INT4)).unwrap(),
        ))
        .with_children(vec![
            scalar(ScalarOp::ArrayRefIndexList(ArrayRefIndexList::new(IndexListBound::Upper)))
                .with_children(vec![int4(1)]),
            scalar(ScalarOp::ArrayRefIndexList(ArrayRefIndexList::new(IndexListBound::Lower))),
            scalar(ScalarOp::Array(Array::new(md(INT4), md(INT4_ARRAY), true).unwrap())),
        ]),
        scalar(ScalarOp::NullIf(NullIf::new(md(96), md(INT4)).unwrap()))
            .with_children(vec![ident(a), int4(0)]),
        scalar(ScalarOp::BoolExpr(BoolExpr::new(BoolExprType::Not))).with_children(vec![scalar(
            ScalarOp::BooleanTest(BooleanTest::new(BooleanTestType::IsNotUnknown)),
        )
        .with_children(vec![
            scalar(ScalarOp::NullTest(NullTest::new(true))).with_children(vec![ident(a)]),
        ])]),
        scalar(ScalarOp::DistinctComparison(DistinctComparison::new(md(96)).unwrap()))
            .with_children(vec![ident(a), ident(b)]),
        scalar(ScalarOp::ConstValue(ConstValue::new(
            Datum::generic(md(NUMERIC), -1, "AAAACgAAAAI=", Some(10), Some(10.25)).unwrap(),
        ))),
        scalar(ScalarOp::ConstValue(ConstValue::new(Datum::null(md(TEXT), false).unwrap()))),
        scalar(ScalarOp::ConstValue(ConstValue::new(Datum::int8(-9_000_000_000)))),
        scalar(ScalarOp::SubPlan(
            SubPlan::new(
                md(BOOL),
                SubPlanType::Any,
                Some(eq(ident(a), int4(3))),
                vec![Arc::clone(a)],
            )
            .unwrap(),
        ))
        .with_children(vec![physical(
            PhysicalOp::Result(ResultOp),
            vec![
                proj_list(&[a]),
                filter(),
                filter_of(FilterKind::OneTimeFilter, Some(boolean(true))),
            ],
        )]),
        scalar(ScalarOp::SubPlan(
            SubPlan::new(md(BOOL), SubPlanType::NotExists, None, vec![]).unwrap(),
        ))
        .with_children(vec![physical(
            PhysicalOp::CteConsumer(CteConsumer {
                cte_id: 0,
                col_ids: vec![1],
            }),
            vec![proj_list(&[a])],
        )]),
    ];
    scalar(ScalarOp::ProjList(ProjList)).with_children(
        exprs
            .into_iter()
            .enumerate()
            .map(|(i, e)| proj_elem(100 + i as u32, &format!("e{}", i), e))
            .collect(),
    )
}

fn bitmap_scan(c: &Arc<ColRef>) -> DxlNode {
    let probe = |name: &str| {
        scalar(ScalarOp::BitmapIndexProbe(BitmapIndexProbe::new(
            IndexDescr::new(md(41000), name).unwrap(),
        )))
        .with_children(vec![cond_list(CondListKind::Index, vec![eq(ident(c), int4(1))])])
    };
    physical(
        PhysicalOp::BitmapTableScan(BitmapTableScan {
            table: table(40000, "t4", &[c]),
        }),
        vec![
            proj_list(&[c]),
            filter(),
            filter_of(FilterKind::RecheckCond, Some(eq(ident(c), int4(1)))),
            scalar(ScalarOp::BitmapBoolOp(BitmapBoolOp::new(BitmapOpType::Or, md(INT4)).unwrap()))
                .with_children(vec![
                    probe("t4_a"),
                    scalar(ScalarOp::BitmapBoolOp(
                        BitmapBoolOp::new(BitmapOpType::And, md(INT4)).unwrap(),
                    ))
                    .with_children(vec![probe("t4_b"), probe("t4_c")]),
                ]),
        ],
    )
}

fn window(a: &Arc<ColRef>, input: DxlNode) -> DxlNode {
    let edge = |leading, boundary: FrameBoundary, offset: Option<DxlNode>| {
        scalar(ScalarOp::WindowFrameEdge(WindowFrameEdge::new(leading, boundary)))
            .with_children(offset.into_iter().collect())
    };
    let frame = WindowFrame::new(
        FrameSpec::Row,
        FrameExclusion::Ties,
        edge(true, FrameBoundary::BoundedPreceding, Some(int4(2))),
        edge(false, FrameBoundary::CurrentRow, None),
    )
    .unwrap();
    let row_number = scalar(ScalarOp::WindowRef(
        WindowRef::new(md(3100), md(INT8), false, false, false, WindowStage::Immediate, 0).unwrap(),
    ));
    physical(
        PhysicalOp::Window(Window {
            partition_cols: vec![a.id],
            keys: vec![
                WindowKey {
                    sort_cols: Some(sort_cols(&[a])),
                    frame: Some(frame),
                },
                WindowKey {
                    sort_cols: None,
                    frame: None,
                },
            ],
        }),
        vec![
            scalar(ScalarOp::ProjList(ProjList)).with_children(vec![proj_elem(20, "rn", row_number)]),
            filter(),
            input,
        ],
    )
}

/// A plan containing every physical operator.
fn kitchen_sink_plan() -> DxlPlan {
    let a = col(1, "a", INT4);
    let b = col(2, "b", INT4);
    let c = col(3, "c", INT4);
    let s = col(4, "s", TEXT);
    let t1 = table(16384, "t1", &[&a, &s]);
    let t2 = table(16390, "t2", &[&b]);

    let scan_t1 = || {
        physical(
            PhysicalOp::TableScan(TableScan { table: t1.clone() }),
            vec![proj_list(&[&a, &s]), filter()],
        )
    };

    let index_scan = physical(
        PhysicalOp::IndexScan(IndexScan {
            index: IndexDescr::new(md(16395), "t2_b_idx").unwrap(),
            table: t2.clone(),
            direction: IndexScanDirection::Forward,
        }),
        vec![
            proj_list(&[&b]),
            filter(),
            cond_list(CondListKind::Index, vec![eq(ident(&b), int4(5))]),
        ],
    );

    let mut dynamic_t3 = table(17000, "t3 & <parts>", &[&c]);
    dynamic_t3.execute_as_user = Some(10);
    dynamic_t3.columns[0].is_dropped = true;
    let merge_join = physical(
        PhysicalOp::MergeJoin(MergeJoin {
            join_type: JoinType::Inner,
            unique_outer: true,
        }),
        vec![
            proj_list(&[&c]),
            filter(),
            filter_of(FilterKind::JoinFilter, None),
            cond_list(CondListKind::Merge, vec![eq(ident(&c), ident(&c))]),
            physical(
                PhysicalOp::DynamicTableScan(DynamicTableScan {
                    table: dynamic_t3,
                    selector_ids: vec![1, 2],
                }),
                vec![proj_list(&[&c]), filter()],
            ),
            bitmap_scan(&c),
        ],
    );

    let nlj = physical(
        PhysicalOp::NestedLoopJoin(NestedLoopJoin {
            join_type: JoinType::Left,
            index_nlj: false,
        }),
        vec![
            proj_list(&[&b]),
            filter(),
            filter_of(FilterKind::JoinFilter, Some(eq(ident(&b), ident(&c)))),
            index_scan,
            motion(MotionKind::Broadcast, vec![merge_join], &[&c]),
        ],
    );

    let redistribute = physical(
        PhysicalOp::Motion(Motion {
            kind: MotionKind::Redistribute {
                duplicate_sensitive: true,
            },
            input_segments: vec![0, 1],
            output_segments: vec![0, 1],
        }),
        vec![
            proj_list(&[&a]),
            filter(),
            sort_cols(&[]),
            scalar(ScalarOp::HashExprList(HashExprList)).with_children(vec![scalar(
                ScalarOp::HashExpr(HashExpr::new(md(INT4)).unwrap()),
            )
            .with_children(vec![ident(&a)])]),
            scan_t1(),
        ],
    );

    let hash_join = physical(
        PhysicalOp::HashJoin(HashJoin {
            join_type: JoinType::Inner,
        }),
        vec![
            proj_list(&[&a, &b]),
            filter_of(FilterKind::Filter, Some(eq(ident(&a), int4(7)))),
            filter_of(FilterKind::JoinFilter, None),
            cond_list(CondListKind::Hash, vec![eq(ident(&a), ident(&b))]),
            redistribute,
            nlj,
        ],
    );

    let sort = physical(
        PhysicalOp::Sort(Sort {
            discard_duplicates: false,
        }),
        vec![
            proj_list(&[&a]),
            filter(),
            sort_cols(&[&a]),
            scalar(ScalarOp::LimitCount(LimitCount)),
            scalar(ScalarOp::LimitOffset(LimitOffset)),
            hash_join,
        ],
    );

    let limit = physical(
        PhysicalOp::Limit(Limit),
        vec![
            proj_list(&[&a]),
            motion(MotionKind::Gather, vec![sort], &[&a]),
            scalar(ScalarOp::LimitCount(LimitCount))
                .with_children(vec![scalar(ScalarOp::ConstValue(ConstValue::new(Datum::int8(10))))]),
            scalar(ScalarOp::LimitOffset(LimitOffset)).with_children(vec![scalar(
                ScalarOp::ConstValue(ConstValue::new(Datum::int8(0))),
            )]),
        ],
    );

    let count = scalar(ScalarOp::Aggref(
        Aggref::new(md(2147), Some(md(INT8)), true, AggStage::Final).unwrap(),
    ))
    .with_children(vec![ident(&a)]);
    let aggregate = physical(
        PhysicalOp::Aggregate(Aggregate {
            strategy: AggStrategy::Hashed,
            stream_safe: false,
            grouping_cols: vec![1],
        }),
        vec![
            scalar(ScalarOp::ProjList(ProjList)).with_children(vec![proj_elem(10, "cnt", count)]),
            filter(),
            scan_t1(),
        ],
    );

    let partition_selector = physical(
        PhysicalOp::PartitionSelector(
            PartitionSelector::new(md(17000), 1, 2, vec![17001, 17002]).unwrap(),
        ),
        vec![
            proj_list(&[]),
            scalar(ScalarOp::BoolExpr(BoolExpr::new(BoolExprType::Or))).with_children(vec![
                scalar(ScalarOp::PartDefault(PartDefault { level: 0 })),
                scalar(ScalarOp::PartListNullTest(PartListNullTest {
                    level: 0,
                    is_null: false,
                })),
                scalar(ScalarOp::PartBoundInclusion(PartBoundInclusion {
                    level: 0,
                    is_lower: true,
                })),
                scalar(ScalarOp::PartBoundOpen(PartBoundOpen {
                    level: 1,
                    is_lower: false,
                })),
            ]),
            physical(PhysicalOp::Result(ResultOp), vec![
                proj_list(&[]),
                filter(),
                filter_of(FilterKind::OneTimeFilter, None),
            ]),
        ],
    );

    let assert = physical(
        PhysicalOp::Assert(Assert {
            error_code: "P0001".into(),
        }),
        vec![
            proj_list(&[&a]),
            scalar(ScalarOp::AssertConstraintList(AssertConstraintList)).with_children(vec![scalar(
                ScalarOp::AssertConstraint(AssertConstraint::new("a must be \"positive\"")),
            )
            .with_children(vec![eq(ident(&a), int4(1))])]),
            physical(
                PhysicalOp::Materialize(Materialize { eager: true }),
                vec![proj_list(&[&a]), filter(), scan_t1()],
            ),
        ],
    );

    let tvf = physical(
        PhysicalOp::TableValuedFunction(
            TableValuedFunction::new(md(1067), md(INT4), "generate_series").unwrap(),
        ),
        vec![
            proj_list(&[&a]),
            int4(1),
            scalar(ScalarOp::PartBound(PartBound::new(0, md(INT4), true).unwrap())),
            scalar(ScalarOp::PartOid(PartOid { level: 0 })),
            scalar(ScalarOp::PartListValues(
                PartListValues::new(0, md(INT4_ARRAY), md(INT4)).unwrap(),
            )),
            scalar(ScalarOp::DmlAction(DmlAction)),
        ],
    );

    let append = physical(
        PhysicalOp::Append(Append {
            is_target: false,
            is_zapped: false,
        }),
        vec![
            proj_list(&[&a]),
            filter(),
            aggregate,
            window(&a, scan_t1()),
            physical(
                PhysicalOp::SubqueryScan(SubqueryScan { alias: "sq".into() }),
                vec![proj_list(&[&a]), filter(), scan_t1()],
            ),
            physical(
                PhysicalOp::Result(ResultOp),
                vec![
                    expression_zoo(&a, &b, &s),
                    filter(),
                    filter_of(FilterKind::OneTimeFilter, None),
                    scan_t1(),
                ],
            ),
            partition_selector,
            assert,
            tvf,
            motion(MotionKind::Random, vec![scan_t1()], &[&a]),
            motion(MotionKind::RoutedDistribute { segment_id_col: 1 }, vec![scan_t1()], &[&a]),
        ],
    );

    let root = physical(
        PhysicalOp::Sequence(Sequence),
        vec![
            proj_list(&[&a]),
            physical(
                PhysicalOp::CteProducer(CteProducer {
                    cte_id: 0,
                    col_ids: vec![1],
                }),
                vec![proj_list(&[&a]), scan_t1()],
            ),
            limit,
            append,
        ],
    );
    DxlPlan::new(42, 17, root)
}

/// Containers that never appear at a position in the plan above.
fn fragments() -> Vec<DxlNode> {
    vec![scalar(ScalarOp::ValuesList(ValuesList)).with_children(vec![int4(1), int4(2)])]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_plan_round_trip_is_byte_identical() {
    let plan = kitchen_sink_plan();
    for options in [SerializerOptions::default(), compact()] {
        let first = serialize_plan(&plan, &options).unwrap();
        let parsed = parse_plan(&first).unwrap();
        assert_eq!(parsed, plan);
        let second = serialize_plan(&parsed, &options).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_fragment_round_trip_is_byte_identical() {
    for node in fragments() {
        let first = serialize_node(&node, &compact()).unwrap();
        let parsed = parse_node(&first).unwrap();
        assert_eq!(parsed, node);
        assert_eq!(serialize_node(&parsed, &compact()).unwrap(), first);
    }
}

#[test]
fn test_generic_datum_on_builtin_type_round_trips() {
    let md_acc = accessor();
    let constants = [
        Datum::generic(md(INT4), -1, "5", Some(5), None).unwrap(),
        Datum::generic(md(BOOL), -1, "t", Some(1), None).unwrap(),
        Datum::generic(md(INT8), -1, "7", None, Some(7.0)).unwrap(),
    ];
    for datum in constants {
        let node = scalar(ScalarOp::ConstValue(ConstValue::new(datum)));
        node.validate(&md_acc, true).unwrap();
        let first = serialize_node(&node, &compact()).unwrap();
        let parsed = parse_node(&first).unwrap();
        assert_eq!(parsed, node);
        assert_eq!(serialize_node(&parsed, &compact()).unwrap(), first);
    }
}

#[test]
fn test_every_operator_is_covered() {
    let mut ids = BTreeSet::new();
    collect_ids(&kitchen_sink_plan().root, &mut ids);
    for node in fragments() {
        collect_ids(&node, &mut ids);
    }
    let missing: Vec<_> = DxlOpId::ALL.iter().filter(|id| !ids.contains(*id)).collect();
    assert!(missing.is_empty(), "operators without round-trip coverage: {:?}", missing);
}

#[test]
fn test_plan_validates_before_and_after_round_trip() {
    let md_acc = accessor();
    let plan = kitchen_sink_plan();
    plan.root.validate(&md_acc, true).unwrap();

    let xml = serialize_plan(&plan, &compact()).unwrap();
    let parsed = parse_plan(&xml).unwrap();
    parsed.root.validate(&md_acc, true).unwrap();
}

#[test]
fn test_parsed_columns_share_references() {
    let xml = serialize_plan(&kitchen_sink_plan(), &compact()).unwrap();
    let plan = parse_plan(&xml).unwrap();

    let mut idents = Vec::new();
    plan.root.walk(&mut |n| {
        if let Ok(i) = n.op.cast::<Ident>() {
            if i.colref.id == 1 {
                idents.push(Arc::clone(&i.colref));
            }
        }
    });
    assert!(idents.len() > 10);
    assert!(idents.iter().all(|c| Arc::ptr_eq(c, &idents[0])));
}

#[test]
fn test_escaped_attribute_values_survive() {
    let xml = serialize_plan(&kitchen_sink_plan(), &compact()).unwrap();
    assert!(xml.contains(r#"TableName="t3 &amp; &lt;parts&gt;""#));
    let plan = parse_plan(&xml).unwrap();
    let mut names = Vec::new();
    plan.root.walk(&mut |n| {
        if let Ok(scan) = n.op.cast::<DynamicTableScan>() {
            names.push(scan.table.name.clone());
        }
    });
    assert_eq!(names, vec!["t3 & <parts>".to_string()]);
}

#[test]
fn test_motion_and_cost_attributes() {
    let xml = serialize_plan(&kitchen_sink_plan(), &compact()).unwrap();
    assert!(xml.contains(
        r#"<dxl:RedistributeMotion InputSegments="0,1" OutputSegments="0,1" DuplicateSensitive="true">"#
    ));
    assert!(xml.contains(r#"<dxl:RoutedDistributeMotion InputSegments="0,1,2" OutputSegments="-1" SegmentIdCol="1">"#));
    assert!(xml.contains(
        r#"<dxl:Cost StartupCost="0.000000" TotalCost="431.250000" Rows="1000.000000" Width="8.000000"/>"#
    ));
}
