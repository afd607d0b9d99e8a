//! Element and attribute names of the DXL wire format.
//!
//! Operator element names come from `DxlOperator::op_name`; this module holds the
//! names of attributes and of the nested, non-operator elements. Producer and
//! consumer both read from here so the two sides cannot drift apart.

pub const NAMESPACE_PREFIX: &str = "dxl";
pub const NAMESPACE_URI: &str = "http://greenplum.com/dxl/2010/12/";

// Envelope and nested elements
pub const DXL_MESSAGE: &str = "DXLMessage";
pub const PLAN: &str = "Plan";
pub const PROPERTIES: &str = "Properties";
pub const COST: &str = "Cost";
pub const TABLE_DESCRIPTOR: &str = "TableDescriptor";
pub const INDEX_DESCRIPTOR: &str = "IndexDescriptor";
pub const COLUMNS: &str = "Columns";
pub const COLUMN: &str = "Column";
pub const TEST_EXPR: &str = "TestExpr";
pub const PARAM_LIST: &str = "ParamList";
pub const PARAM: &str = "Param";
pub const GROUPING_COLUMNS: &str = "GroupingColumns";
pub const GROUPING_COLUMN: &str = "GroupingColumn";
pub const WINDOW_KEY_LIST: &str = "WindowKeyList";
pub const WINDOW_KEY: &str = "WindowKey";
pub const WINDOW_FRAME: &str = "WindowFrame";

// Plan attributes
pub const ID: &str = "Id";
pub const SPACE_SIZE: &str = "SpaceSize";
pub const STARTUP_COST: &str = "StartupCost";
pub const TOTAL_COST: &str = "TotalCost";
pub const ROWS: &str = "Rows";
pub const WIDTH: &str = "Width";

// Column references and descriptors
pub const COL_ID: &str = "ColId";
pub const COL_NAME: &str = "ColName";
pub const TYPE_MDID: &str = "TypeMdid";
pub const TYPE_MODIFIER: &str = "TypeModifier";
pub const COLLATION: &str = "Collation";
pub const ATTNO: &str = "Attno";
pub const COL_WIDTH: &str = "ColWidth";
pub const IS_DROPPED: &str = "IsDropped";
pub const MDID: &str = "Mdid";
pub const TABLE_NAME: &str = "TableName";
pub const EXECUTE_AS_USER: &str = "ExecuteAsUser";
pub const INDEX_NAME: &str = "IndexName";

// Scalar attributes
pub const IS_NULL: &str = "IsNull";
pub const IS_BY_VALUE: &str = "IsByValue";
pub const VALUE: &str = "Value";
pub const LINT_VALUE: &str = "LintValue";
pub const DOUBLE_VALUE: &str = "DoubleValue";
pub const COMPARISON_OPERATOR: &str = "ComparisonOperator";
pub const OPERATOR_NAME: &str = "OperatorName";
pub const OPERATOR_MDID: &str = "OperatorMdid";
pub const OPERATOR_TYPE: &str = "OperatorType";
pub const FUNC_ID: &str = "FuncId";
pub const FUNC_RET_SET: &str = "FuncRetSet";
pub const COERCION_FORM: &str = "CoercionForm";
pub const LOCATION: &str = "Location";
pub const ELEMENT_FUNC: &str = "ElementFunc";
pub const IS_EXPLICIT: &str = "IsExplicit";
pub const AGG_MDID: &str = "AggMdid";
pub const AGG_DISTINCT: &str = "AggDistinct";
pub const AGG_STAGE: &str = "AggStage";
pub const DISTINCT: &str = "Distinct";
pub const WINDOW_STAR_ARG: &str = "WindowStarArg";
pub const WINDOW_SIMPLE_AGG: &str = "WindowSimpleAgg";
pub const WINDOW_STRATEGY: &str = "WindowStrategy";
pub const WIN_SPEC_POS: &str = "WinSpecPos";
pub const ELEMENT_TYPE: &str = "ElementType";
pub const ARRAY_TYPE: &str = "ArrayType";
pub const MULTI_DIMENSIONAL: &str = "MultiDimensional";
pub const INDEX_LIST_BOUND: &str = "IndexListBound";
pub const SUB_PLAN_TYPE: &str = "SubPlanType";
pub const ALIAS: &str = "Alias";
pub const SORT_OPERATOR_MDID: &str = "SortOperatorMdid";
pub const SORT_OPERATOR_NAME: &str = "SortOperatorName";
pub const SORT_NULLS_FIRST: &str = "SortNullsFirst";
pub const FRAME_BOUNDARY: &str = "FrameBoundary";
pub const LEVEL: &str = "Level";
pub const IS_LOWER_BOUND: &str = "IsLowerBound";
pub const RESULT_TYPE: &str = "ResultType";
pub const ERROR_MESSAGE: &str = "ErrorMessage";

// Physical attributes
pub const SELECTOR_IDS: &str = "SelectorIds";
pub const INDEX_SCAN_DIRECTION: &str = "IndexScanDirection";
pub const JOIN_TYPE: &str = "JoinType";
pub const INDEX_NESTED_LOOP_JOIN: &str = "IndexNestedLoopJoin";
pub const UNIQUE_OUTER: &str = "UniqueOuter";
pub const INPUT_SEGMENTS: &str = "InputSegments";
pub const OUTPUT_SEGMENTS: &str = "OutputSegments";
pub const DUPLICATE_SENSITIVE: &str = "DuplicateSensitive";
pub const SEGMENT_ID_COL: &str = "SegmentIdCol";
pub const IS_TARGET: &str = "IsTarget";
pub const IS_ZAPPED: &str = "IsZapped";
pub const AGGREGATION_STRATEGY: &str = "AggregationStrategy";
pub const STREAM_SAFE: &str = "StreamSafe";
pub const SORT_DISCARD_DUPLICATES: &str = "SortDiscardDuplicates";
pub const EAGER: &str = "Eager";
pub const RELATION_MDID: &str = "RelationMdid";
pub const SELECTOR_ID: &str = "SelectorId";
pub const SCAN_ID: &str = "ScanId";
pub const PARTITIONS: &str = "Partitions";
pub const PARTITION_COLUMNS: &str = "PartitionColumns";
pub const FRAME_SPEC: &str = "FrameSpec";
pub const EXCLUSION_STRATEGY: &str = "ExclusionStrategy";
pub const ERROR_CODE: &str = "ErrorCode";
pub const CTE_ID: &str = "CTEId";
pub const CTE_COLUMNS: &str = "Columns";
pub const NAME: &str = "Name";
