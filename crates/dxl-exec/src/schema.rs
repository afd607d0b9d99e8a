//! # Schemas
//!
//! Mapping between catalog type ids and Arrow types, and the rewrite that Append
//! applies to batches whose schema differs from the one it established.
//!
//! ## Rewrite Strategies
//!
//! Partition children may store the same logical columns in a different
//! physical order or with a narrower type. `RewriteStrategy` names how the
//! columns of a batch are matched to the target schema:
//!
//! - `ByName`: each target field takes the source column with the same name.
//! - `ByPosition`: the i-th target field takes the i-th source column.
//!
//! A matched column whose type differs is cast when Arrow can cast between the
//! two types. Casts are checked, so a value that does not fit is an error rather
//! than a null. Anything else is `ExecError::SchemaMismatch`.

use crate::error::{ExecError, Result};
use arrow::array::Array;
use arrow::compute::{can_cast_types, cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use dxl_core::colref::TableDescr;
use dxl_core::md_accessor::{
    BOOL_OID, FLOAT4_OID, FLOAT8_OID, INT2_OID, INT4_OID, INT8_OID, NUMERIC_OID, OID_OID,
    TEXT_OID,
};
use dxl_core::MdId;
use std::sync::Arc;

const BPCHAR_OID: u32 = 1042;
const VARCHAR_OID: u32 = 1043;
const DATE_OID: u32 = 1082;

const NUMERIC_PRECISION: u8 = 38;
const NUMERIC_SCALE: i8 = 10;

pub fn arrow_type(type_mdid: &MdId) -> Result<DataType> {
    let data_type = match type_mdid.oid() {
        Some(BOOL_OID) => DataType::Boolean,
        Some(INT2_OID) => DataType::Int16,
        Some(INT4_OID) => DataType::Int32,
        Some(INT8_OID) => DataType::Int64,
        Some(OID_OID) => DataType::UInt32,
        Some(FLOAT4_OID) => DataType::Float32,
        Some(FLOAT8_OID) => DataType::Float64,
        Some(NUMERIC_OID) => DataType::Decimal128(NUMERIC_PRECISION, NUMERIC_SCALE),
        Some(TEXT_OID) | Some(VARCHAR_OID) | Some(BPCHAR_OID) => DataType::Utf8,
        Some(DATE_OID) => DataType::Date32,
        _ => return Err(ExecError::UnknownTypeMdid(*type_mdid)),
    };
    Ok(data_type)
}

pub fn type_mdid(data_type: &DataType) -> Result<MdId> {
    let oid = match data_type {
        DataType::Boolean => BOOL_OID,
        DataType::Int16 => INT2_OID,
        DataType::Int32 => INT4_OID,
        DataType::Int64 => INT8_OID,
        DataType::UInt32 => OID_OID,
        DataType::Float32 => FLOAT4_OID,
        DataType::Float64 => FLOAT8_OID,
        DataType::Decimal128(_, _) => NUMERIC_OID,
        DataType::Utf8 => TEXT_OID,
        DataType::Date32 => DATE_OID,
        other => return Err(ExecError::UnsupportedType(other.clone())),
    };
    Ok(MdId::gpdb(oid))
}

/// Arrow schema of the batches an access method returns for `table`: the live
/// columns in descriptor order, all nullable.
pub fn table_schema(table: &TableDescr) -> Result<SchemaRef> {
    let fields = table
        .columns
        .iter()
        .filter(|c| !c.is_dropped)
        .map(|c| Ok(Field::new(&c.colref.name, arrow_type(&c.colref.type_mdid)?, true)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Arc::new(Schema::new(fields)))
}

/// A batch with no columns that still reports `rows` rows.
pub fn row_count_batch(schema: SchemaRef, rows: usize) -> Result<RecordBatch> {
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(schema, Vec::new(), &options)?)
}

/// `name:Type` pairs, for error messages.
pub fn describe(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("{}:{}", f.name(), f.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RewriteStrategy {
    #[default]
    ByName,
    ByPosition,
}

impl RewriteStrategy {
    /// Rewrite `batch` so that its schema is exactly `target`.
    pub fn rewrite(self, batch: &RecordBatch, target: &SchemaRef) -> Result<RecordBatch> {
        let source = batch.schema();
        let mismatch = |reason: String| ExecError::SchemaMismatch {
            expected: describe(target),
            found: describe(&source),
            reason,
        };

        if source.fields().len() != target.fields().len() {
            return Err(mismatch(format!(
                "{} columns, expected {}",
                source.fields().len(),
                target.fields().len()
            )));
        }
        if target.fields().is_empty() {
            return row_count_batch(target.clone(), batch.num_rows());
        }

        let options = CastOptions {
            safe: false,
            ..Default::default()
        };
        let mut columns = Vec::with_capacity(target.fields().len());
        for (position, field) in target.fields().iter().enumerate() {
            let index = match self {
                RewriteStrategy::ByName => source
                    .index_of(field.name())
                    .map_err(|_| mismatch(format!("no column named {}", field.name())))?,
                RewriteStrategy::ByPosition => position,
            };
            let column = batch.column(index);
            let column = if column.data_type() == field.data_type() {
                column.clone()
            } else if can_cast_types(column.data_type(), field.data_type()) {
                cast_with_options(column, field.data_type(), &options)
                    .map_err(|e| mismatch(format!("column {}: {e}", field.name())))?
            } else {
                return Err(mismatch(format!(
                    "column {} of type {} cannot be cast to {}",
                    field.name(),
                    column.data_type(),
                    field.data_type()
                )));
            };
            if !field.is_nullable() && column.null_count() > 0 {
                return Err(mismatch(format!(
                    "column {} has nulls but is declared NOT NULL",
                    field.name()
                )));
            }
            columns.push(column);
        }
        RecordBatch::try_new(target.clone(), columns).map_err(|e| mismatch(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, BooleanArray, Int32Array, Int64Array, StringArray};
    use dxl_core::colref::{ColRef, ColumnDescr};

    fn schema(fields: Vec<(&str, DataType, bool)>) -> SchemaRef {
        Arc::new(Schema::new(
            fields
                .into_iter()
                .map(|(name, ty, nullable)| Field::new(name, ty, nullable))
                .collect::<Vec<_>>(),
        ))
    }

    fn id_name_batch() -> RecordBatch {
        RecordBatch::try_new(
            schema(vec![("name", DataType::Utf8, true), ("id", DataType::Int32, true)]),
            vec![
                Arc::new(StringArray::from(vec!["x", "y"])) as ArrayRef,
                Arc::new(Int32Array::from(vec![1, 2])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rewrite_by_name_reorders_and_widens() {
        let target = schema(vec![("id", DataType::Int64, true), ("name", DataType::Utf8, true)]);
        let out = RewriteStrategy::ByName
            .rewrite(&id_name_batch(), &target)
            .unwrap();
        assert_eq!(out.schema(), target);
        let ids = out.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(ids.values().to_vec(), vec![1, 2]);
    }

    #[test]
    fn test_rewrite_by_position_renames() {
        let target = schema(vec![("label", DataType::Utf8, true), ("key", DataType::Int32, true)]);
        let out = RewriteStrategy::ByPosition
            .rewrite(&id_name_batch(), &target)
            .unwrap();
        assert_eq!(out.schema().field(1).name(), "key");
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn test_rewrite_by_name_missing_column() {
        let target = schema(vec![("id", DataType::Int32, true), ("label", DataType::Utf8, true)]);
        let err = RewriteStrategy::ByName
            .rewrite(&id_name_batch(), &target)
            .unwrap_err();
        assert!(matches!(err, ExecError::SchemaMismatch { ref reason, .. } if reason.contains("label")));
    }

    #[test]
    fn test_rewrite_rejects_uncastable_and_arity() {
        let batch = RecordBatch::try_new(
            schema(vec![("flag", DataType::Boolean, true)]),
            vec![Arc::new(BooleanArray::from(vec![true]))],
        )
        .unwrap();
        let target = schema(vec![("flag", DataType::Date32, true)]);
        assert!(matches!(
            RewriteStrategy::ByName.rewrite(&batch, &target),
            Err(ExecError::SchemaMismatch { .. })
        ));

        let wider = schema(vec![("flag", DataType::Boolean, true), ("x", DataType::Int32, true)]);
        assert!(matches!(
            RewriteStrategy::ByPosition.rewrite(&batch, &wider),
            Err(ExecError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_rewrite_rejects_nulls_into_not_null() {
        let batch = RecordBatch::try_new(
            schema(vec![("id", DataType::Int32, true)]),
            vec![Arc::new(Int32Array::from(vec![Some(1), None]))],
        )
        .unwrap();
        let target = schema(vec![("id", DataType::Int32, false)]);
        assert!(RewriteStrategy::ByName.rewrite(&batch, &target).is_err());
    }

    #[test]
    fn test_checked_cast_overflow_is_mismatch() {
        let batch = RecordBatch::try_new(
            schema(vec![("id", DataType::Int64, true)]),
            vec![Arc::new(Int64Array::from(vec![i64::MAX]))],
        )
        .unwrap();
        let target = schema(vec![("id", DataType::Int32, true)]);
        assert!(matches!(
            RewriteStrategy::ByName.rewrite(&batch, &target),
            Err(ExecError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(arrow_type(&MdId::gpdb(INT4_OID)).unwrap(), DataType::Int32);
        assert_eq!(arrow_type(&MdId::gpdb(VARCHAR_OID)).unwrap(), DataType::Utf8);
        assert_eq!(type_mdid(&DataType::Int64).unwrap(), MdId::gpdb(INT8_OID));
        assert!(matches!(
            arrow_type(&MdId::gpdb(600)),
            Err(ExecError::UnknownTypeMdid(_))
        ));
        assert!(matches!(
            type_mdid(&DataType::Float16),
            Err(ExecError::UnsupportedType(DataType::Float16))
        ));
    }

    #[test]
    fn test_table_schema_skips_dropped() {
        let a = ColRef::new(1, "a", MdId::gpdb(INT4_OID)).unwrap();
        let b = ColRef::new(2, "b", MdId::gpdb(TEXT_OID)).unwrap();
        let mut dropped = ColumnDescr::new(b, 2);
        dropped.is_dropped = true;
        let c = ColRef::new(3, "c", MdId::gpdb(BOOL_OID)).unwrap();
        let table = TableDescr::new(
            MdId::gpdb(16384),
            "t",
            vec![ColumnDescr::new(a, 1), dropped, ColumnDescr::new(c, 3)],
        )
        .unwrap();
        let schema = table_schema(&table).unwrap();
        assert_eq!(describe(&schema), "a:Int32, c:Boolean");
    }

    #[test]
    fn test_row_count_batch() {
        let batch = row_count_batch(Arc::new(Schema::empty()), 7).unwrap();
        assert_eq!(batch.num_columns(), 0);
        assert_eq!(batch.num_rows(), 7);
    }
}
