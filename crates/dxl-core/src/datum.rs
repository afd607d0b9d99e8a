//! # Datums
//!
//! Constant values carried by `ConstValue`. A datum is typed by a metadata id. The
//! built-in by-value types (bool, int2, int4, int8, oid) keep a native value. Every
//! other type keeps its encoded wire string, plus the optional integer and double
//! mappings the optimizer uses for statistics.
//!
//! `f64` mappings are wrapped in `OrderedFloat` so datums, and therefore operators,
//! keep `Eq` and `Hash`.

use crate::error::{DxlError, Result};
use crate::md_accessor::{BOOL_OID, INT2_OID, INT4_OID, INT8_OID, OID_OID};
use crate::mdid::MdId;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatumValue {
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Oid(u32),
    Generic {
        encoded: String,
        lint_value: Option<i64>,
        double_value: Option<OrderedFloat<f64>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Datum {
    pub type_mdid: MdId,
    pub type_mod: i32,
    pub by_value: bool,
    /// `None` means SQL NULL.
    pub value: Option<DatumValue>,
}

impl Datum {
    pub fn bool(v: bool) -> Self {
        Self::by_value(BOOL_OID, DatumValue::Bool(v))
    }

    pub fn int2(v: i16) -> Self {
        Self::by_value(INT2_OID, DatumValue::Int2(v))
    }

    pub fn int4(v: i32) -> Self {
        Self::by_value(INT4_OID, DatumValue::Int4(v))
    }

    pub fn int8(v: i64) -> Self {
        Self::by_value(INT8_OID, DatumValue::Int8(v))
    }

    pub fn oid(v: u32) -> Self {
        Self::by_value(OID_OID, DatumValue::Oid(v))
    }

    pub fn null(type_mdid: MdId, by_value: bool) -> Result<Self> {
        Ok(Self {
            type_mdid: type_mdid.require_valid("ConstValue", "TypeMdid")?,
            type_mod: -1,
            by_value,
            value: None,
        })
    }

    /// Datum of a type without a native mapping.
    pub fn generic(
        type_mdid: MdId,
        type_mod: i32,
        encoded: impl Into<String>,
        lint_value: Option<i64>,
        double_value: Option<f64>,
    ) -> Result<Self> {
        Ok(Self {
            type_mdid: type_mdid.require_valid("ConstValue", "TypeMdid")?,
            type_mod,
            by_value: false,
            value: Some(DatumValue::Generic {
                encoded: encoded.into(),
                lint_value,
                double_value: double_value.map(OrderedFloat),
            }),
        })
    }

    fn by_value(oid: u32, value: DatumValue) -> Self {
        Self {
            type_mdid: MdId::gpdb(oid),
            type_mod: -1,
            by_value: true,
            value: Some(value),
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Wire form of the value, `None` for NULL.
    pub fn value_string(&self) -> Option<String> {
        self.value.as_ref().map(|v| match v {
            DatumValue::Bool(b) => b.to_string(),
            DatumValue::Int2(i) => i.to_string(),
            DatumValue::Int4(i) => i.to_string(),
            DatumValue::Int8(i) => i.to_string(),
            DatumValue::Oid(o) => o.to_string(),
            DatumValue::Generic { encoded, .. } => encoded.clone(),
        })
    }

    pub fn lint_value(&self) -> Option<i64> {
        match &self.value {
            Some(DatumValue::Generic { lint_value, .. }) => *lint_value,
            _ => None,
        }
    }

    pub fn double_value(&self) -> Option<f64> {
        match &self.value {
            Some(DatumValue::Generic { double_value, .. }) => double_value.map(|d| d.0),
            _ => None,
        }
    }

    /// Rebuild a datum from its wire attributes. The native mapping is chosen by
    /// the type oid, and only for by-value datums without `LintValue` or
    /// `DoubleValue`; anything else keeps its encoded string.
    pub fn decode(
        type_mdid: MdId,
        type_mod: i32,
        is_null: bool,
        by_value: bool,
        value: Option<&str>,
        lint_value: Option<i64>,
        double_value: Option<f64>,
    ) -> Result<Self> {
        let type_mdid = type_mdid.require_valid("ConstValue", "TypeMdid")?;
        if is_null {
            return Ok(Self {
                type_mdid,
                type_mod,
                by_value,
                value: None,
            });
        }
        let raw = value.ok_or_else(|| {
            DxlError::Malformed("non-null ConstValue without a Value attribute".into())
        })?;
        let bad = || DxlError::Malformed(format!("invalid value '{}' for type {}", raw, type_mdid));
        let plain = by_value && lint_value.is_none() && double_value.is_none();
        let oid = if plain { type_mdid.oid() } else { None };
        let native = match (&type_mdid, oid) {
            (MdId::Gpdb(_), Some(BOOL_OID)) => Some(DatumValue::Bool(raw.parse().map_err(|_| bad())?)),
            (MdId::Gpdb(_), Some(INT2_OID)) => Some(DatumValue::Int2(raw.parse().map_err(|_| bad())?)),
            (MdId::Gpdb(_), Some(INT4_OID)) => Some(DatumValue::Int4(raw.parse().map_err(|_| bad())?)),
            (MdId::Gpdb(_), Some(INT8_OID)) => Some(DatumValue::Int8(raw.parse().map_err(|_| bad())?)),
            (MdId::Gpdb(_), Some(OID_OID)) => Some(DatumValue::Oid(raw.parse().map_err(|_| bad())?)),
            _ => None,
        };
        let value = native.unwrap_or_else(|| DatumValue::Generic {
            encoded: raw.to_string(),
            lint_value,
            double_value: double_value.map(OrderedFloat),
        });
        Ok(Self {
            type_mdid,
            type_mod,
            by_value,
            value: Some(value),
        })
    }
}
