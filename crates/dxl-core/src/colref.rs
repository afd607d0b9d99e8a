//! # Column References and Descriptors
//!
//! A column reference names one column in the query-wide column-id namespace.
//! It is created once by whichever operator defines the column (a table
//! descriptor, a project element) and is shared by every `Ident` and sub-plan
//! parameter that reads it. Sharing is through `Arc<ColRef>`, so the reference
//! lives exactly as long as its longest holder.
//!
//! Table and index descriptors are the nested descriptor elements that scan
//! operators carry. They are not operators themselves.

use crate::error::Result;
use crate::mdid::MdId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Type modifier value meaning "no modifier".
pub const DEFAULT_TYPE_MODIFIER: i32 = -1;

/// A column in the query-wide column-id namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColRef {
    pub name: String,
    pub id: u32,
    pub type_mdid: MdId,
    pub type_mod: i32,
    pub collation: Option<MdId>,
}

impl ColRef {
    pub fn new(id: u32, name: impl Into<String>, type_mdid: MdId) -> Result<Arc<Self>> {
        Self::with_modifier(id, name, type_mdid, DEFAULT_TYPE_MODIFIER, None)
    }

    pub fn with_modifier(
        id: u32,
        name: impl Into<String>,
        type_mdid: MdId,
        type_mod: i32,
        collation: Option<MdId>,
    ) -> Result<Arc<Self>> {
        let type_mdid = type_mdid.require_valid("ColRef", "TypeMdid")?;
        let collation = match collation {
            Some(c) => Some(c.require_valid("ColRef", "Collation")?),
            None => None,
        };
        Ok(Arc::new(Self {
            name: name.into(),
            id,
            type_mdid,
            type_mod,
            collation,
        }))
    }
}

impl fmt::Display for ColRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Column of a table descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescr {
    pub colref: Arc<ColRef>,
    /// Attribute number in the relation; system columns are negative.
    pub attno: i32,
    pub width: Option<u32>,
    pub is_dropped: bool,
}

impl ColumnDescr {
    pub fn new(colref: Arc<ColRef>, attno: i32) -> Self {
        Self {
            colref,
            attno,
            width: None,
            is_dropped: false,
        }
    }
}

/// Relation scanned by a scan operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableDescr {
    pub mdid: MdId,
    pub name: String,
    pub execute_as_user: Option<u32>,
    pub columns: Vec<ColumnDescr>,
}

impl TableDescr {
    pub fn new(mdid: MdId, name: impl Into<String>, columns: Vec<ColumnDescr>) -> Result<Self> {
        Ok(Self {
            mdid: mdid.require_valid("TableDescriptor", "Mdid")?,
            name: name.into(),
            execute_as_user: None,
            columns,
        })
    }

    pub fn column_by_id(&self, id: u32) -> Option<&ColumnDescr> {
        self.columns.iter().find(|c| c.colref.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexDescr {
    pub mdid: MdId,
    pub name: String,
}

impl IndexDescr {
    pub fn new(mdid: MdId, name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            mdid: mdid.require_valid("IndexDescriptor", "Mdid")?,
            name: name.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DxlError;

    #[test]
    fn test_colref_rejects_invalid_type() {
        let err = ColRef::new(1, "a", MdId::invalid()).unwrap_err();
        assert_eq!(
            err,
            DxlError::InvalidMdId {
                op: "ColRef",
                attr: "TypeMdid"
            }
        );
    }

    #[test]
    fn test_colref_is_shared() {
        let a = ColRef::new(7, "a", MdId::gpdb(23)).unwrap();
        let table = TableDescr::new(
            MdId::gpdb(16384),
            "t",
            vec![ColumnDescr::new(a.clone(), 1)],
        )
        .unwrap();
        assert!(Arc::ptr_eq(&table.column_by_id(7).unwrap().colref, &a));
        assert_eq!(a.to_string(), "a#7");
    }
}
