//! # Metadata Accessor
//!
//! Operators never store catalog facts beyond the ids they reference. When an
//! operator needs to know whether it yields a boolean (an `Ident` over a bool
//! column, a `FuncExpr` over a predicate function) it asks the metadata accessor.
//!
//! ## Trait Design
//!
//! `MdAccessor` is a trait object (`dyn MdAccessor`) so that different backends can
//! provide metadata: a relcache-backed accessor inside the database, or the
//! `InMemoryMdAccessor` here, which is populated programmatically for tests and
//! for the service.
//!
//! ## Key Lookups
//!
//! - `lookup_type`: type tag of a type id.
//! - `lookup_function`: declared result type of a function.
//! - `lookup_aggregate`: declared result type of an aggregate.
//! - `lookup_scalar_op`: result type of a scalar operator (used by `OpExpr`).
//!
//! Lookups can miss. A miss is a `MetadataLookup` error, never a silent `false`.
//!
//! ## Pinning
//!
//! Every id registered with the in-memory accessor is interned in its
//! `MdIdCache`. `pin` takes a deletion lock on the cached entry and `evict`
//! refuses to drop a pinned entry.

use crate::error::{DxlError, Result};
use crate::mdid::{MdId, MdIdCache, MdIdEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const BOOL_OID: u32 = 16;
pub const INT8_OID: u32 = 20;
pub const INT2_OID: u32 = 21;
pub const INT4_OID: u32 = 23;
pub const TEXT_OID: u32 = 25;
pub const OID_OID: u32 = 26;
pub const FLOAT4_OID: u32 = 700;
pub const FLOAT8_OID: u32 = 701;
pub const NUMERIC_OID: u32 = 1700;

/// Coarse classification of a type, enough to answer "is this boolean".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    Int2,
    Int4,
    Int8,
    Oid,
    Float4,
    Float8,
    Numeric,
    Text,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub mdid: MdId,
    pub name: String,
    pub tag: TypeTag,
    pub by_value: bool,
    /// Fixed length in bytes, `-1` for varlena types.
    pub length: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub mdid: MdId,
    pub name: String,
    pub result_type: MdId,
    pub returns_set: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateDescriptor {
    pub mdid: MdId,
    pub name: String,
    pub result_type: MdId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarOpDescriptor {
    pub mdid: MdId,
    pub name: String,
    pub left_type: Option<MdId>,
    pub right_type: Option<MdId>,
    pub result_type: MdId,
}

/// Catalog lookups consumed by `has_bool_result`.
pub trait MdAccessor: Send + Sync {
    fn lookup_type(&self, mdid: &MdId) -> Result<TypeDescriptor>;
    fn lookup_function(&self, mdid: &MdId) -> Result<FunctionDescriptor>;
    fn lookup_aggregate(&self, mdid: &MdId) -> Result<AggregateDescriptor>;
    fn lookup_scalar_op(&self, mdid: &MdId) -> Result<ScalarOpDescriptor>;

    fn is_bool_type(&self, mdid: &MdId) -> Result<bool> {
        Ok(self.lookup_type(mdid)?.tag == TypeTag::Bool)
    }
}

/// In-memory accessor for testing and development.
///
/// Descriptors are keyed by their id. The accessor is populated programmatically
/// and does not persist across restarts.
#[derive(Debug, Default)]
pub struct InMemoryMdAccessor {
    types: HashMap<MdId, TypeDescriptor>,
    functions: HashMap<MdId, FunctionDescriptor>,
    aggregates: HashMap<MdId, AggregateDescriptor>,
    scalar_ops: HashMap<MdId, ScalarOpDescriptor>,
    cache: MdIdCache,
}

impl InMemoryMdAccessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accessor preloaded with the common built-in GPDB types.
    pub fn with_builtin_types() -> Self {
        let mut md = Self::new();
        let builtins = [
            (BOOL_OID, "bool", TypeTag::Bool, true, 1),
            (INT8_OID, "int8", TypeTag::Int8, true, 8),
            (INT2_OID, "int2", TypeTag::Int2, true, 2),
            (INT4_OID, "int4", TypeTag::Int4, true, 4),
            (TEXT_OID, "text", TypeTag::Text, false, -1),
            (OID_OID, "oid", TypeTag::Oid, true, 4),
            (FLOAT4_OID, "float4", TypeTag::Float4, true, 4),
            (FLOAT8_OID, "float8", TypeTag::Float8, true, 8),
            (NUMERIC_OID, "numeric", TypeTag::Numeric, false, -1),
        ];
        for (oid, name, tag, by_value, length) in builtins {
            md.add_type(TypeDescriptor {
                mdid: MdId::gpdb(oid),
                name: name.to_string(),
                tag,
                by_value,
                length,
            });
        }
        md
    }

    pub fn add_type(&mut self, desc: TypeDescriptor) {
        self.cache.intern(desc.mdid);
        self.types.insert(desc.mdid, desc);
    }

    pub fn add_function(&mut self, desc: FunctionDescriptor) {
        self.cache.intern(desc.mdid);
        self.functions.insert(desc.mdid, desc);
    }

    pub fn add_aggregate(&mut self, desc: AggregateDescriptor) {
        self.cache.intern(desc.mdid);
        self.aggregates.insert(desc.mdid, desc);
    }

    pub fn add_scalar_op(&mut self, desc: ScalarOpDescriptor) {
        self.cache.intern(desc.mdid);
        self.scalar_ops.insert(desc.mdid, desc);
    }

    /// Shared cache entry of a registered id.
    pub fn entry(&self, mdid: &MdId) -> Option<Arc<MdIdEntry>> {
        self.cache.get(mdid)
    }

    /// Take a deletion lock on a registered id.
    pub fn pin(&self, mdid: &MdId) -> Result<()> {
        self.cached(mdid)?.add_deletion_lock();
        Ok(())
    }

    pub fn unpin(&self, mdid: &MdId) -> Result<()> {
        self.cached(mdid)?.remove_deletion_lock()
    }

    /// Forget every descriptor registered under `mdid`.
    ///
    /// Pinned ids are refused with `MdIdLocked`. Returns whether the id was
    /// dropped from the cache.
    pub fn evict(&mut self, mdid: &MdId) -> Result<bool> {
        let dropped = self.cache.release(mdid)?;
        if dropped {
            self.types.remove(mdid);
            self.functions.remove(mdid);
            self.aggregates.remove(mdid);
            self.scalar_ops.remove(mdid);
        }
        Ok(dropped)
    }

    pub fn cached_ids(&self) -> usize {
        self.cache.len()
    }

    fn cached(&self, mdid: &MdId) -> Result<Arc<MdIdEntry>> {
        self.cache.get(mdid).ok_or(DxlError::MetadataLookup {
            kind: "object",
            mdid: *mdid,
        })
    }
}

fn lookup<T: Clone>(map: &HashMap<MdId, T>, kind: &'static str, mdid: &MdId) -> Result<T> {
    map.get(mdid)
        .cloned()
        .ok_or(DxlError::MetadataLookup { kind, mdid: *mdid })
}

impl MdAccessor for InMemoryMdAccessor {
    fn lookup_type(&self, mdid: &MdId) -> Result<TypeDescriptor> {
        lookup(&self.types, "type", mdid)
    }

    fn lookup_function(&self, mdid: &MdId) -> Result<FunctionDescriptor> {
        lookup(&self.functions, "function", mdid)
    }

    fn lookup_aggregate(&self, mdid: &MdId) -> Result<AggregateDescriptor> {
        lookup(&self.aggregates, "aggregate", mdid)
    }

    fn lookup_scalar_op(&self, mdid: &MdId) -> Result<ScalarOpDescriptor> {
        lookup(&self.scalar_ops, "operator", mdid)
    }
}
