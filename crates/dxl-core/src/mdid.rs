//! # Metadata Identifiers
//!
//! A metadata id (`MdId`) names a catalog object: a type, function, operator,
//! cast, comparison or statistics object. Operators in the DXL tree refer to the
//! catalog exclusively through these ids and never embed catalog knowledge.
//!
//! ## Identity
//!
//! Ids are plain values whose identity is their content. Two ids parsed from the
//! same wire string are equal and hash identically, so an `MdId` can key a hash
//! map directly and can be cloned freely into every operator that needs it.
//!
//! ## Wire Form
//!
//! ```text
//! <kind>.<component>.<component>...
//! 0.23.1.0              GPDB object: oid 23, version 1.0
//! 1.16384.1.0.2         column statistics: relation 16384 v1.0, attno 2
//! 3.23.1.0.20.1.0       cast: int4 -> int8
//! 4.23.1.0.23.1.0.0     scalar comparison: int4 = int4
//! ```
//!
//! ## Deletion Locks
//!
//! Caches that hand out ids pin them with deletion locks. A pinned entry is never
//! evicted, even when no operator holds it any more. Locks live on the shared
//! `MdIdEntry` produced by `MdIdCache::intern` and are mutated atomically, since
//! several accessors in one process may pin and unpin the same id concurrently.

use crate::error::{DxlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock};

/// System that owns every id produced by this crate.
pub const GPDB_SYSTEM_ID: &str = "GPDB";

/// Oid + version triple shared by every GPDB-backed id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GpdbOid {
    pub oid: u32,
    pub major: u32,
    pub minor: u32,
}

impl GpdbOid {
    pub fn new(oid: u32) -> Self {
        Self {
            oid,
            major: 1,
            minor: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.oid != 0
    }
}

impl fmt::Display for GpdbOid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.oid, self.major, self.minor)
    }
}

/// Stable discriminant of a metadata id. The numeric value is the first wire
/// component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MdIdKind {
    Gpdb = 0,
    ColStats = 1,
    RelStats = 2,
    CastFunc = 3,
    ScCmp = 4,
    GpdbCtas = 5,
}

impl MdIdKind {
    pub fn from_u32(value: u32) -> Result<Self> {
        match value {
            0 => Ok(MdIdKind::Gpdb),
            1 => Ok(MdIdKind::ColStats),
            2 => Ok(MdIdKind::RelStats),
            3 => Ok(MdIdKind::CastFunc),
            4 => Ok(MdIdKind::ScCmp),
            5 => Ok(MdIdKind::GpdbCtas),
            other => Err(DxlError::UnsupportedMdIdType(other)),
        }
    }
}

/// Comparison kind carried by scalar-comparison ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpType {
    Eq = 0,
    NotEq = 1,
    Lt = 2,
    LtEq = 3,
    Gt = 4,
    GtEq = 5,
    IsDistinctFrom = 6,
    Other = 7,
}

impl CmpType {
    pub fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => CmpType::Eq,
            1 => CmpType::NotEq,
            2 => CmpType::Lt,
            3 => CmpType::LtEq,
            4 => CmpType::Gt,
            5 => CmpType::GtEq,
            6 => CmpType::IsDistinctFrom,
            7 => CmpType::Other,
            _ => return None,
        })
    }
}

/// Identifier of a catalog object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MdId {
    Gpdb(GpdbOid),
    ColStats { rel: GpdbOid, attno: u32 },
    RelStats { rel: GpdbOid },
    CastFunc { src: GpdbOid, dest: GpdbOid },
    ScCmp {
        left: GpdbOid,
        right: GpdbOid,
        cmp_type: CmpType,
    },
    GpdbCtas { oid: u32 },
}

impl MdId {
    /// GPDB object id with the default 1.0 version.
    pub fn gpdb(oid: u32) -> Self {
        MdId::Gpdb(GpdbOid::new(oid))
    }

    /// The invalid id (oid 0). Constructors reject it.
    pub fn invalid() -> Self {
        MdId::Gpdb(GpdbOid {
            oid: 0,
            major: 0,
            minor: 0,
        })
    }

    pub fn kind(&self) -> MdIdKind {
        match self {
            MdId::Gpdb(_) => MdIdKind::Gpdb,
            MdId::ColStats { .. } => MdIdKind::ColStats,
            MdId::RelStats { .. } => MdIdKind::RelStats,
            MdId::CastFunc { .. } => MdIdKind::CastFunc,
            MdId::ScCmp { .. } => MdIdKind::ScCmp,
            MdId::GpdbCtas { .. } => MdIdKind::GpdbCtas,
        }
    }

    pub fn system_id(&self) -> &'static str {
        GPDB_SYSTEM_ID
    }

    pub fn is_valid(&self) -> bool {
        match self {
            MdId::Gpdb(o) => o.is_valid(),
            MdId::ColStats { rel, .. } | MdId::RelStats { rel } => rel.is_valid(),
            MdId::CastFunc { src, dest } => src.is_valid() && dest.is_valid(),
            MdId::ScCmp { left, right, .. } => left.is_valid() && right.is_valid(),
            MdId::GpdbCtas { oid } => *oid != 0,
        }
    }

    /// Null-safe validity check: `None` is never valid.
    pub fn is_valid_opt(mdid: Option<&MdId>) -> bool {
        mdid.map_or(false, MdId::is_valid)
    }

    /// Oid of a plain GPDB id, `None` for composite kinds.
    pub fn oid(&self) -> Option<u32> {
        match self {
            MdId::Gpdb(o) => Some(o.oid),
            MdId::GpdbCtas { oid } => Some(*oid),
            _ => None,
        }
    }

    /// Content hash, consistent with `Eq`.
    pub fn hash_value(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Reject the invalid id on behalf of an operator constructor.
    pub(crate) fn require_valid(self, op: &'static str, attr: &'static str) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(DxlError::InvalidMdId { op, attr })
        }
    }
}

impl fmt::Display for MdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind() as u32;
        match self {
            MdId::Gpdb(o) => write!(f, "{}.{}", kind, o),
            MdId::ColStats { rel, attno } => write!(f, "{}.{}.{}", kind, rel, attno),
            MdId::RelStats { rel } => write!(f, "{}.{}", kind, rel),
            MdId::CastFunc { src, dest } => write!(f, "{}.{}.{}", kind, src, dest),
            MdId::ScCmp {
                left,
                right,
                cmp_type,
            } => write!(f, "{}.{}.{}.{}", kind, left, right, *cmp_type as u32),
            MdId::GpdbCtas { oid } => write!(f, "{}.{}.1.0", kind, oid),
        }
    }
}

impl FromStr for MdId {
    type Err = DxlError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || DxlError::MalformedMdId(s.to_string());
        let parts: Vec<u32> = s
            .split('.')
            .map(|p| p.parse::<u32>().map_err(|_| malformed()))
            .collect::<Result<_>>()?;
        let (&kind, rest) = parts.split_first().ok_or_else(malformed)?;
        let oid_at = |i: usize| GpdbOid {
            oid: rest[i],
            major: rest[i + 1],
            minor: rest[i + 2],
        };
        let kind = MdIdKind::from_u32(kind)?;
        let expected = match kind {
            MdIdKind::Gpdb | MdIdKind::RelStats | MdIdKind::GpdbCtas => 3,
            MdIdKind::ColStats => 4,
            MdIdKind::CastFunc => 6,
            MdIdKind::ScCmp => 7,
        };
        if rest.len() != expected {
            return Err(malformed());
        }
        Ok(match kind {
            MdIdKind::Gpdb => MdId::Gpdb(oid_at(0)),
            MdIdKind::ColStats => MdId::ColStats {
                rel: oid_at(0),
                attno: rest[3],
            },
            MdIdKind::RelStats => MdId::RelStats { rel: oid_at(0) },
            MdIdKind::CastFunc => MdId::CastFunc {
                src: oid_at(0),
                dest: oid_at(3),
            },
            MdIdKind::ScCmp => MdId::ScCmp {
                left: oid_at(0),
                right: oid_at(3),
                cmp_type: CmpType::from_u32(rest[6]).ok_or_else(malformed)?,
            },
            MdIdKind::GpdbCtas => MdId::GpdbCtas { oid: rest[0] },
        })
    }
}

/// A cached id together with its deletion-lock counter.
#[derive(Debug)]
pub struct MdIdEntry {
    id: MdId,
    deletion_locks: AtomicU32,
}

impl MdIdEntry {
    pub fn new(id: MdId) -> Self {
        Self {
            id,
            deletion_locks: AtomicU32::new(0),
        }
    }

    pub fn id(&self) -> &MdId {
        &self.id
    }

    pub fn add_deletion_lock(&self) {
        self.deletion_locks.fetch_add(1, Ordering::AcqRel);
    }

    /// Fails without changing the counter when no lock is outstanding.
    pub fn remove_deletion_lock(&self) -> Result<()> {
        self.deletion_locks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| DxlError::DeletionLockUnderflow(self.id))
    }

    pub fn deletion_locks(&self) -> u32 {
        self.deletion_locks.load(Ordering::Acquire)
    }

    pub fn is_deletable(&self) -> bool {
        self.deletion_locks() == 0
    }
}

/// Interning cache of metadata ids.
///
/// Every holder receives the same `Arc<MdIdEntry>` for equal ids, so a lock taken
/// through one handle is visible through all of them.
#[derive(Debug, Default)]
pub struct MdIdCache {
    entries: RwLock<HashMap<MdId, Arc<MdIdEntry>>>,
}

impl MdIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, id: MdId) -> Arc<MdIdEntry> {
        if let Some(entry) = self.get(&id) {
            return entry;
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(id)
            .or_insert_with(|| Arc::new(MdIdEntry::new(id)))
            .clone()
    }

    pub fn get(&self, id: &MdId) -> Option<Arc<MdIdEntry>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(id).cloned()
    }

    /// Drop the cache's reference to `id`.
    ///
    /// Returns `Ok(true)` when the entry was removed, `Ok(false)` when another
    /// holder still references it or it was never cached, and `MdIdLocked` while
    /// a deletion lock is outstanding.
    pub fn release(&self, id: &MdId) -> Result<bool> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let Some(entry) = entries.get(id) else {
            return Ok(false);
        };
        if !entry.is_deletable() {
            return Err(DxlError::MdIdLocked(*id));
        }
        if Arc::strong_count(entry) > 1 {
            return Ok(false);
        }
        entries.remove(id);
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
