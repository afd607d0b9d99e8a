//! # Application State
//!
//! Created once at startup and shared with every handler through `Arc`. The
//! metadata accessor answers the type, function and aggregate lookups the
//! validator makes; the service ships with the built-in catalog types.

use crate::config::ServiceConfig;
use dxl_core::md_accessor::InMemoryMdAccessor;
use dxl_core::MdAccessor;
use std::sync::Arc;

pub struct AppState {
    pub md_accessor: Arc<dyn MdAccessor>,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_accessor(Arc::new(InMemoryMdAccessor::with_builtin_types()), config)
    }

    pub fn with_accessor(md_accessor: Arc<dyn MdAccessor>, config: ServiceConfig) -> Self {
        Self {
            md_accessor,
            config,
        }
    }
}
