//! # Service Configuration
//!
//! Read once at startup from the environment:
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `DXL_LISTEN_ADDR` | `0.0.0.0:3000` | socket address to bind |
//! | `DXL_LOG` | `dxl=debug` | default tracing directive, added to `RUST_LOG` |
//! | `DXL_VALIDATE_CHILDREN` | `true` | validate whole trees, not only the root |
//! | `DXL_INDENT` | `true` | indent XML returned by `/dxl/normalize` |
//!
//! A value that does not parse is logged and replaced by its default.

use std::net::SocketAddr;
use tracing::warn;

pub const DEFAULT_LOG_FILTER: &str = "dxl=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub listen_addr: SocketAddr,
    pub log_filter: String,
    pub validate_children: bool,
    pub indent_output: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            validate_children: true,
            indent_output: true,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            listen_addr: parse_or("DXL_LISTEN_ADDR", lookup("DXL_LISTEN_ADDR"), defaults.listen_addr),
            log_filter: lookup("DXL_LOG")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            validate_children: parse_bool_or(
                "DXL_VALIDATE_CHILDREN",
                lookup("DXL_VALIDATE_CHILDREN"),
                defaults.validate_children,
            ),
            indent_output: parse_bool_or("DXL_INDENT", lookup("DXL_INDENT"), defaults.indent_output),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring invalid {}={:?}, using default", key, raw);
                default
            }
        },
    }
}

fn parse_bool_or(key: &str, raw: Option<String>, default: bool) -> bool {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => default,
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                warn!("Ignoring invalid {}={:?}, using default", key, v);
                default
            }
        },
    }
}
