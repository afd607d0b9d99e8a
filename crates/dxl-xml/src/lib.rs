//! # DXL XML Wire Format
//!
//! This crate provides bidirectional conversion between the DXL XML wire format
//! and the `dxl-core` operator tree. DXL is how plans travel between the
//! optimizer and the executor, and between processes when a plan is shipped to
//! worker segments.
//!
//! ## Round Trip
//!
//! Producer and consumer agree on every element and attribute name (see
//! `tokens`), on attribute order and on value formatting, so for any valid tree
//! `serialize(parse(serialize(tree)))` is byte-identical to `serialize(tree)`.
//!
//! ## Module Overview
//!
//! - **`serializer`**: Streaming `OpenElement`/`AddAttribute`/`CloseElement`
//!   writer over quick-xml.
//! - **`producer`**: Operator tree -> DXL XML.
//! - **`consumer`**: DXL XML -> operator tree, strict about unknown input.
//! - **`tokens`**: Element and attribute names.

pub mod consumer;
pub mod producer;
pub mod serializer;
pub mod tokens;

pub use consumer::{parse_dxl, parse_node, parse_plan, ConsumeError, ParsedDxl};
pub use producer::{serialize_node, serialize_plan};
pub use serializer::{ProduceError, SerializerOptions, XmlSerializer};
