//! # HTTP Route Handlers
//!
//! Every handler delegates to a plain function over `AppState` and the request
//! body, so the request processing is testable without a socket.
//!
//! ## Error Handling
//!
//! Errors are returned as HTTP status codes with descriptive messages:
//! - 400 Bad Request: the body is not well-formed DXL
//! - 422 Unprocessable Entity: `/dxl/normalize` was given a tree that fails
//!   validation (`/dxl/validate` reports those in its JSON body instead)
//! - 500 Internal Server Error: the tree could not be written back out

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

use dxl_core::DxlOpId;
use dxl_xml::{parse_dxl, serialize_node, serialize_plan, ParsedDxl, SerializerOptions};

use crate::state::AppState;

type ApiError = (StatusCode, String);

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /operators: every operator the codec understands.
pub async fn list_operators() -> impl IntoResponse {
    Json(OperatorsResponse {
        operators: operator_catalog(),
    })
}

#[derive(Serialize)]
pub struct OperatorsResponse {
    pub operators: Vec<OperatorInfo>,
}

#[derive(Serialize)]
pub struct OperatorInfo {
    pub id: DxlOpId,
    pub class: &'static str,
    pub element_names: Vec<&'static str>,
}

pub fn operator_catalog() -> Vec<OperatorInfo> {
    DxlOpId::ALL
        .iter()
        .map(|&id| OperatorInfo {
            id,
            class: if id.is_physical() { "physical" } else { "scalar" },
            element_names: id.element_names().to_vec(),
        })
        .collect()
}

/// POST /dxl/validate: parse a plan or fragment and report whether it is valid.
pub async fn validate_dxl(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    validate_document(&state, &body).map(Json)
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub root_operator: String,
    pub node_count: usize,
    pub errors: Vec<String>,
}

pub fn validate_document(state: &AppState, xml: &str) -> Result<ValidationReport, ApiError> {
    let parsed = parse(xml)?;
    let root = parsed.root();
    let errors = match root.validate(state.md_accessor.as_ref(), state.config.validate_children) {
        Ok(()) => Vec::new(),
        Err(e) => vec![e.to_string()],
    };
    debug!("Validated {} ({} nodes): {} error(s)", root.op.op_name(), root.node_count(), errors.len());
    Ok(ValidationReport {
        valid: errors.is_empty(),
        root_operator: root.op.op_name().to_string(),
        node_count: root.node_count(),
        errors,
    })
}

/// POST /dxl/normalize: parse, validate and re-serialize in canonical form.
pub async fn normalize_dxl(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let xml = normalize_document(&state, &body)?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

pub fn normalize_document(state: &AppState, xml: &str) -> Result<String, ApiError> {
    let parsed = parse(xml)?;
    parsed
        .root()
        .validate(state.md_accessor.as_ref(), state.config.validate_children)
        .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, format!("Invalid plan: {}", e)))?;

    let options = SerializerOptions {
        indent: state.config.indent_output,
        include_header: true,
    };
    let written = match &parsed {
        ParsedDxl::Plan(plan) => serialize_plan(plan, &options),
        ParsedDxl::Fragment(node) => serialize_node(node, &options),
    };
    written.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("Serialize error: {}", e)))
}

fn parse(xml: &str) -> Result<ParsedDxl, ApiError> {
    parse_dxl(xml).map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid DXL: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceConfig;

    const AND_FRAGMENT: &str = concat!(
        r#"<dxl:And>"#,
        r#"<dxl:IsNull><dxl:Ident ColId="3" ColName="x" TypeMdid="0.20.1.0"/></dxl:IsNull>"#,
        r#"<dxl:IsNotNull><dxl:Ident ColId="3" ColName="x" TypeMdid="0.20.1.0"/></dxl:IsNotNull>"#,
        r#"</dxl:And>"#,
    );

    const AND_OF_INTS: &str = concat!(
        r#"<dxl:And>"#,
        r#"<dxl:ConstValue TypeMdid="0.23.1.0" IsNull="false" IsByValue="true" Value="1"/>"#,
        r#"<dxl:ConstValue TypeMdid="0.23.1.0" IsNull="false" IsByValue="true" Value="2"/>"#,
        r#"</dxl:And>"#,
    );

    fn state() -> AppState {
        AppState::new(ServiceConfig {
            indent_output: false,
            ..ServiceConfig::default()
        })
    }

    #[test]
    fn test_operator_catalog_lists_everything() {
        let catalog = operator_catalog();
        assert_eq!(catalog.len(), DxlOpId::ALL.len());
        let scan = catalog
            .iter()
            .find(|op| op.id == DxlOpId::TableScan)
            .unwrap();
        assert_eq!(scan.class, "physical");
        assert!(catalog.iter().all(|op| !op.element_names.is_empty()));
    }

    #[test]
    fn test_validate_reports_valid_fragment() {
        let report = validate_document(&state(), AND_FRAGMENT).unwrap();
        assert!(report.valid);
        assert_eq!(report.root_operator, "And");
        assert_eq!(report.node_count, 5);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_validation_report_json_shape() {
        let report = validate_document(&state(), AND_FRAGMENT).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], true);
        assert_eq!(json["root_operator"], "And");
        assert_eq!(json["errors"], serde_json::json!([]));
    }

    #[test]
    fn test_validate_reports_errors_in_body() {
        let report = validate_document(&state(), AND_OF_INTS).unwrap();
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_malformed_input_is_bad_request() {
        let (status, message) = validate_document(&state(), "<dxl:And>").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.starts_with("Invalid DXL"));

        let (status, _) = normalize_document(&state(), "<dxl:NoSuchThing/>").unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let state = state();
        let once = normalize_document(&state, AND_FRAGMENT).unwrap();
        assert!(once.starts_with("<?xml"));
        assert!(once.contains(r#"<dxl:IsNull><dxl:Ident ColId="3""#));
        let twice = normalize_document(&state, &once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_rejects_invalid_tree() {
        let (status, _) = normalize_document(&state(), AND_OF_INTS).unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
