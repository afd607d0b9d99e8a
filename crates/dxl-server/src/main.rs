//! # dxl-server: HTTP Service for the DXL Codec
//!
//! Exposes the DXL XML codec and the structural validator over HTTP, so tools
//! that produce or inspect plans can check them without linking the crates.
//!
//! ## Endpoints
//!
//! - `GET  /health`         - Health check
//! - `GET  /operators`      - Operator catalog: ids, element names, class
//! - `POST /dxl/validate`   - Parse and validate a DXL plan or fragment (JSON report)
//! - `POST /dxl/normalize`  - Parse, validate and re-serialize in canonical form
//!
//! ## Configuration
//!
//! See `config`. Logging honours `RUST_LOG` on top of the `DXL_LOG` directive.

mod config;
mod routes;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::config::{ServiceConfig, DEFAULT_LOG_FILTER};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env();

    let directive: Directive = config
        .log_filter
        .parse()
        .or_else(|_| DEFAULT_LOG_FILTER.parse())?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    let listen_addr = config.listen_addr;
    let state = Arc::new(state::AppState::new(config));

    let app = Router::new()
        .route("/health", get(routes::health))
        .route("/operators", get(routes::list_operators))
        .route("/dxl/validate", post(routes::validate_dxl))
        .route("/dxl/normalize", post(routes::normalize_dxl))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!("dxl-server listening on http://{}", listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
