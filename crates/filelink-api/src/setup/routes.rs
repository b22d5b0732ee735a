//! Route configuration and setup

use crate::constants::{FILE_ROUTE, HEALTH_ROUTE, STATUS_ROUTE, WATCH_ROUTE};
use crate::handlers;
use crate::middleware::{
    request_id_middleware, security_headers_middleware, RequestIdMakeSpan, SecurityHeadersConfig,
};
use crate::state::AppState;
use axum::{http::Method, routing::get, Router};
use filelink_core::Config;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    // Direct links are public; any origin may fetch them
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS]);

    let security_headers_config = Arc::new(SecurityHeadersConfig::new(config.is_production()));

    let app = Router::new()
        .route(STATUS_ROUTE, get(handlers::status::status_page))
        .route(HEALTH_ROUTE, get(handlers::health::liveness_check))
        .route(FILE_ROUTE, get(handlers::file_download::download_file))
        .route(WATCH_ROUTE, get(handlers::watch::watch_page))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(RequestIdMakeSpan))
                .layer(axum::middleware::from_fn_with_state(
                    security_headers_config,
                    security_headers_middleware,
                ))
                .layer(cors),
        )
        .with_state(state);

    Ok(app)
}
