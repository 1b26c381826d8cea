//! REST API exposure for the dashboard
//!
//! The REST exposure consumes a `ServerHost` and produces an Axum `Router`
//! with the session middleware and request tracing applied.

use super::super::host::ServerHost;
use crate::server::middleware::session_middleware;
use crate::server::router::build_dashboard_routes;
use anyhow::Result;
use axum::{Json, Router, middleware::from_fn_with_state, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// # Arguments
    ///
    /// * `host` - The server host containing all dashboard state
    /// * `custom_routes` - Additional custom routes to merge
    ///
    /// # Returns
    ///
    /// Returns a fully configured Axum router with:
    /// - Health check routes
    /// - Login and dashboard routes
    /// - Custom routes
    ///
    /// Every route, custom ones included, passes through the session
    /// middleware.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes().merge(build_dashboard_routes(host.clone()));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app
            .layer(from_fn_with_state(host, session_middleware))
            .layer(TraceLayer::new_for_http()))
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "invoice-dashboard"
        }))
    }
}
