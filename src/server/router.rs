//! Router builder utilities for dashboard routes

use crate::server::handlers::{auth, dashboard, invoices};
use crate::server::host::ServerHost;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

/// Build the login and dashboard routes
///
/// - GET /login - Login form description
/// - POST /login - Sign in
/// - POST /logout - Sign out
/// - GET /dashboard - Overview cards and latest invoices
/// - GET /dashboard/customers - Customer list
/// - GET /dashboard/invoices - Filtered, paginated invoice list
/// - POST /dashboard/invoices - Create invoice
/// - GET /dashboard/invoices/create - Create form data
/// - PUT/POST /dashboard/invoices/{id} - Update invoice
/// - DELETE /dashboard/invoices/{id} - Delete invoice
/// - GET /dashboard/invoices/{id}/edit - Edit form data
/// - POST /dashboard/invoices/{id}/delete - Delete invoice (form submit)
pub fn build_dashboard_routes(host: Arc<ServerHost>) -> Router {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(dashboard::overview))
        .route("/dashboard/customers", get(dashboard::list_customers))
        .route(
            "/dashboard/invoices",
            get(invoices::list_invoices).post(invoices::create),
        )
        .route("/dashboard/invoices/create", get(invoices::create_page))
        .route(
            "/dashboard/invoices/{id}",
            post(invoices::update)
                .put(invoices::update)
                .delete(invoices::delete),
        )
        .route("/dashboard/invoices/{id}/edit", get(invoices::edit_page))
        .route("/dashboard/invoices/{id}/delete", post(invoices::delete))
        .with_state(host)
}
