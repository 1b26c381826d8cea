//! Invoice list, forms and actions

use super::{outcome_response, parse_invoice_id};
use crate::core::actions::{
    ActionState, INVOICES_PATH, create_invoice, delete_invoice, update_invoice,
};
use crate::core::error::{DashboardError, DashboardResult, RequestError};
use crate::core::invoice::{Customer, InvoiceForm, InvoiceListRow};
use crate::core::query::{PageLink, PaginationMeta, SearchParams, page_links};
use crate::core::validation::{ActionForm, RawInvoiceForm};
use crate::server::host::ServerHost;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::sync::Arc;

/// Reports whether a list response came from the view cache
pub const CACHE_HEADER: HeaderName = HeaderName::from_static("x-view-cache");

/// Response for the invoice list
#[derive(Debug, Serialize)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceListRow>,
    pub query: String,
    pub pagination: PaginationMeta,
    pub pages: Vec<PageLink>,
}

#[derive(Debug, Serialize)]
pub struct CreatePageResponse {
    pub customers: Vec<Customer>,
}

#[derive(Debug, Serialize)]
pub struct EditPageResponse {
    pub invoice: InvoiceForm,
    pub customers: Vec<Customer>,
}

/// List invoices matching the search, one page at a time
///
/// GET /dashboard/invoices?query=...&page=...
///
/// The payload is cached per page and query until an action revalidates
/// the list.
pub async fn list_invoices(
    State(host): State<Arc<ServerHost>>,
    Query(params): Query<SearchParams>,
) -> DashboardResult<Response> {
    // canonical `path?page=N&query=...`, whatever order the client used
    let key = params.page_href(INVOICES_PATH, params.page());

    if let Some(cached) = host.view_cache.get(&key).map_err(internal)? {
        return Ok(with_cache_header(Json(cached.body).into_response(), "hit"));
    }

    let per_page = host.items_per_page();
    let (invoices, total) = tokio::try_join!(
        host.store
            .fetch_filtered_invoices(params.query(), params.page(), per_page),
        host.store.count_filtered_invoices(params.query()),
    )?;

    let pagination = PaginationMeta::new(params.page(), per_page, total);
    let body = InvoiceListResponse {
        pages: page_links(INVOICES_PATH, &params, pagination.total_pages),
        invoices,
        query: params.query().to_string(),
        pagination,
    };

    let body =
        serde_json::to_value(&body).map_err(|e| DashboardError::Internal(e.to_string()))?;
    host.view_cache.put(key, body.clone()).map_err(internal)?;

    Ok(with_cache_header(Json(body).into_response(), "miss"))
}

/// Data for the create form
///
/// GET /dashboard/invoices/create
pub async fn create_page(
    State(host): State<Arc<ServerHost>>,
) -> DashboardResult<Json<CreatePageResponse>> {
    let customers = host.customers.fetch_customers().await?;
    Ok(Json(CreatePageResponse { customers }))
}

/// Create an invoice
///
/// POST /dashboard/invoices
pub async fn create(
    State(host): State<Arc<ServerHost>>,
    ActionForm(form): ActionForm<RawInvoiceForm>,
) -> DashboardResult<Response> {
    let outcome = create_invoice(&host.action_context(), &ActionState::default(), &form).await?;
    Ok(outcome_response(outcome))
}

/// Data for the edit form
///
/// GET /dashboard/invoices/{id}/edit
///
/// The invoice and the customer list are read concurrently; the page is
/// only produced when both reads succeed.
pub async fn edit_page(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> DashboardResult<Json<EditPageResponse>> {
    let id = parse_invoice_id(&id)?;

    let (invoice, customers) = tokio::try_join!(
        host.store.fetch_invoice_by_id(&id),
        host.customers.fetch_customers(),
    )?;

    let invoice = invoice.ok_or_else(|| RequestError::NotFound {
        resource: "invoice".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(EditPageResponse { invoice, customers }))
}

/// Update an invoice
///
/// PUT /dashboard/invoices/{id}
/// POST /dashboard/invoices/{id}
pub async fn update(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
    ActionForm(form): ActionForm<RawInvoiceForm>,
) -> DashboardResult<Response> {
    let id = parse_invoice_id(&id)?;
    let outcome =
        update_invoice(&host.action_context(), &id, &ActionState::default(), &form).await?;
    Ok(outcome_response(outcome))
}

/// Delete an invoice
///
/// DELETE /dashboard/invoices/{id}
/// POST /dashboard/invoices/{id}/delete
pub async fn delete(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> DashboardResult<Response> {
    let id = parse_invoice_id(&id)?;
    let outcome = delete_invoice(&host.action_context(), &id).await?;
    Ok(outcome_response(outcome))
}

fn internal(e: anyhow::Error) -> DashboardError {
    DashboardError::Internal(format!("view cache: {:#}", e))
}

fn with_cache_header(mut response: Response, status: &'static str) -> Response {
    response
        .headers_mut()
        .insert(CACHE_HEADER, HeaderValue::from_static(status));
    response
}
