//! Overview and customer list

use crate::core::auth::{AuthContext, AuthenticatedUser};
use crate::core::error::DashboardResult;
use crate::core::invoice::{CardData, Customer, LatestInvoice};
use crate::server::host::ServerHost;
use axum::{
    Extension, Json,
    extract::State,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct OverviewResponse {
    pub user: Option<AuthenticatedUser>,
    pub cards: CardData,
    pub latest_invoices: Vec<LatestInvoice>,
}

/// GET /dashboard
///
/// Reads the card totals and the latest invoices concurrently.
pub async fn overview(
    State(host): State<Arc<ServerHost>>,
    Extension(auth): Extension<AuthContext>,
) -> DashboardResult<Json<OverviewResponse>> {
    let (cards, latest_invoices) = tokio::try_join!(
        host.store.fetch_card_data(),
        host.store.fetch_latest_invoices(),
    )?;

    Ok(Json(OverviewResponse {
        user: auth.user().cloned(),
        cards,
        latest_invoices,
    }))
}

/// GET /dashboard/customers
pub async fn list_customers(
    State(host): State<Arc<ServerHost>>,
) -> DashboardResult<Json<Vec<Customer>>> {
    Ok(Json(host.customers.fetch_customers().await?))
}
