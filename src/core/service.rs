//! Service traits for invoice persistence and customer lookup
//!
//! The dashboard is agnostic to the underlying storage mechanism; the
//! in-memory and PostgreSQL backends in [`crate::storage`] implement these.

use crate::core::invoice::{
    CardData, Customer, InvoiceForm, InvoiceListRow, InvoiceStatus, LatestInvoice, NewInvoice,
};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Invoice persistence
///
/// Every write is a single statement from the caller's perspective. No
/// method retries on failure.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new invoice and return the id the store assigned
    async fn create(&self, invoice: NewInvoice) -> Result<Uuid>;

    /// Overwrite customer, amount (cents) and status of an invoice
    ///
    /// Returns the number of affected rows; an unknown id affects zero rows
    /// and is not an error.
    async fn update(
        &self,
        id: &Uuid,
        customer_id: &str,
        amount_in_cents: i64,
        status: InvoiceStatus,
    ) -> Result<u64>;

    /// Hard delete by id
    async fn delete(&self, id: &Uuid) -> Result<()>;

    /// Edit view of one invoice
    async fn fetch_invoice_by_id(&self, id: &Uuid) -> Result<Option<InvoiceForm>>;

    /// One page of invoices matching `query`, newest first
    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<InvoiceListRow>>;

    /// Number of invoices matching `query`
    async fn count_filtered_invoices(&self, query: &str) -> Result<usize>;

    /// The five most recent invoices
    async fn fetch_latest_invoices(&self) -> Result<Vec<LatestInvoice>>;

    /// Overview totals
    async fn fetch_card_data(&self) -> Result<CardData>;
}

/// Read-only source of selectable customers
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// All customers ordered by name
    async fn fetch_customers(&self) -> Result<Vec<Customer>>;
}

/// Number of invoices shown on the overview
pub const LATEST_INVOICES: usize = 5;
