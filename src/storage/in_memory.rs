//! In-memory implementation of InvoiceStore and CustomerDirectory for
//! testing and development

use crate::core::invoice::{
    CardData, Customer, Invoice, InvoiceForm, InvoiceListRow, InvoiceStatus, LatestInvoice,
    NewInvoice, format_currency,
};
use crate::core::query::page_offset;
use crate::core::service::{CustomerDirectory, InvoiceStore, LATEST_INVOICES};
use crate::storage::demo;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory invoice store
///
/// Useful for testing and development. Uses RwLock for thread-safe access.
/// Invoices keep insertion order so that invoices sharing a date list the
/// most recently inserted first.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    customers: Arc<RwLock<Vec<Customer>>>,
    invoices: Arc<RwLock<Vec<Invoice>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the demo customers and invoices
    pub fn with_demo_data() -> Self {
        Self {
            customers: Arc::new(RwLock::new(demo::customers())),
            invoices: Arc::new(RwLock::new(demo::invoices())),
        }
    }

    pub fn add_customer(&self, customer: Customer) -> Result<()> {
        let mut customers = self
            .customers
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        customers.retain(|c| c.id != customer.id);
        customers.push(customer);
        Ok(())
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.read().map(|i| i.len()).unwrap_or(0)
    }

    pub fn invoice(&self, id: &Uuid) -> Option<Invoice> {
        let invoices = self.invoices.read().ok()?;
        invoices.iter().find(|i| &i.id == id).cloned()
    }

    /// Latest by date, then by insertion
    pub fn newest_invoice(&self) -> Option<Invoice> {
        let invoices = self.invoices.read().ok()?;
        invoices
            .iter()
            .enumerate()
            .max_by_key(|(seq, invoice)| (invoice.date, *seq))
            .map(|(_, invoice)| invoice.clone())
    }

    pub fn first_customer_id(&self) -> Option<String> {
        let customers = self.customers.read().ok()?;
        customers.first().map(|c| c.id.clone())
    }

    /// Invoices joined with their customers, newest first
    ///
    /// Invoices whose customer is unknown are left out, like an inner join.
    fn joined_rows(&self) -> Result<Vec<InvoiceListRow>> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut rows: Vec<InvoiceListRow> = invoices
            .iter()
            .rev()
            .filter_map(|invoice| {
                customers
                    .iter()
                    .find(|c| c.id == invoice.customer_id)
                    .map(|customer| InvoiceListRow::from_parts(invoice, customer))
            })
            .collect();

        // stable: equal dates keep newest-inserted first
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn create(&self, invoice: NewInvoice) -> Result<Uuid> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = Uuid::new_v4();
        invoices.push(Invoice {
            id,
            customer_id: invoice.customer_id,
            amount: invoice.amount_in_cents,
            status: invoice.status,
            date: invoice.date,
        });

        Ok(id)
    }

    async fn update(
        &self,
        id: &Uuid,
        customer_id: &str,
        amount_in_cents: i64,
        status: InvoiceStatus,
    ) -> Result<u64> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(invoice) = invoices.iter_mut().find(|i| &i.id == id) else {
            return Ok(0);
        };

        invoice.customer_id = customer_id.to_string();
        invoice.amount = amount_in_cents;
        invoice.status = status;

        Ok(1)
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        invoices.retain(|i| &i.id != id);

        Ok(())
    }

    async fn fetch_invoice_by_id(&self, id: &Uuid) -> Result<Option<InvoiceForm>> {
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(invoices
            .iter()
            .find(|i| &i.id == id)
            .map(InvoiceForm::from))
    }

    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<InvoiceListRow>> {
        let offset = page_offset(page, per_page);

        Ok(self
            .joined_rows()?
            .into_iter()
            .filter(|row| row.matches(query))
            .skip(offset)
            .take(per_page)
            .collect())
    }

    async fn count_filtered_invoices(&self, query: &str) -> Result<usize> {
        Ok(self
            .joined_rows()?
            .iter()
            .filter(|row| row.matches(query))
            .count())
    }

    async fn fetch_latest_invoices(&self) -> Result<Vec<LatestInvoice>> {
        Ok(self
            .joined_rows()?
            .into_iter()
            .take(LATEST_INVOICES)
            .map(|row| LatestInvoice {
                id: row.id,
                name: row.name,
                email: row.email,
                image_url: row.image_url,
                amount: format_currency(row.amount),
            })
            .collect())
    }

    async fn fetch_card_data(&self) -> Result<CardData> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let total = |status: InvoiceStatus| -> Result<i64> {
            invoices
                .iter()
                .filter(|i| i.status == status)
                .try_fold(0i64, |sum, i| sum.checked_add(i.amount))
                .ok_or_else(|| anyhow!("Total of {} invoices overflows", status))
        };

        Ok(CardData::new(
            customers.len(),
            invoices.len(),
            total(InvoiceStatus::Paid)?,
            total(InvoiceStatus::Pending)?,
        ))
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryStore {
    async fn fetch_customers(&self) -> Result<Vec<Customer>> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut sorted = customers.clone();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sorted)
    }
}
