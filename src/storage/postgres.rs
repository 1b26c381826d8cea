//! PostgreSQL storage backend using sqlx.
//!
//! Provides a `PostgresStore` implementing [`InvoiceStore`] and
//! [`CustomerDirectory`] backed by a PostgreSQL database via `sqlx::PgPool`.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! invoice-dashboard = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! Three tables: `users`, `customers` and `invoices`. Amounts are stored in
//! cents as `BIGINT`; `invoices.date` is a `DATE`. Every statement binds its
//! values as parameters.

use crate::config::SeedUser;
use crate::core::invoice::{
    CardData, Customer, InvoiceForm, InvoiceListRow, InvoiceStatus, LatestInvoice, NewInvoice,
    format_currency,
};
use crate::core::query::page_offset;
use crate::core::service::{CustomerDirectory, InvoiceStore, LATEST_INVOICES};
use crate::storage::demo;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables and indexes (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create users table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS customers (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            image_url VARCHAR(255) NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create customers table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS invoices (
            id UUID PRIMARY KEY,
            customer_id UUID NOT NULL,
            amount BIGINT NOT NULL,
            status VARCHAR(255) NOT NULL,
            date DATE NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create invoices table: {}", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_invoices_date ON invoices (date DESC)")
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to create invoices index: {}", e))?;

    Ok(())
}

/// Insert the demo customers, invoices and account
///
/// Customers and the account are upserted by key. Invoices are only inserted
/// into an empty table so restarts do not duplicate them.
pub async fn seed_demo_data(pool: &PgPool) -> Result<()> {
    for customer in demo::customers() {
        sqlx::query(
            "INSERT INTO customers (id, name, email, image_url)
             VALUES ($1::uuid, $2, $3, $4)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.image_url)
        .execute(pool)
        .await
        .map_err(|e| anyhow!("Failed to seed customer: {}", e))?;
    }

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM invoices")
        .fetch_one(pool)
        .await
        .map_err(|e| anyhow!("Failed to count invoices: {}", e))?;

    if existing == 0 {
        for invoice in demo::invoices() {
            sqlx::query(
                "INSERT INTO invoices (id, customer_id, amount, status, date)
                 VALUES ($1, $2::uuid, $3, $4, $5)",
            )
            .bind(invoice.id)
            .bind(&invoice.customer_id)
            .bind(invoice.amount)
            .bind(invoice.status.as_str())
            .bind(invoice.date)
            .execute(pool)
            .await
            .map_err(|e| anyhow!("Failed to seed invoice: {}", e))?;
        }
    }

    let user = demo::user();
    sqlx::query(
        "INSERT INTO users (id, name, email, password)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(Uuid::new_v4())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password)
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to seed user: {}", e))?;

    tracing::info!("demo data seeded");
    Ok(())
}

/// Accounts stored in the `users` table
pub async fn fetch_users(pool: &PgPool) -> Result<Vec<SeedUser>> {
    let rows: Vec<(String, String, String)> =
        sqlx::query_as("SELECT name, email, password FROM users ORDER BY email")
            .fetch_all(pool)
            .await
            .map_err(|e| anyhow!("Failed to fetch users: {}", e))?;

    Ok(rows
        .into_iter()
        .map(|(name, email, password)| SeedUser {
            name,
            email,
            password,
        })
        .collect())
}

/// `%term%` for ILIKE with the pattern metacharacters escaped
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn parse_status(raw: &str) -> Result<InvoiceStatus> {
    raw.parse()
        .map_err(|e: String| anyhow!("Corrupt invoice row: {}", e))
}

type ListRow = (Uuid, String, String, String, String, NaiveDate, i64, String);

fn list_row(row: ListRow) -> Result<InvoiceListRow> {
    let (id, customer_id, name, email, image_url, date, amount, status) = row;
    Ok(InvoiceListRow {
        id,
        customer_id,
        name,
        email,
        image_url,
        date,
        amount,
        status: parse_status(&status)?,
    })
}

// ---------------------------------------------------------------------------
// PostgresStore
// ---------------------------------------------------------------------------

/// Invoice store backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// use invoices::storage::PostgresStore;
///
/// let store = PostgresStore::connect("postgres://postgres@localhost/dashboard", 5).await?;
/// store.ensure_schema().await?;
/// ```
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool against `url`
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| anyhow!("Failed to connect to PostgreSQL: {}", e))?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        ensure_schema(&self.pool).await
    }
}

#[async_trait]
impl InvoiceStore for PostgresStore {
    async fn create(&self, invoice: NewInvoice) -> Result<Uuid> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO invoices (id, customer_id, amount, status, date)
             VALUES ($1, $2::uuid, $3, $4, $5)",
        )
        .bind(id)
        .bind(&invoice.customer_id)
        .bind(invoice.amount_in_cents)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to insert invoice: {}", e))?;

        Ok(id)
    }

    async fn update(
        &self,
        id: &Uuid,
        customer_id: &str,
        amount_in_cents: i64,
        status: InvoiceStatus,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE invoices
             SET customer_id = $1::uuid, amount = $2, status = $3
             WHERE id = $4",
        )
        .bind(customer_id)
        .bind(amount_in_cents)
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to update invoice: {}", e))?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &Uuid) -> Result<()> {
        sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to delete invoice: {}", e))?;

        Ok(())
    }

    async fn fetch_invoice_by_id(&self, id: &Uuid) -> Result<Option<InvoiceForm>> {
        let row: Option<(Uuid, String, i64, String)> = sqlx::query_as(
            "SELECT id, customer_id::text, amount, status FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch invoice: {}", e))?;

        row.map(|(id, customer_id, amount, status)| {
            Ok(InvoiceForm {
                id,
                customer_id,
                amount: amount as f64 / 100.0,
                status: parse_status(&status)?,
            })
        })
        .transpose()
    }

    async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: usize,
        per_page: usize,
    ) -> Result<Vec<InvoiceListRow>> {
        let offset = i64::try_from(page_offset(page, per_page)).unwrap_or(i64::MAX);
        let limit = i64::try_from(per_page).unwrap_or(i64::MAX);

        let rows: Vec<ListRow> = sqlx::query_as(
            "SELECT invoices.id, invoices.customer_id::text, customers.name, customers.email,
                    customers.image_url, invoices.date, invoices.amount, invoices.status
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             WHERE customers.name ILIKE $1
                OR customers.email ILIKE $1
                OR invoices.amount::text ILIKE $1
                OR invoices.date::text ILIKE $1
                OR invoices.status ILIKE $1
             ORDER BY invoices.date DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(like_pattern(query))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch invoices: {}", e))?;

        rows.into_iter().map(list_row).collect()
    }

    async fn count_filtered_invoices(&self, query: &str) -> Result<usize> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*)
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             WHERE customers.name ILIKE $1
                OR customers.email ILIKE $1
                OR invoices.amount::text ILIKE $1
                OR invoices.date::text ILIKE $1
                OR invoices.status ILIKE $1",
        )
        .bind(like_pattern(query))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to count invoices: {}", e))?;

        Ok(count as usize)
    }

    async fn fetch_latest_invoices(&self) -> Result<Vec<LatestInvoice>> {
        let rows: Vec<(Uuid, String, String, String, i64)> = sqlx::query_as(
            "SELECT invoices.id, customers.name, customers.email, customers.image_url,
                    invoices.amount
             FROM invoices
             JOIN customers ON invoices.customer_id = customers.id
             ORDER BY invoices.date DESC
             LIMIT $1",
        )
        .bind(LATEST_INVOICES as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch latest invoices: {}", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, image_url, amount)| LatestInvoice {
                id,
                name,
                email,
                image_url,
                amount: format_currency(amount),
            })
            .collect())
    }

    async fn fetch_card_data(&self) -> Result<CardData> {
        // three independent reads, issued concurrently
        let invoice_count = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool);
        let customer_count = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool);
        let totals = sqlx::query_as::<_, (i64, i64)>(
            "SELECT
                COALESCE(SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END), 0)::BIGINT,
                COALESCE(SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END), 0)::BIGINT
             FROM invoices",
        )
        .fetch_one(&self.pool);

        let ((invoices,), (customers,), (paid, pending)) =
            tokio::try_join!(invoice_count, customer_count, totals)
                .map_err(|e| anyhow!("Failed to fetch card data: {}", e))?;

        Ok(CardData::new(
            customers as usize,
            invoices as usize,
            paid,
            pending,
        ))
    }
}

#[async_trait]
impl CustomerDirectory for PostgresStore {
    async fn fetch_customers(&self) -> Result<Vec<Customer>> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT id::text, name, email, image_url FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch customers: {}", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email, image_url)| Customer {
                id,
                name,
                email,
                image_url,
            })
            .collect())
    }
}
