//! Integration tests for the PostgreSQL invoice store.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a PostgreSQL container)
//! - Feature flag `postgres` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features postgres --test postgres_tests -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single PostgreSQL container (via `OnceLock`). Each test
//! creates a fresh `PgPool`, truncates the tables and seeds the demo data.

#![cfg(feature = "postgres")]

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use chrono::NaiveDate;
use invoices::prelude::*;
use invoices::storage::postgres::{fetch_users, seed_demo_data};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::OnceLock;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

const DELBA: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";
const LEE: &str = "3958dc9e-742f-4377-85e9-fec4b6a6442a";

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh pool per test)
// ---------------------------------------------------------------------------

/// Keeps the container alive for the whole test binary.
struct PgTestEnv {
    _container: testcontainers::ContainerAsync<Postgres>,
    connection_url: String,
}

/// `OnceLock` (std, not tokio) so the container outlives the runtime of
/// each `#[tokio::test]`.
static TEST_ENV: OnceLock<PgTestEnv> = OnceLock::new();

async fn init_pg_env() -> &'static PgTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container, is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let store = PostgresStore::connect(&url, 1)
        .await
        .expect("Failed to connect to PostgreSQL");
    store
        .ensure_schema()
        .await
        .expect("Failed to create schema");
    store.pool().close().await;

    let env = PgTestEnv {
        _container: container,
        connection_url: url,
    };

    let _ = TEST_ENV.set(env);
    TEST_ENV.get().unwrap()
}

/// Fresh pool bound to the current tokio runtime.
async fn pg_pool() -> PgPool {
    let env = init_pg_env().await;
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&env.connection_url)
        .await
        .expect("Failed to connect to PostgreSQL")
}

/// Store over freshly truncated and reseeded tables.
async fn seeded_store() -> PostgresStore {
    let pool = pg_pool().await;
    sqlx::query("TRUNCATE invoices, customers, users")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");
    seed_demo_data(&pool).await.expect("Failed to seed demo data");
    PostgresStore::new(pool)
}

fn new_invoice(customer_id: &str, cents: i64, status: InvoiceStatus, date: &str) -> NewInvoice {
    NewInvoice {
        customer_id: customer_id.to_string(),
        amount_in_cents: cents,
        status,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_seed_is_idempotent() {
    let store = seeded_store().await;
    seed_demo_data(store.pool()).await.unwrap();

    assert_eq!(store.count_filtered_invoices("").await.unwrap(), 13);
    assert_eq!(store.fetch_customers().await.unwrap().len(), 6);

    let users = fetch_users(store.pool()).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "user@nextmail.com");
}

#[tokio::test]
async fn test_card_data_matches_demo_totals() {
    let store = seeded_store().await;

    let cards = store.fetch_card_data().await.unwrap();
    assert_eq!(cards, CardData::new(6, 13, 100_626, 125_632));
    assert_eq!(cards.total_paid_invoices, "$1,006.26");
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_create_update_delete() {
    let store = seeded_store().await;

    let id = store
        .create(new_invoice(DELBA, 1250, InvoiceStatus::Paid, "2024-01-15"))
        .await
        .unwrap();

    let form = store.fetch_invoice_by_id(&id).await.unwrap().unwrap();
    assert_eq!(form.customer_id, DELBA);
    assert_eq!(form.amount, 12.5);
    assert_eq!(form.status, InvoiceStatus::Paid);

    let affected = store
        .update(&id, LEE, 9999, InvoiceStatus::Pending)
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let form = store.fetch_invoice_by_id(&id).await.unwrap().unwrap();
    assert_eq!(form.customer_id, LEE);
    assert_eq!(form.amount, 99.99);
    assert_eq!(form.status, InvoiceStatus::Pending);

    store.delete(&id).await.unwrap();
    assert!(store.fetch_invoice_by_id(&id).await.unwrap().is_none());

    // deleting again is not an error
    store.delete(&id).await.unwrap();
}

#[tokio::test]
async fn test_update_unknown_id_affects_nothing() {
    let store = seeded_store().await;

    let affected = store
        .update(&Uuid::new_v4(), DELBA, 100, InvoiceStatus::Paid)
        .await
        .unwrap();
    assert_eq!(affected, 0);
}

#[tokio::test]
async fn test_non_uuid_customer_is_a_store_error() {
    let store = seeded_store().await;

    let result = store
        .create(new_invoice("c1", 100, InvoiceStatus::Paid, "2024-01-15"))
        .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_filtered_listing() {
    let store = seeded_store().await;

    let page = store.fetch_filtered_invoices("", 1, 6).await.unwrap();
    assert_eq!(page.len(), 6);
    assert!(page.windows(2).all(|w| w[0].date >= w[1].date));
    assert_eq!(page[0].amount, 44_800);

    let last = store.fetch_filtered_invoices("", 3, 6).await.unwrap();
    assert_eq!(last.len(), 1);

    let delba = store.fetch_filtered_invoices("DELBA", 1, 6).await.unwrap();
    assert_eq!(delba.len(), 2);
    assert!(delba.iter().all(|r| r.name == "Delba de Oliveira"));

    assert_eq!(store.count_filtered_invoices("pending").await.unwrap(), 5);
    assert_eq!(store.count_filtered_invoices("2023-06").await.unwrap(), 5);
    assert_eq!(store.count_filtered_invoices("%").await.unwrap(), 0);
}

#[tokio::test]
async fn test_latest_invoices() {
    let store = seeded_store().await;

    let latest = store.fetch_latest_invoices().await.unwrap();
    assert_eq!(latest.len(), 5);
    assert_eq!(latest[0].name, "Michael Novotny");
    assert_eq!(latest[0].amount, "$448.00");
}

// ---------------------------------------------------------------------------
// Through the router
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_router_over_postgres() {
    let store = seeded_store().await;
    let app = ServerBuilder::new().with_store(store).build().unwrap();
    let server = TestServer::new(app);

    let login: Value = server
        .post("/login")
        .json(&json!({"email": "user@nextmail.com", "password": "123456"}))
        .await
        .json();
    let auth = HeaderValue::from_str(&format!("Bearer {}", login["token"].as_str().unwrap())).unwrap();

    server
        .post("/dashboard/invoices")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({"customerId": LEE, "amount": "12.50", "status": "paid"}))
        .await
        .assert_status(StatusCode::SEE_OTHER);

    let list: Value = server
        .get("/dashboard/invoices")
        .add_query_param("query", "lee")
        .add_header(header::AUTHORIZATION, auth.clone())
        .await
        .json();
    assert_eq!(list["pagination"]["total"], 3);
    assert_eq!(list["invoices"][0]["amount"], 1250);

    // a customer id that is not a UUID fails in the store, not in validation
    let response = server
        .post("/dashboard/invoices")
        .add_header(header::AUTHORIZATION, auth)
        .json(&json!({"customerId": "c1", "amount": "1", "status": "paid"}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"message": "Database Error: Failed to Create Invoice."}));
}
