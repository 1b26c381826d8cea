//! # Invoice Dashboard
//!
//! An invoice management service for authenticated users: list, search,
//! create, edit and delete invoices tied to customers.
//!
//! ## Features
//!
//! - **Validated Actions**: create/update/delete invoice actions with per-field error reporting
//! - **Explicit Outcomes**: actions return an [`ActionOutcome`](core::actions::ActionOutcome)
//!   instead of throwing redirects
//! - **Revalidation**: successful writes evict the cached invoice list
//! - **Search & Pagination**: case-insensitive search across customer and invoice fields
//! - **Sessions**: bearer-token sessions guarding every `/dashboard` route
//! - **Pluggable Storage**: in-memory store out of the box, PostgreSQL behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use invoices::prelude::*;
//!
//! let store = InMemoryStore::with_demo_data();
//!
//! ServerBuilder::new()
//!     .with_config(DashboardConfig::default())
//!     .with_store(store)
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        auth::{
            AuthContext, AuthError, AuthenticatedUser, Credentials, IdentityProvider, SessionStore,
        },
        revalidation::{Revalidator, ViewCache},
        service::{CustomerDirectory, InvoiceStore},
    };

    // === Domain ===
    pub use crate::core::invoice::{
        CardData, Customer, Invoice, InvoiceForm, InvoiceListRow, InvoiceStatus, LatestInvoice,
        NewInvoice, format_currency,
    };

    // === Actions ===
    pub use crate::core::actions::{
        ActionContext, ActionOutcome, ActionState, AuthOutcome, INVOICES_PATH, authenticate,
        create_invoice, delete_invoice, update_invoice,
    };

    // === Validation ===
    pub use crate::core::validation::{
        FieldErrors, InvoiceSchema, RawInvoiceForm, SchemaResult, ValidatedInvoice,
    };

    // === Query ===
    pub use crate::core::query::{PageToken, PaginationMeta, SearchParams, generate_pagination};

    // === Errors ===
    pub use crate::core::error::{
        ConfigError, DashboardError, DashboardResult, ErrorResponse, RequestError, StorageError,
        ValidationError,
    };

    // === Configuration ===
    pub use crate::config::DashboardConfig;

    // === Storage ===
    pub use crate::storage::{InMemoryStore, StaticIdentityProvider};

    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External re-exports ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use uuid::Uuid;
}
