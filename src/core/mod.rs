//! Core module containing the invoice domain, form actions and the seams
//! to storage and identity

pub mod actions;
pub mod auth;
pub mod error;
pub mod invoice;
pub mod query;
pub mod revalidation;
pub mod service;
pub mod validation;

pub use actions::{
    ActionContext, ActionOutcome, ActionState, AuthOutcome, INVOICES_PATH, authenticate,
    create_invoice, delete_invoice, update_invoice,
};
pub use auth::{
    AuthContext, AuthError, AuthenticatedUser, Credentials, IdentityProvider, Session,
    SessionStore,
};
pub use error::{DashboardError, DashboardResult};
pub use invoice::{
    CardData, Customer, Invoice, InvoiceForm, InvoiceListRow, InvoiceStatus, LatestInvoice,
    NewInvoice,
};
pub use query::{PageToken, PaginationMeta, SearchParams, generate_pagination};
pub use revalidation::{Revalidator, ViewCache};
pub use service::{CustomerDirectory, InvoiceStore};
pub use validation::{ActionForm, FieldErrors, InvoiceSchema, RawInvoiceForm, SchemaResult};
