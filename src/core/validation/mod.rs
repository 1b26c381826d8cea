//! Invoice form validation
//!
//! [`InvoiceSchema`] checks raw form fields and either produces a typed
//! [`ValidatedInvoice`] or a map of per-field messages. The [`ActionForm`]
//! extractor reads form bodies from either encoding the dashboard accepts.

pub mod extractor;
pub mod schema;
pub mod validators;

pub use extractor::ActionForm;
pub use schema::{FieldErrors, InvoiceSchema, RawInvoiceForm, SchemaResult, ValidatedInvoice};
