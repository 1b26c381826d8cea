//! Form actions
//!
//! Each action is a plain async function of the previous form state and the
//! submitted input. Instead of throwing a redirect, it returns an
//! [`ActionOutcome`] and leaves navigation to the caller.
//!
//! ```text
//! raw form ─▶ InvoiceSchema ─▶ InvoiceStore ─▶ Revalidator ─▶ NavigateTo(/dashboard/invoices)
//!                  │                 │
//!                  ▼                 ▼
//!          ValidationFailure    StoreFailure
//! ```

use crate::core::auth::{AuthError, AuthenticatedUser, Credentials, IdentityProvider};
use crate::core::error::{DashboardError, DashboardResult};
use crate::core::invoice::NewInvoice;
use crate::core::revalidation::Revalidator;
use crate::core::service::InvoiceStore;
use crate::core::validation::{FieldErrors, InvoiceSchema, RawInvoiceForm, SchemaResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// The invoice list; revalidated after every write and the target of
/// create/update navigation
pub const INVOICES_PATH: &str = "/dashboard/invoices";

/// Token returned for display when the identity provider rejects credentials
pub const CREDENTIALS_SIGNIN: &str = "CredentialsSignin";

const CREATE_MISSING_FIELDS: &str = "Missing Fields. Failed to Create Invoice.";
const CREATE_DATABASE_ERROR: &str = "Database Error: Failed to Create Invoice.";
const UPDATE_MISSING_FIELDS: &str = "Missing Fields. Failed to Update Invoice.";
const UPDATE_DATABASE_ERROR: &str = "Database Error: Failed to Update Invoice.";
const DELETE_DONE: &str = "Delete Invoice";
const DELETE_DATABASE_ERROR: &str = "Database Error: Failed to Delete Invoice.";

/// State shown back on the originating form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What the caller should do after an action ran
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The write committed; navigate to this path
    NavigateTo(String),

    /// The write committed; stay and show the message
    Completed { message: String },

    /// Input failed validation; nothing was written
    ValidationFailure { errors: FieldErrors, message: String },

    /// The store rejected the write
    StoreFailure { message: String },
}

impl ActionOutcome {
    /// Form state to render for this outcome
    pub fn state(&self) -> ActionState {
        match self {
            ActionOutcome::NavigateTo(_) => ActionState::default(),
            ActionOutcome::Completed { message } | ActionOutcome::StoreFailure { message } => {
                ActionState {
                    errors: None,
                    message: Some(message.clone()),
                }
            }
            ActionOutcome::ValidationFailure { errors, message } => ActionState {
                errors: Some(errors.clone()),
                message: Some(message.clone()),
            },
        }
    }

    pub fn redirect(&self) -> Option<&str> {
        match self {
            ActionOutcome::NavigateTo(path) => Some(path),
            _ => None,
        }
    }
}

/// Collaborators shared by the invoice actions
#[derive(Clone)]
pub struct ActionContext {
    pub store: Arc<dyn InvoiceStore>,
    pub revalidator: Arc<dyn Revalidator>,
}

impl ActionContext {
    pub fn new(store: Arc<dyn InvoiceStore>, revalidator: Arc<dyn Revalidator>) -> Self {
        Self { store, revalidator }
    }

    /// Runs after a committed write; a failure here is fatal for the request
    fn revalidate_invoices(&self) -> DashboardResult<()> {
        self.revalidator
            .revalidate_path(INVOICES_PATH)
            .map_err(|e| DashboardError::Internal(format!("revalidation failed: {:#}", e)))
    }
}

/// Validate and insert a new invoice
///
/// `_previous` is the state the form last rendered; it does not influence
/// the result.
pub async fn create_invoice(
    ctx: &ActionContext,
    _previous: &ActionState,
    form: &RawInvoiceForm,
) -> DashboardResult<ActionOutcome> {
    let validated = match InvoiceSchema::safe_parse(form) {
        SchemaResult::Success(validated) => validated,
        SchemaResult::Failure(errors) => {
            return Ok(ActionOutcome::ValidationFailure {
                errors,
                message: CREATE_MISSING_FIELDS.to_string(),
            });
        }
    };

    let new_invoice = NewInvoice {
        amount_in_cents: validated.amount_in_cents(),
        customer_id: validated.customer_id,
        status: validated.status,
        date: Utc::now().date_naive(),
    };

    match ctx.store.create(new_invoice).await {
        Ok(id) => tracing::info!(invoice_id = %id, "invoice created"),
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "failed to create invoice");
            return Ok(ActionOutcome::StoreFailure {
                message: CREATE_DATABASE_ERROR.to_string(),
            });
        }
    }

    ctx.revalidate_invoices()?;
    Ok(ActionOutcome::NavigateTo(INVOICES_PATH.to_string()))
}

/// Validate and overwrite an existing invoice
///
/// The id comes from the route and is not checked for existence first; an
/// unknown id updates nothing and still navigates back to the list.
pub async fn update_invoice(
    ctx: &ActionContext,
    id: &Uuid,
    _previous: &ActionState,
    form: &RawInvoiceForm,
) -> DashboardResult<ActionOutcome> {
    let validated = match InvoiceSchema::safe_parse(form) {
        SchemaResult::Success(validated) => validated,
        SchemaResult::Failure(errors) => {
            return Ok(ActionOutcome::ValidationFailure {
                errors,
                message: UPDATE_MISSING_FIELDS.to_string(),
            });
        }
    };

    let result = ctx
        .store
        .update(
            id,
            &validated.customer_id,
            validated.amount_in_cents(),
            validated.status,
        )
        .await;

    match result {
        Ok(0) => tracing::warn!(invoice_id = %id, "update matched no invoice"),
        Ok(_) => tracing::info!(invoice_id = %id, "invoice updated"),
        Err(e) => {
            tracing::warn!(invoice_id = %id, error = %format!("{:#}", e), "failed to update invoice");
            return Ok(ActionOutcome::StoreFailure {
                message: UPDATE_DATABASE_ERROR.to_string(),
            });
        }
    }

    ctx.revalidate_invoices()?;
    Ok(ActionOutcome::NavigateTo(INVOICES_PATH.to_string()))
}

/// Hard delete an invoice
///
/// The list is revalidated before the outcome is returned, and only when the
/// delete succeeded.
pub async fn delete_invoice(ctx: &ActionContext, id: &Uuid) -> DashboardResult<ActionOutcome> {
    if let Err(e) = ctx.store.delete(id).await {
        tracing::warn!(invoice_id = %id, error = %format!("{:#}", e), "failed to delete invoice");
        return Ok(ActionOutcome::StoreFailure {
            message: DELETE_DATABASE_ERROR.to_string(),
        });
    }

    tracing::info!(invoice_id = %id, "invoice deleted");
    ctx.revalidate_invoices()?;

    Ok(ActionOutcome::Completed {
        message: DELETE_DONE.to_string(),
    })
}

/// Result of a sign-in attempt that did not fail outright
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    SignedIn(AuthenticatedUser),

    /// Credentials were rejected; the token is shown on the form
    Rejected(&'static str),
}

/// Delegate sign-in to the identity provider
///
/// Only [`AuthError::CredentialsSignin`] is turned into a displayable
/// rejection. Every other provider error is returned unchanged.
pub async fn authenticate(
    provider: &dyn IdentityProvider,
    _previous: Option<&str>,
    credentials: &Credentials,
) -> Result<AuthOutcome, AuthError> {
    match provider.sign_in(credentials).await {
        Ok(user) => Ok(AuthOutcome::SignedIn(user)),
        Err(AuthError::CredentialsSignin) => Ok(AuthOutcome::Rejected(CREDENTIALS_SIGNIN)),
        Err(other) => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::invoice::{
        CardData, InvoiceForm, InvoiceListRow, InvoiceStatus, LatestInvoice,
    };
    use crate::core::revalidation::ViewCache;
    use crate::storage::InMemoryStore;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use serde_json::json;

    /// Store whose every call fails
    struct FailingStore;

    #[async_trait]
    impl InvoiceStore for FailingStore {
        async fn create(&self, _: NewInvoice) -> Result<Uuid> {
            Err(anyhow!("connection refused"))
        }
        async fn update(&self, _: &Uuid, _: &str, _: i64, _: InvoiceStatus) -> Result<u64> {
            Err(anyhow!("connection refused"))
        }
        async fn delete(&self, _: &Uuid) -> Result<()> {
            Err(anyhow!("connection refused"))
        }
        async fn fetch_invoice_by_id(&self, _: &Uuid) -> Result<Option<InvoiceForm>> {
            Err(anyhow!("connection refused"))
        }
        async fn fetch_filtered_invoices(
            &self,
            _: &str,
            _: usize,
            _: usize,
        ) -> Result<Vec<InvoiceListRow>> {
            Err(anyhow!("connection refused"))
        }
        async fn count_filtered_invoices(&self, _: &str) -> Result<usize> {
            Err(anyhow!("connection refused"))
        }
        async fn fetch_latest_invoices(&self) -> Result<Vec<LatestInvoice>> {
            Err(anyhow!("connection refused"))
        }
        async fn fetch_card_data(&self) -> Result<CardData> {
            Err(anyhow!("connection refused"))
        }
    }

    struct BrokenRevalidator;

    impl Revalidator for BrokenRevalidator {
        fn revalidate_path(&self, _: &str) -> Result<()> {
            Err(anyhow!("cache poisoned"))
        }
    }

    struct StubProvider(Result<AuthenticatedUser, AuthError>);

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn sign_in(&self, _: &Credentials) -> Result<AuthenticatedUser, AuthError> {
            self.0.clone()
        }
    }

    fn context(store: Arc<dyn InvoiceStore>) -> (ActionContext, ViewCache) {
        let cache = ViewCache::new();
        cache
            .put(ViewCache::key(INVOICES_PATH, Some("page=1")), json!([]))
            .unwrap();
        (ActionContext::new(store, Arc::new(cache.clone())), cache)
    }

    fn seeded_store() -> InMemoryStore {
        InMemoryStore::with_demo_data()
    }

    // === create_invoice ===

    #[tokio::test]
    async fn test_create_inserts_and_navigates() {
        let store = seeded_store();
        let before = store.invoice_count();
        let (ctx, cache) = context(Arc::new(store.clone()));

        let form = RawInvoiceForm::new(&store.first_customer_id().unwrap(), "50", "pending");
        let outcome = create_invoice(&ctx, &ActionState::default(), &form)
            .await
            .unwrap();

        assert_eq!(outcome, ActionOutcome::NavigateTo(INVOICES_PATH.to_string()));
        assert_eq!(store.invoice_count(), before + 1);
        assert!(cache.is_empty(), "list view should have been revalidated");

        let created = store.newest_invoice().unwrap();
        assert_eq!(created.amount, 5000);
        assert_eq!(created.status, InvoiceStatus::Pending);
        assert_eq!(created.date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn test_create_validation_failure_leaves_store_untouched() {
        let store = seeded_store();
        let before = store.invoice_count();
        let (ctx, cache) = context(Arc::new(store.clone()));

        let form = RawInvoiceForm::new("c1", "0", "pending");
        let outcome = create_invoice(&ctx, &ActionState::default(), &form)
            .await
            .unwrap();

        let state = outcome.state();
        assert_eq!(
            state.message.as_deref(),
            Some("Missing Fields. Failed to Create Invoice.")
        );
        assert_eq!(
            state.errors.unwrap()["amount"],
            vec!["Please enter an amount greater than $0."]
        );
        assert_eq!(store.invoice_count(), before);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_create_store_failure_returns_generic_message() {
        let (ctx, cache) = context(Arc::new(FailingStore));

        let form = RawInvoiceForm::new("c1", "10", "paid");
        let outcome = create_invoice(&ctx, &ActionState::default(), &form)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::StoreFailure {
                message: "Database Error: Failed to Create Invoice.".to_string()
            }
        );
        assert!(outcome.state().errors.is_none());
        assert_eq!(cache.len(), 1, "no revalidation after a failed write");
    }

    #[tokio::test]
    async fn test_create_revalidation_failure_propagates() {
        let store = seeded_store();
        let before = store.invoice_count();
        let ctx = ActionContext::new(Arc::new(store.clone()), Arc::new(BrokenRevalidator));

        let form = RawInvoiceForm::new(&store.first_customer_id().unwrap(), "10", "paid");
        let result = create_invoice(&ctx, &ActionState::default(), &form).await;

        assert!(matches!(result, Err(DashboardError::Internal(_))));
        assert_eq!(store.invoice_count(), before + 1, "write already committed");
    }

    #[tokio::test]
    async fn test_previous_state_does_not_affect_result() {
        let store = seeded_store();
        let (ctx, _) = context(Arc::new(store.clone()));
        let previous = ActionState {
            errors: None,
            message: Some("Missing Fields. Failed to Create Invoice.".to_string()),
        };

        let form = RawInvoiceForm::new(&store.first_customer_id().unwrap(), "1", "paid");
        let outcome = create_invoice(&ctx, &previous, &form).await.unwrap();
        assert!(outcome.redirect().is_some());
    }

    // === update_invoice ===

    #[tokio::test]
    async fn test_update_overwrites_fields_but_not_date() {
        let store = seeded_store();
        let original = store.newest_invoice().unwrap();
        let (ctx, cache) = context(Arc::new(store.clone()));

        let form = RawInvoiceForm::new(&original.customer_id, "12.34", "paid");
        let outcome = update_invoice(&ctx, &original.id, &ActionState::default(), &form)
            .await
            .unwrap();

        assert_eq!(outcome.redirect(), Some(INVOICES_PATH));
        assert!(cache.is_empty());

        let updated = store.invoice(&original.id).unwrap();
        assert_eq!(updated.amount, 1234);
        assert_eq!(updated.status, InvoiceStatus::Paid);
        assert_eq!(updated.date, original.date);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_silent_success() {
        let store = seeded_store();
        let before = store.invoice_count();
        let (ctx, _) = context(Arc::new(store.clone()));

        let form = RawInvoiceForm::new("c1", "5", "paid");
        let outcome = update_invoice(&ctx, &Uuid::new_v4(), &ActionState::default(), &form)
            .await
            .unwrap();

        assert_eq!(outcome, ActionOutcome::NavigateTo(INVOICES_PATH.to_string()));
        assert_eq!(store.invoice_count(), before);
    }

    #[tokio::test]
    async fn test_update_messages() {
        let (ctx, _) = context(Arc::new(FailingStore));
        let id = Uuid::new_v4();

        let invalid = update_invoice(&ctx, &id, &ActionState::default(), &RawInvoiceForm::default())
            .await
            .unwrap();
        assert_eq!(
            invalid.state().message.as_deref(),
            Some("Missing Fields. Failed to Update Invoice.")
        );

        let form = RawInvoiceForm::new("c1", "5", "paid");
        let failed = update_invoice(&ctx, &id, &ActionState::default(), &form)
            .await
            .unwrap();
        assert_eq!(
            failed.state().message.as_deref(),
            Some("Database Error: Failed to Update Invoice.")
        );
    }

    // === delete_invoice ===

    #[tokio::test]
    async fn test_delete_removes_row_and_revalidates() {
        let store = seeded_store();
        let target = store.newest_invoice().unwrap();
        let (ctx, cache) = context(Arc::new(store.clone()));

        let outcome = delete_invoice(&ctx, &target.id).await.unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Completed {
                message: "Delete Invoice".to_string()
            }
        );
        assert!(outcome.redirect().is_none());
        assert!(store.invoice(&target.id).is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_delete_store_failure() {
        let (ctx, cache) = context(Arc::new(FailingStore));

        let outcome = delete_invoice(&ctx, &Uuid::new_v4()).await.unwrap();

        assert_eq!(
            outcome.state().message.as_deref(),
            Some("Database Error: Failed to Delete Invoice.")
        );
        assert_eq!(cache.len(), 1);
    }

    // === authenticate ===

    #[tokio::test]
    async fn test_authenticate_credentials_rejection_is_displayed() {
        let provider = StubProvider(Err(AuthError::CredentialsSignin));
        let outcome = authenticate(&provider, None, &Credentials::new("a@b.co", "secret"))
            .await
            .unwrap();
        assert_eq!(outcome, AuthOutcome::Rejected("CredentialsSignin"));
    }

    #[tokio::test]
    async fn test_authenticate_other_errors_propagate_unchanged() {
        let error = AuthError::Unavailable("CredentialsSignin timeout".to_string());
        let provider = StubProvider(Err(error.clone()));

        let result = authenticate(&provider, None, &Credentials::new("a@b.co", "secret")).await;
        assert_eq!(result, Err(error));
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let user = AuthenticatedUser {
            id: Uuid::new_v4(),
            name: "User".to_string(),
            email: "user@nextmail.com".to_string(),
        };
        let provider = StubProvider(Ok(user.clone()));

        let outcome = authenticate(&provider, Some("CredentialsSignin"), &Credentials::default())
            .await
            .unwrap();
        assert_eq!(outcome, AuthOutcome::SignedIn(user));
    }
}
