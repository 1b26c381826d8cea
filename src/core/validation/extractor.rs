//! Axum extractor for submitted forms
//!
//! Browsers post `application/x-www-form-urlencoded`; scripted clients may
//! send JSON instead. [`ActionForm<T>`] accepts both and leaves validation to
//! the action, so a malformed field still reaches the schema and comes back
//! as a field error instead of a rejection.

use crate::core::error::{DashboardError, RequestError};
use axum::{
    Form, Json,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;

/// Form body decoded from JSON or urlencoded input
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create(
///     State(host): State<Arc<ServerHost>>,
///     ActionForm(form): ActionForm<RawInvoiceForm>,
/// ) -> Response {
///     // form fields are raw strings; run them through InvoiceSchema
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ActionForm<T>(pub T);

impl<T> ActionForm<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for ActionForm<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S, T> FromRequest<S> for ActionForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = DashboardError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
                RequestError::InvalidBody {
                    message: e.body_text(),
                }
            })?;
            return Ok(ActionForm(value));
        }

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
                RequestError::InvalidBody {
                    message: e.body_text(),
                }
            })?;
            return Ok(ActionForm(value));
        }

        Err(RequestError::UnsupportedContentType { content_type }.into())
    }
}
