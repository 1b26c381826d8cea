//! HTTP handlers for the dashboard
//!
//! Handlers are thin: they extract input, call an action or a store read,
//! and map the result to a response. All of them share the
//! [`ServerHost`](crate::server::host::ServerHost) as state.

pub mod auth;
pub mod dashboard;
pub mod invoices;

use crate::core::actions::ActionOutcome;
use crate::core::error::{DashboardResult, ValidationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

/// Map an action outcome to HTTP
///
/// Navigation becomes `303 See Other`; failures carry the form state back
/// as JSON so the client can re-render the form.
pub fn outcome_response(outcome: ActionOutcome) -> Response {
    let status = match &outcome {
        ActionOutcome::NavigateTo(path) => return Redirect::to(path).into_response(),
        ActionOutcome::Completed { .. } => StatusCode::OK,
        ActionOutcome::ValidationFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ActionOutcome::StoreFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(outcome.state())).into_response()
}

/// Parse the `{id}` route segment
pub fn parse_invoice_id(raw: &str) -> DashboardResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| {
        ValidationError::InvalidUuid {
            value: raw.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DashboardError;
    use axum::http::header::LOCATION;
    use indexmap::IndexMap;

    #[test]
    fn test_navigation_is_see_other() {
        let response = outcome_response(ActionOutcome::NavigateTo(
            "/dashboard/invoices".to_string(),
        ));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/dashboard/invoices");
    }

    #[test]
    fn test_failure_statuses() {
        let validation = outcome_response(ActionOutcome::ValidationFailure {
            errors: IndexMap::new(),
            message: "Missing Fields. Failed to Create Invoice.".to_string(),
        });
        assert_eq!(validation.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let store = outcome_response(ActionOutcome::StoreFailure {
            message: "Database Error: Failed to Create Invoice.".to_string(),
        });
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let done = outcome_response(ActionOutcome::Completed {
            message: "Delete Invoice".to_string(),
        });
        assert_eq!(done.status(), StatusCode::OK);
    }

    #[test]
    fn test_parse_invoice_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_invoice_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_invoice_id("42"),
            Err(DashboardError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_id_reports_the_route_segment() {
        let err = parse_invoice_id("not-a-uuid").unwrap_err();
        assert!(matches!(
            &err,
            DashboardError::Validation(ValidationError::InvalidUuid { value }) if value == "not-a-uuid"
        ));
        assert_eq!(err.to_response().message, "Invalid UUID format: not-a-uuid");
    }
}
