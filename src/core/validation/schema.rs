//! Invoice input schema
//!
//! Turns the raw bag of form values into a [`ValidatedInvoice`] or a map of
//! field errors. Parsing never fails outright; every field is checked and all
//! violations are reported together.

use super::validators::{at_most_cents, one_of, positive_amount, required_text};
use crate::core::invoice::InvoiceStatus;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const CUSTOMER_ID_FIELD: &str = "customerId";
pub const AMOUNT_FIELD: &str = "amount";
pub const STATUS_FIELD: &str = "status";

pub const CUSTOMER_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_MESSAGE: &str = "Please enter an amount greater than $0.";
pub const STATUS_MESSAGE: &str = "Please select an invoice status.";
pub const AMOUNT_LIMIT_MESSAGE: &str = "Please enter an amount of at most $1,000,000,000,000.";

/// Largest accepted amount, in cents
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000_000_000;

/// Field name → messages, in field declaration order
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Invoice fields exactly as submitted
///
/// Values of the wrong type (a JSON number for `customerId`, an object for
/// `status`, ...) are read as missing so they surface as field errors.
/// `amount` also accepts a JSON number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInvoiceForm {
    #[serde(default, deserialize_with = "string_only")]
    pub customer_id: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub amount: Option<String>,

    #[serde(default, deserialize_with = "string_only")]
    pub status: Option<String>,
}

impl RawInvoiceForm {
    pub fn new(customer_id: &str, amount: &str, status: &str) -> Self {
        Self {
            customer_id: Some(customer_id.to_string()),
            amount: Some(amount.to_string()),
            status: Some(status.to_string()),
        }
    }
}

fn string_only<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Invoice input that passed every rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
    pub customer_id: String,
    /// Dollars, as entered
    pub amount: f64,
    pub status: InvoiceStatus,
}

impl ValidatedInvoice {
    pub fn amount_in_cents(&self) -> i64 {
        (self.amount * 100.0).round() as i64
    }
}

/// Outcome of [`InvoiceSchema::safe_parse`]
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaResult {
    Success(ValidatedInvoice),
    Failure(FieldErrors),
}

impl SchemaResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SchemaResult::Success(_))
    }
}

/// Rules for invoice input
pub struct InvoiceSchema;

impl InvoiceSchema {
    pub fn safe_parse(form: &RawInvoiceForm) -> SchemaResult {
        let mut errors = FieldErrors::new();

        let customer_id = collect(
            &mut errors,
            CUSTOMER_ID_FIELD,
            required_text(CUSTOMER_MESSAGE)(form.customer_id.as_deref()),
        );
        let amount = collect(
            &mut errors,
            AMOUNT_FIELD,
            positive_amount(AMOUNT_MESSAGE)(form.amount.as_deref())
                .and_then(at_most_cents(MAX_AMOUNT_CENTS, AMOUNT_LIMIT_MESSAGE)),
        );
        let status = collect(
            &mut errors,
            STATUS_FIELD,
            one_of::<InvoiceStatus>(STATUS_MESSAGE)(form.status.as_deref()),
        );

        match (customer_id, amount, status) {
            (Some(customer_id), Some(amount), Some(status)) if errors.is_empty() => {
                SchemaResult::Success(ValidatedInvoice {
                    customer_id,
                    amount,
                    status,
                })
            }
            _ => SchemaResult::Failure(errors),
        }
    }
}

fn collect<T>(errors: &mut FieldErrors, field: &str, result: Result<T, String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            errors.entry(field.to_string()).or_default().push(message);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(result: SchemaResult) -> FieldErrors {
        match result {
            SchemaResult::Failure(errors) => errors,
            SchemaResult::Success(v) => panic!("expected failure, got {:?}", v),
        }
    }

    #[test]
    fn test_valid_form_parses() {
        let result = InvoiceSchema::safe_parse(&RawInvoiceForm::new("c1", "50", "pending"));
        assert_eq!(
            result,
            SchemaResult::Success(ValidatedInvoice {
                customer_id: "c1".to_string(),
                amount: 50.0,
                status: InvoiceStatus::Pending,
            })
        );
    }

    #[test]
    fn test_empty_form_reports_every_field_in_order() {
        let errors = failure(InvoiceSchema::safe_parse(&RawInvoiceForm::default()));

        let fields: Vec<&str> = errors.keys().map(String::as_str).collect();
        assert_eq!(fields, vec!["customerId", "amount", "status"]);
        assert_eq!(errors["customerId"], vec![CUSTOMER_MESSAGE]);
        assert_eq!(errors["amount"], vec![AMOUNT_MESSAGE]);
        assert_eq!(errors["status"], vec![STATUS_MESSAGE]);
    }

    #[test]
    fn test_amount_error_does_not_hide_status_error() {
        let errors = failure(InvoiceSchema::safe_parse(&RawInvoiceForm::new(
            "c1", "-3", "overdue",
        )));
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("amount"));
        assert!(errors.contains_key("status"));
        assert!(!errors.contains_key("customerId"));
    }

    #[test]
    fn test_amount_in_cents_rounds() {
        let validated = ValidatedInvoice {
            customer_id: "c1".to_string(),
            amount: 12.34,
            status: InvoiceStatus::Paid,
        };
        assert_eq!(validated.amount_in_cents(), 1234);

        let validated = ValidatedInvoice {
            amount: 0.015,
            ..validated
        };
        assert_eq!(validated.amount_in_cents(), 2);
    }

    #[test]
    fn test_amount_above_limit_is_rejected() {
        for amount in ["1e20", "1000000000000.01", "9223372036854775807"] {
            let errors = failure(InvoiceSchema::safe_parse(&RawInvoiceForm::new(
                "c1", amount, "paid",
            )));
            assert_eq!(errors["amount"], vec![AMOUNT_LIMIT_MESSAGE], "{}", amount);
        }

        let result = InvoiceSchema::safe_parse(&RawInvoiceForm::new("c1", "1000000000000", "paid"));
        match result {
            SchemaResult::Success(v) => assert_eq!(v.amount_in_cents(), MAX_AMOUNT_CENTS),
            SchemaResult::Failure(errors) => panic!("limit should be accepted: {:?}", errors),
        }
    }

    #[test]
    fn test_json_number_amount_is_accepted() {
        let form: RawInvoiceForm =
            serde_json::from_value(json!({"customerId": "c1", "amount": 19.99, "status": "paid"}))
                .unwrap();
        assert_eq!(form.amount.as_deref(), Some("19.99"));
        assert!(InvoiceSchema::safe_parse(&form).is_success());
    }

    #[test]
    fn test_wrong_types_surface_as_field_errors() {
        let form: RawInvoiceForm =
            serde_json::from_value(json!({"customerId": 42, "amount": "5", "status": true}))
                .unwrap();
        let errors = failure(InvoiceSchema::safe_parse(&form));
        assert_eq!(errors["customerId"], vec![CUSTOMER_MESSAGE]);
        assert_eq!(errors["status"], vec![STATUS_MESSAGE]);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let form: RawInvoiceForm = serde_json::from_value(json!({
            "id": "ignored",
            "date": "1999-01-01",
            "customerId": "c1",
            "amount": "1",
            "status": "paid"
        }))
        .unwrap();
        assert!(InvoiceSchema::safe_parse(&form).is_success());
    }
}
