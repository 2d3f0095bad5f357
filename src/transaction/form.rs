//! Decoding and validation of the request body for creating a transaction.

use axum::{Json, extract::rejection::JsonRejection};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    Error, FieldError,
    transaction::{NewTransaction, TransactionType},
};

/// The JSON body for creating a transaction, before validation.
///
/// Every field is kept as a raw JSON value so that all problems with a
/// request can be reported at once instead of stopping at the first one.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    /// Text detailing the transaction.
    #[serde(default)]
    pub text: Option<Value>,
    /// The magnitude of the transaction.
    #[serde(default)]
    pub amount: Option<Value>,
    /// Either "credit" or "debit".
    #[serde(default, rename = "type")]
    pub transaction_type: Option<Value>,
}

impl TryFrom<TransactionForm> for NewTransaction {
    type Error = Error;

    fn try_from(form: TransactionForm) -> Result<Self, Self::Error> {
        let mut errors = Vec::new();

        let title = match form.text {
            Some(Value::String(text)) if text.is_empty() => {
                errors.push(FieldError::new("text", "must not be empty"));
                None
            }
            Some(Value::String(text)) => Some(text),
            Some(Value::Null) | None => {
                errors.push(FieldError::new("text", "is required"));
                None
            }
            Some(_) => {
                errors.push(FieldError::new("text", "must be a string"));
                None
            }
        };

        let amount = match form.amount {
            Some(Value::Number(number)) => {
                let amount = number.as_f64();
                if amount.is_none() {
                    errors.push(FieldError::new("amount", "must be a number"));
                }
                amount
            }
            Some(Value::Null) | None => {
                errors.push(FieldError::new("amount", "is required"));
                None
            }
            Some(_) => {
                errors.push(FieldError::new("amount", "must be a number"));
                None
            }
        };

        let transaction_type = match form.transaction_type {
            Some(Value::String(text)) => match text.as_str() {
                "credit" => Some(TransactionType::Credit),
                "debit" => Some(TransactionType::Debit),
                _ => {
                    errors.push(FieldError::new(
                        "type",
                        "must be either \"credit\" or \"debit\"",
                    ));
                    None
                }
            },
            Some(Value::Null) | None => {
                errors.push(FieldError::new("type", "is required"));
                None
            }
            Some(_) => {
                errors.push(FieldError::new(
                    "type",
                    "must be either \"credit\" or \"debit\"",
                ));
                None
            }
        };

        match (title, amount, transaction_type) {
            (Some(title), Some(amount), Some(transaction_type)) if errors.is_empty() => {
                Ok(NewTransaction {
                    title,
                    amount,
                    transaction_type,
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// Validate the JSON body of a request to create a transaction.
///
/// A body that could not be parsed as a JSON object is reported as a problem
/// with the field "body".
///
/// # Errors
/// Returns an [Error::Validation] describing every invalid field.
pub fn decode_transaction_form(
    body: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<NewTransaction, Error> {
    match body {
        Ok(Json(form)) => NewTransaction::try_from(form),
        Err(rejection) => {
            tracing::debug!("Could not decode transaction body: {rejection}");
            Err(Error::invalid_field("body", rejection.body_text()))
        }
    }
}
