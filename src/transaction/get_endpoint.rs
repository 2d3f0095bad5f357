//! Defines the endpoint for fetching a single transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::TransactionState,
    session::SessionId,
    transaction::{Transaction, TransactionId, core::get_transaction},
};

/// The response body for fetching a transaction.
///
/// `transaction` is left out of the JSON entirely when the session has no
/// transaction with the requested ID.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionResponse {
    /// The matching transaction, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<Transaction>,
}

/// A route handler for fetching one of the caller's transactions by its ID.
///
/// A well-formed ID that does not match a transaction in the caller's session
/// is not an error, the response simply has no transaction in it.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(session_id): Extension<SessionId>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, Error> {
    let transaction_id: TransactionId = transaction_id
        .parse()
        .map_err(|_| Error::invalid_field("id", "must be a valid UUID"))?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = get_transaction(transaction_id, &session_id, &connection)?;

    Ok(Json(TransactionResponse { transaction }))
}
