//! Defines the endpoint for listing a session's transactions.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::TransactionState,
    session::SessionId,
    transaction::{Transaction, core::list_transactions},
};

/// The response body for listing transactions.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    /// The session's transactions in the order they were recorded.
    pub transactions: Vec<Transaction>,
}

/// A route handler for listing every transaction recorded under the caller's session.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<TransactionListResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transactions = list_transactions(&session_id, &connection)?;

    Ok(Json(TransactionListResponse { transactions }))
}
