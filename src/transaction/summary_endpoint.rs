//! Defines the endpoint for a session's running balance.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::{
    Error, app_state::TransactionState, session::SessionId, transaction::core::sum_transactions,
};

/// The balance of a session.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Credits minus debits.
    pub amount: f64,
}

/// The response body for the balance summary.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// The balance of the caller's session.
    pub summary: Summary,
}

/// A route handler for the sum of every transaction amount in the caller's session.
pub async fn get_summary_endpoint(
    State(state): State<TransactionState>,
    Extension(session_id): Extension<SessionId>,
) -> Result<Json<SummaryResponse>, Error> {
    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let amount = sum_transactions(&session_id, &connection)?;

    Ok(Json(SummaryResponse {
        summary: Summary { amount },
    }))
}
