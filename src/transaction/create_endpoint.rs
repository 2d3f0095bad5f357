//! Defines the endpoint for recording a new transaction.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;

use crate::{
    Error,
    app_state::CreateTransactionState,
    session::Session,
    transaction::{
        core::create_transaction,
        form::{TransactionForm, decode_transaction_form},
    },
};

/// A route handler for recording a new transaction, responds with 201 Created
/// and an empty body on success.
///
/// Clients without a session cookie are issued a new session and the cookie
/// is returned with the response. Nothing is written and no session is issued
/// if the body is invalid.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    jar: CookieJar,
    body: Result<Json<TransactionForm>, JsonRejection>,
) -> Result<(CookieJar, StatusCode), Error> {
    let new_transaction = decode_transaction_form(body)?;

    let session = Session::from_jar(&jar);

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let transaction = create_transaction(new_transaction, session.id(), &connection)?;

    tracing::debug!(
        "Created transaction {} for session {}",
        transaction.id,
        transaction.session_id
    );

    Ok((
        session.persist(jar, state.session_duration),
        StatusCode::CREATED,
    ))
}
