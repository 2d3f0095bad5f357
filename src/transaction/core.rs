//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, OptionalExtension, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, session::SessionId};

// ============================================================================
// MODELS
// ============================================================================

/// The globally unique ID of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new, random transaction ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// The error returned when parsing a [TransactionId] from a string that is not
/// a UUID in the hyphenated form, e.g. "67e55044-10b1-426f-9247-bb680e5fe0c8".
#[derive(Debug, thiserror::Error, PartialEq)]
#[error("\"{0}\" is not a hyphenated UUID")]
pub struct InvalidTransactionId(String);

const HYPHENATED_UUID_LENGTH: usize = 36;

impl FromStr for TransactionId {
    type Err = InvalidTransactionId;

    /// Parse a UUID in the hyphenated form only.
    ///
    /// The simple, braced and URN forms are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HYPHENATED_UUID_LENGTH {
            return Err(InvalidTransactionId(s.to_owned()));
        }

        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidTransactionId(s.to_owned()))
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for TransactionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for TransactionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;

        Uuid::parse_str(text)
            .map(Self)
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in.
    Credit,
    /// Money going out.
    Debit,
}

impl TransactionType {
    /// The amount to store for a transaction of this type.
    ///
    /// Credits keep the sign of `amount`, debits negate it.
    pub fn signed_amount(self, amount: f64) -> f64 {
        match self {
            TransactionType::Credit => amount,
            TransactionType::Debit => -amount,
        }
    }
}

/// A credit or debit recorded against a session.
///
/// The type of the transaction is not stored, it is encoded in the sign of
/// `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub title: String,
    /// The amount of money earned (positive) or spent (negative).
    pub amount: f64,
    /// The session the transaction belongs to.
    pub session_id: SessionId,
    /// When the transaction was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated request to record a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A text description of what the transaction was for.
    pub title: String,
    /// The magnitude of the transaction as submitted by the client.
    pub amount: f64,
    /// Whether `amount` was earned or spent.
    pub transaction_type: TransactionType,
}

impl NewTransaction {
    /// The amount as it will be stored, negative for debits.
    pub fn signed_amount(&self) -> f64 {
        self.transaction_type.signed_amount(self.amount)
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Record a new transaction under `session_id`.
///
/// A new ID is generated for the transaction and debits are stored with a
/// negative amount.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let amount = new_transaction.signed_amount();

    let transaction = connection
        .prepare(
            "INSERT INTO transactions (id, title, amount, session_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, title, amount, session_id, created_at",
        )?
        .query_row(
            (
                TransactionId::generate(),
                new_transaction.title,
                amount,
                session_id,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get every transaction recorded under `session_id` in the order they were
/// created.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn list_transactions(
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut statement = connection.prepare(
        "SELECT id, title, amount, session_id, created_at FROM transactions
         WHERE session_id = :session_id
         ORDER BY rowid",
    )?;

    let transactions = statement
        .query_map(&[(":session_id", session_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect();

    transactions
}

/// Retrieve the transaction with `id` if it belongs to `session_id`.
///
/// Returns `None` if no transaction has that ID or if it belongs to a
/// different session.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transaction(
    id: TransactionId,
    session_id: &SessionId,
    connection: &Connection,
) -> Result<Option<Transaction>, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, title, amount, session_id, created_at FROM transactions
             WHERE id = ?1 AND session_id = ?2",
        )?
        .query_row((id, session_id), map_transaction_row)
        .optional()?;

    Ok(transaction)
}

/// Get the sum of the amounts of every transaction recorded under `session_id`.
///
/// A session without any transactions sums to zero.
///
/// # Errors
/// This function will return a:
/// - [Error::SqlError] if there is an SQL error,
/// - [Error::SumOutOfRange] if the sum does not fit in an `f64`.
pub fn sum_transactions(session_id: &SessionId, connection: &Connection) -> Result<f64, Error> {
    let sum: f64 = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0.0) FROM transactions WHERE session_id = ?1",
        (session_id,),
        |row| row.get(0),
    )?;

    if !sum.is_finite() {
        return Err(Error::SumOutOfRange);
    }

    Ok(sum)
}

/// Get the total number of transactions in the database across all sessions.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM transactions;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                amount REAL NOT NULL,
                session_id TEXT NOT NULL,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Every read is scoped to a session.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transactions_session_id ON transactions(session_id);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let amount = row.get(2)?;
    let session_id = row.get(3)?;
    let created_at = row.get(4)?;

    Ok(Transaction {
        id,
        title,
        amount,
        session_id,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        session::SessionId,
        transaction::{
            NewTransaction, TransactionId, TransactionType,
            core::{
                count_transactions, create_transaction, get_transaction, list_transactions,
                sum_transactions,
            },
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_transaction(
        title: &str,
        amount: f64,
        transaction_type: TransactionType,
    ) -> NewTransaction {
        NewTransaction {
            title: title.to_owned(),
            amount,
            transaction_type,
        }
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();
        let session_id = SessionId::new("session");

        let result = create_transaction(
            new_transaction("Salary", 5000.0, TransactionType::Credit),
            &session_id,
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.title, "Salary");
                assert_eq!(transaction.amount, 5000.0);
                assert_eq!(transaction.session_id, session_id);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_negates_debits() {
        let conn = get_test_connection();

        let transaction = create_transaction(
            new_transaction("Rent", 2000.0, TransactionType::Debit),
            &SessionId::new("session"),
            &conn,
        )
        .unwrap();

        assert_eq!(transaction.amount, -2000.0);
    }

    #[test]
    fn create_generates_unique_ids() {
        let conn = get_test_connection();
        let session_id = SessionId::new("session");

        let first = create_transaction(
            new_transaction("Coffee", 4.5, TransactionType::Debit),
            &session_id,
            &conn,
        )
        .unwrap();
        let second = create_transaction(
            new_transaction("Coffee", 4.5, TransactionType::Debit),
            &session_id,
            &conn,
        )
        .unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(count_transactions(&conn).unwrap(), 2);
    }

    #[test]
    fn list_only_returns_transactions_for_session() {
        let conn = get_test_connection();
        let session_id = SessionId::new("mine");
        let other_session_id = SessionId::new("theirs");
        let mut want = Vec::new();
        for i in 1..=3 {
            want.push(
                create_transaction(
                    new_transaction(&format!("Mine #{i}"), i as f64, TransactionType::Credit),
                    &session_id,
                    &conn,
                )
                .unwrap(),
            );
            create_transaction(
                new_transaction(&format!("Theirs #{i}"), i as f64, TransactionType::Credit),
                &other_session_id,
                &conn,
            )
            .unwrap();
        }

        let got = list_transactions(&session_id, &conn).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn list_for_new_session_is_empty() {
        let conn = get_test_connection();

        let got = list_transactions(&SessionId::new("nobody"), &conn).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn get_returns_transaction_for_session() {
        let conn = get_test_connection();
        let session_id = SessionId::new("session");
        let want = create_transaction(
            new_transaction("Groceries", 120.0, TransactionType::Debit),
            &session_id,
            &conn,
        )
        .unwrap();

        let got = get_transaction(want.id, &session_id, &conn).unwrap();

        assert_eq!(got, Some(want));
    }

    #[test]
    fn get_returns_none_for_unknown_id() {
        let conn = get_test_connection();

        let got =
            get_transaction(TransactionId::generate(), &SessionId::new("session"), &conn).unwrap();

        assert_eq!(got, None);
    }

    #[test]
    fn get_returns_none_for_other_session() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            new_transaction("Groceries", 120.0, TransactionType::Debit),
            &SessionId::new("mine"),
            &conn,
        )
        .unwrap();

        let got = get_transaction(transaction.id, &SessionId::new("theirs"), &conn).unwrap();

        assert_eq!(got, None);
    }

    #[test]
    fn sum_adds_credits_and_subtracts_debits() {
        let conn = get_test_connection();
        let session_id = SessionId::new("session");
        create_transaction(
            new_transaction("Credit transaction", 5000.0, TransactionType::Credit),
            &session_id,
            &conn,
        )
        .unwrap();
        create_transaction(
            new_transaction("Debit transaction", 2000.0, TransactionType::Debit),
            &session_id,
            &conn,
        )
        .unwrap();
        create_transaction(
            new_transaction("Someone else", 999.0, TransactionType::Credit),
            &SessionId::new("other"),
            &conn,
        )
        .unwrap();

        let got = sum_transactions(&session_id, &conn).unwrap();

        assert_eq!(got, 3000.0);
    }

    #[test]
    fn sum_of_empty_session_is_zero() {
        let conn = get_test_connection();

        let got = sum_transactions(&SessionId::new("nobody"), &conn).unwrap();

        assert_eq!(got, 0.0);
    }

    #[test]
    fn sum_that_overflows_is_an_error() {
        let conn = get_test_connection();
        let session_id = SessionId::new("session");
        for _ in 0..2 {
            create_transaction(
                new_transaction("Windfall", 1e308, TransactionType::Credit),
                &session_id,
                &conn,
            )
            .unwrap();
        }

        let got = sum_transactions(&session_id, &conn);

        assert_eq!(got, Err(Error::SumOutOfRange));
    }
}
