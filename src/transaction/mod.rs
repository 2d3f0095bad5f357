//! Transaction management for the ledger.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the validated `NewTransaction` input
//! - Database functions for storing and querying transactions
//! - Route handlers for the transaction endpoints

mod core;
mod create_endpoint;
mod form;
mod get_endpoint;
mod list_endpoint;
mod summary_endpoint;

pub use core::{
    InvalidTransactionId, NewTransaction, Transaction, TransactionId, TransactionType,
    count_transactions, create_transaction, create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use get_endpoint::{TransactionResponse, get_transaction_endpoint};
pub use list_endpoint::{TransactionListResponse, list_transactions_endpoint};
pub use summary_endpoint::{Summary, SummaryResponse, get_summary_endpoint};
