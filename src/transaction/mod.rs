//! Transactions: the product sale records served by the API.
//!
//! This module contains:
//! - The `Transaction` model and the `NewTransaction` seed record
//! - Database functions for storing and listing transactions
//! - The route handler for listing a month's transactions

mod core;
mod list_endpoint;
mod query;

pub use core::{
    NewTransaction, Transaction, count_transactions, create_transaction, create_transaction_table,
};
pub use list_endpoint::list_transactions_endpoint;
