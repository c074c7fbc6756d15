//! Downloading the seed document and replacing the stored transactions with it.

use std::time::Duration;

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    transaction::{NewTransaction, count_transactions, create_transaction},
};

/// The seed document used when no other URL is configured.
pub const DEFAULT_SEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// Build the HTTP client used to download seed documents.
///
/// Requests time out after `timeout`.
///
/// # Errors
/// Returns [Error::SeedFetchError] if the client cannot be built, e.g. when
/// the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| Error::SeedFetchError(format!("HTTP client error: {error}")))
}

/// Download and parse the seed document at `url`.
///
/// # Errors
/// This function will return a:
/// - [Error::SeedFetchError] if the request fails or the server does not respond with a success status,
/// - or [Error::SeedParseError] if the response is not a JSON array of transactions.
pub async fn fetch_seed_transactions(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<NewTransaction>, Error> {
    tracing::debug!("Fetching seed data from {url}");

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|error| Error::SeedFetchError(error.to_string()))?;

    let body = response
        .bytes()
        .await
        .map_err(|error| Error::SeedFetchError(error.to_string()))?;

    parse_seed_transactions(&body)
}

/// Parse a seed document, a JSON array of transactions.
///
/// # Errors
/// Returns [Error::SeedParseError] if `json` is not a JSON array of transactions.
pub fn parse_seed_transactions(json: &[u8]) -> Result<Vec<NewTransaction>, Error> {
    serde_json::from_slice(json).map_err(|error| Error::SeedParseError(error.to_string()))
}

/// Delete every stored transaction and insert `transactions` in their place,
/// returning the number of stored transactions.
///
/// The replacement happens in a single database transaction: if any insert
/// fails the previous transactions are kept, and other connections never see
/// a partially replaced store. Transaction IDs start from 1 again.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidPrice] if any transaction has a negative or non-finite price,
/// - or [Error::SqlError] if there is some SQL error.
pub fn replace_all_transactions(
    transactions: &[NewTransaction],
    connection: &Connection,
) -> Result<u32, Error> {
    transactions.iter().try_for_each(NewTransaction::validate)?;

    let sql_transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Immediate)?;

    sql_transaction.execute("DELETE FROM \"transaction\"", ())?;
    sql_transaction.execute(
        "DELETE FROM sqlite_sequence WHERE name = 'transaction'",
        (),
    )?;

    for transaction in transactions {
        create_transaction(transaction, &sql_transaction)?;
    }

    let count = count_transactions(&sql_transaction)?;
    sql_transaction.commit()?;

    Ok(count)
}
