//! Aggregate reports over the transactions sold in one calendar month.
//!
//! Each report is a single aggregation query run by the database:
//! - summary statistics (total sale amount, sold and unsold counts),
//! - a price histogram with buckets of width 100,
//! - the number of transactions per category.

mod categories;
mod price_histogram;
mod statistics;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    month::{MonthQuery, MonthRange},
};

pub use categories::get_category_counts_endpoint;
pub use price_histogram::get_price_histogram_endpoint;
pub use statistics::get_statistics_endpoint;

/// The state needed for the report endpoints.
#[derive(Debug, Clone)]
pub struct ReportState {
    /// The database connection for querying transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    local_timezone: String,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Resolve the month in `query` and run `report` over it.
fn run_report<T>(
    state: &ReportState,
    query: &MonthQuery,
    report: impl FnOnce(MonthRange, &Connection) -> Result<T, Error>,
) -> Result<T, Error> {
    let month_range = query.to_range(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    report(month_range, &connection)
}
