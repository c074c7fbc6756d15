//! Totals of sale amounts and sold items for one month.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    month::{MonthQuery, MonthRange},
};

use super::{ReportState, run_report};

/// The sales totals for a month.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// The sum of the prices of all transactions.
    pub total_amount: f64,
    /// The number of transactions where the product was sold.
    pub total_sold: u32,
    /// The number of transactions where the product was not sold.
    pub total_not_sold: u32,
}

/// A route handler that responds with the summary statistics for a month.
pub async fn get_statistics_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Response {
    match run_report(&state, &query, get_statistics) {
        Ok(statistics) => Json(statistics).into_response(),
        Err(error) => error.into_api_response("Error fetching statistics"),
    }
}

/// Sum the prices and count the sold and unsold transactions within `month_range`.
///
/// A month without transactions has all totals set to zero.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
fn get_statistics(month_range: MonthRange, connection: &Connection) -> Result<Statistics, Error> {
    let (start, end) = month_range.as_unix_timestamps();

    let statistics = connection
        .prepare(
            "SELECT
                COALESCE(SUM(price), 0.0),
                COALESCE(SUM(CASE WHEN sold THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN sold THEN 0 ELSE 1 END), 0)
            FROM \"transaction\"
            WHERE date_of_sale >= ?1 AND date_of_sale < ?2",
        )?
        .query_row([start, end], |row| {
            Ok(Statistics {
                total_amount: row.get(0)?,
                total_sold: row.get(1)?,
                total_not_sold: row.get(2)?,
            })
        })?;

    tracing::debug!("Statistics found: {statistics:?}");

    Ok(statistics)
}
