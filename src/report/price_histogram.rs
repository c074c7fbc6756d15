//! Counts of a month's sales grouped into price ranges, for the bar chart.

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

/// The width of each price bucket.
const BUCKET_WIDTH: u32 = 100;
/// The number of buckets with an upper bound. Prices at or above
/// `BUCKET_WIDTH * BOUNDED_BUCKET_COUNT` go into a final, open-ended bucket.
const BOUNDED_BUCKET_COUNT: u32 = 10;

/// The number of transactions with a price in the range `[min, max)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRangeCount {
    /// A label for the price range, e.g. "100-200" or "1000-above".
    pub range: String,
    /// The inclusive lower bound of the range.
    pub min: u32,
    /// The exclusive upper bound of the range, `None` for the open-ended bucket.
    pub max: Option<u32>,
    /// The number of transactions in the range.
    pub count: u32,
}

impl PriceRangeCount {
    fn new(bucket: u32, count: u32) -> Self {
        let min = bucket * BUCKET_WIDTH;

        if bucket >= BOUNDED_BUCKET_COUNT {
            Self {
                range: format!("{min}-above"),
                min,
                max: None,
                count,
            }
        } else {
            let max = min + BUCKET_WIDTH;
            Self {
                range: format!("{min}-{max}"),
                min,
                max: Some(max),
                count,
            }
        }
    }
}

/// A route handler that responds with the price histogram for a month.
pub async fn get_price_histogram_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Response {
    match run_report(&state, &query, get_price_histogram) {
        Ok(histogram) => Json(histogram).into_response(),
        Err(error) => error.into_api_response("Error fetching bar chart data"),
    }
}

/// Count the transactions within `month_range` per price bucket.
///
/// Only buckets containing at least one transaction are returned, ordered by
/// price. A month without transactions yields an empty list.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
fn get_price_histogram(
    month_range: MonthRange,
    connection: &Connection,
) -> Result<Vec<PriceRangeCount>, Error> {
    let (start, end) = month_range.as_unix_timestamps();

    let histogram = connection
        .prepare(&format!(
            "SELECT MIN(CAST(price / {BUCKET_WIDTH} AS INTEGER), {BOUNDED_BUCKET_COUNT}) AS bucket, COUNT(*)
            FROM \"transaction\"
            WHERE date_of_sale >= ?1 AND date_of_sale < ?2
            GROUP BY bucket
            ORDER BY bucket ASC"
        ))?
        .query_map([start, end], |row| {
            Ok(PriceRangeCount::new(row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    tracing::debug!("Bar chart data found: {histogram:?}");

    Ok(histogram)
}
