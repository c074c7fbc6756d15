//! Counts of a month's sales per product category, for the pie chart.

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

/// The number of transactions in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    /// The category label.
    pub category: String,
    /// The number of transactions in the category.
    pub count: u32,
}

/// A route handler that responds with the number of transactions per category for a month.
pub async fn get_category_counts_endpoint(
    State(state): State<ReportState>,
    Query(query): Query<MonthQuery>,
) -> Response {
    match run_report(&state, &query, get_category_counts) {
        Ok(categories) => Json(categories).into_response(),
        Err(error) => error.into_api_response("Error fetching pie chart data"),
    }
}

/// Count the transactions within `month_range` for each category present in
/// that month, ordered by category name.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
fn get_category_counts(
    month_range: MonthRange,
    connection: &Connection,
) -> Result<Vec<CategoryCount>, Error> {
    let (start, end) = month_range.as_unix_timestamps();

    let categories = connection
        .prepare(
            "SELECT category, COUNT(*)
            FROM \"transaction\"
            WHERE date_of_sale >= ?1 AND date_of_sale < ?2
            GROUP BY category
            ORDER BY category ASC",
        )?
        .query_map([start, end], |row| {
            Ok(CategoryCount {
                category: row.get(0)?,
                count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    tracing::debug!("Pie chart data found: {categories:?}");

    Ok(categories)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::{endpoints, month::MonthRange, report::test_helpers::*};

    use super::{CategoryCount, get_category_counts};

    fn march_2022() -> MonthRange {
        MonthRange {
            start: datetime!(2022-03-01 0:00 UTC),
            end: datetime!(2022-04-01 0:00 UTC),
        }
    }

    #[test]
    fn counts_categories_in_month() {
        let conn = get_test_connection();
        let date = datetime!(2022-03-10 0:00 UTC);
        insert_sale(10.0, "electronics", true, date, &conn);
        insert_sale(20.0, "jewelery", false, date, &conn);
        insert_sale(30.0, "electronics", false, date, &conn);
        insert_sale(40.0, "men's clothing", true, datetime!(2022-04-10 0:00 UTC), &conn);

        let got = get_category_counts(march_2022(), &conn).unwrap();

        assert_eq!(
            got,
            [
                CategoryCount {
                    category: "electronics".to_owned(),
                    count: 2,
                },
                CategoryCount {
                    category: "jewelery".to_owned(),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn empty_month_has_no_categories() {
        let conn = get_test_connection();

        let got = get_category_counts(march_2022(), &conn).unwrap();

        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn endpoint_returns_category_counts() {
        let (server, state) = get_test_server();
        {
            let conn = state.db_connection.lock().unwrap();
            insert_sale(10.0, "electronics", true, datetime!(2022-03-10 0:00 UTC), &conn);
            insert_sale(20.0, "jewelery", false, datetime!(2022-03-11 0:00 UTC), &conn);
        }

        let response = server
            .get(endpoints::PIE_CHART)
            .add_query_param("month", "March")
            .add_query_param("year", "2022")
            .await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!([
            {"category": "electronics", "count": 1},
            {"category": "jewelery", "count": 1},
        ]));
    }

    #[tokio::test]
    async fn endpoint_rejects_missing_month() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::PIE_CHART)
            .add_query_param("year", "2022")
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Error fetching pie chart data");
        assert_eq!(body["error"], "missing query parameter \"month\"");
    }
}
