//! Defines the route handler that lists a month's transactions.
use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{AppState, Error, month::MonthQuery, pagination::PaginationConfig};

use super::query::{TransactionFilter, get_transactions_page};

/// The query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// The month to list transactions for, see [MonthQuery::month].
    pub month: Option<String>,
    /// The year to list transactions for.
    pub year: Option<String>,
    /// Only list transactions whose title or description contains this text.
    pub search: Option<String>,
    /// The one-based page number.
    ///
    /// Kept as text so that bad values get the same JSON error as other failures.
    pub page: Option<String>,
    /// The maximum number of transactions per page.
    #[serde(rename = "perPage")]
    pub per_page: Option<String>,
}

/// The state needed for listing transactions.
#[derive(Debug, Clone)]
pub struct TransactionsState {
    /// The database connection for querying transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    local_timezone: String,
    /// The default page number and size.
    pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// A route handler that responds with one page of a month's transactions as JSON.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionsState>,
    Query(query): Query<TransactionsQuery>,
) -> Response {
    match list_transactions(&state, query) {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_api_response("Error fetching transactions"),
    }
}

fn list_transactions(
    state: &TransactionsState,
    query: TransactionsQuery,
) -> Result<Vec<super::Transaction>, Error> {
    let month_range = MonthQuery {
        month: query.month,
        year: query.year,
    }
    .to_range(&state.local_timezone)?;
    let window = state
        .pagination_config
        .window(query.page.as_deref(), query.per_page.as_deref())?;
    let filter = TransactionFilter::new(month_range, query.search.as_deref());

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_page(&filter, window, &connection)?;
    tracing::debug!(
        "Found {} transactions for {filter:?} at {window:?}",
        transactions.len()
    );

    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        AppConfig, AppState, PaginationConfig, build_router, endpoints,
        transaction::{NewTransaction, Transaction, create_transaction},
    };

    fn get_test_server() -> (TestServer, AppState) {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            reqwest::Client::new(),
            AppConfig {
                seed_url: "http://127.0.0.1:1/seed.json".to_owned(),
                local_timezone: "Etc/UTC".to_owned(),
                pagination_config: PaginationConfig::default(),
            },
        )
        .expect("Could not create app state");
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        (server, state)
    }

    fn insert_transactions(state: &AppState, count: usize) {
        let connection = state.db_connection.lock().unwrap();
        for i in 0..count {
            create_transaction(
                &NewTransaction {
                    title: format!("Product #{i}"),
                    description: if i % 2 == 0 {
                        "Mouse Pad".to_owned()
                    } else {
                        "Keyboard".to_owned()
                    },
                    price: i as f64,
                    category: "electronics".to_owned(),
                    sold: i % 3 == 0,
                    date_of_sale: datetime!(2022-03-10 12:00 UTC),
                    image: None,
                },
                &connection,
            )
            .unwrap();
        }
    }

    #[tokio::test]
    async fn lists_first_page_by_default() {
        let (server, state) = get_test_server();
        insert_transactions(&state, 15);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "March")
            .add_query_param("year", "2022")
            .await;

        response.assert_status_ok();
        let transactions = response.json::<Vec<Transaction>>();
        assert_eq!(transactions.len(), 10);
        assert_eq!(transactions[0].id, 1);
    }

    #[tokio::test]
    async fn lists_requested_page() {
        let (server, state) = get_test_server();
        insert_transactions(&state, 15);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .add_query_param("page", 2)
            .add_query_param("perPage", 4)
            .await;

        response.assert_status_ok();
        let ids: Vec<_> = response
            .json::<Vec<Transaction>>()
            .iter()
            .map(|transaction| transaction.id)
            .collect();
        assert_eq!(ids, [5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let (server, state) = get_test_server();
        insert_transactions(&state, 3);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .add_query_param("page", 5)
            .await;

        response.assert_status_ok();
        assert!(response.json::<Vec<Transaction>>().is_empty());
    }

    #[tokio::test]
    async fn filters_by_search() {
        let (server, state) = get_test_server();
        insert_transactions(&state, 6);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .add_query_param("search", "mouse")
            .await;

        response.assert_status_ok();
        let titles: Vec<_> = response
            .json::<Vec<Transaction>>()
            .into_iter()
            .map(|transaction| transaction.title)
            .collect();
        assert_eq!(titles, ["Product #0", "Product #2", "Product #4"]);
    }

    #[tokio::test]
    async fn other_months_are_empty() {
        let (server, state) = get_test_server();
        insert_transactions(&state, 3);

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "April")
            .add_query_param("year", "2022")
            .await;

        response.assert_status_ok();
        assert!(response.json::<Vec<Transaction>>().is_empty());
    }

    #[tokio::test]
    async fn invalid_month_is_bad_request() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "Smarch")
            .add_query_param("year", "2022")
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Error fetching transactions");
    }

    #[tokio::test]
    async fn zero_page_is_bad_request() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .add_query_param("page", 0)
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn non_numeric_page_is_json_bad_request() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .add_query_param("page", "abc")
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Error fetching transactions");
        assert_eq!(
            body["error"],
            "\"page\" must be a number greater than zero"
        );
    }

    #[tokio::test]
    async fn negative_page_size_is_json_bad_request() {
        let (server, _) = get_test_server();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .add_query_param("perPage", "-1")
            .await;

        response.assert_status_bad_request();
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["message"], "Error fetching transactions");
        assert_eq!(
            body["error"],
            "\"perPage\" must be a number greater than zero"
        );
    }

    #[tokio::test]
    async fn search_ignores_case_of_accented_letters() {
        let (server, state) = get_test_server();
        insert_transactions(&state, 2);
        create_transaction(
            &NewTransaction {
                title: "Écran Plat".to_owned(),
                description: "32 inch".to_owned(),
                price: 120.0,
                category: "electronics".to_owned(),
                sold: true,
                date_of_sale: datetime!(2022-03-12 9:00 UTC),
                image: None,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("month", "3")
            .add_query_param("year", "2022")
            .add_query_param("search", "écran")
            .await;

        response.assert_status_ok();
        let titles: Vec<_> = response
            .json::<Vec<Transaction>>()
            .into_iter()
            .map(|transaction| transaction.title)
            .collect();
        assert_eq!(titles, ["Écran Plat"]);
    }
}
