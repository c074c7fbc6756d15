//! Application router configuration.

use axum::{Router, routing::get};

use crate::{
    AppState, endpoints,
    not_found::get_404_not_found,
    report::{get_category_counts_endpoint, get_price_histogram_endpoint, get_statistics_endpoint},
    seed::initialize_database_endpoint,
    transaction::list_transactions_endpoint,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::INITIALIZE, get(initialize_database_endpoint))
        .route(endpoints::TRANSACTIONS, get(list_transactions_endpoint))
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .route(endpoints::BAR_CHART, get(get_price_histogram_endpoint))
        .route(endpoints::PIE_CHART, get(get_category_counts_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}
