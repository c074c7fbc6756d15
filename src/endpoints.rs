//! The API endpoints URIs.

/// The route for replacing the stored transactions with the seed document.
pub const INITIALIZE: &str = "/api/initialize";
/// The route for listing a month's transactions.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for a month's summary statistics.
pub const STATISTICS: &str = "/api/statistics";
/// The route for a month's price histogram.
pub const BAR_CHART: &str = "/api/bar-chart";
/// The route for a month's transaction counts per category.
pub const PIE_CHART: &str = "/api/pie-chart";
