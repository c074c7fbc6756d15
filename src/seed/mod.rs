//! Seeding the transaction store from a remote JSON document.

mod initialize_endpoint;
mod loader;

pub use initialize_endpoint::initialize_database_endpoint;
pub use loader::{
    DEFAULT_SEED_URL, build_http_client, fetch_seed_transactions, parse_seed_transactions,
    replace_all_transactions,
};
