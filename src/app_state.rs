//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, db::initialize, pagination::PaginationConfig, timezone::get_timezone};

/// The settings the server needs in addition to the database connection.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// The URL of the JSON document used to seed the transaction store.
    pub seed_url: String,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    ///
    /// Month boundaries are computed at midnight in this timezone.
    pub local_timezone: String,

    /// The config that controls how to page through transactions.
    pub pagination_config: PaginationConfig,
}

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The client used to download the seed document.
    pub http_client: reqwest::Client,

    /// The URL of the JSON document used to seed the transaction store.
    pub seed_url: String,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Kolkata".
    pub local_timezone: String,

    /// The config that controls how to page through transactions.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or if
    /// `config.local_timezone` is not a valid, canonical timezone name.
    pub fn new(
        db_connection: Connection,
        http_client: reqwest::Client,
        config: AppConfig,
    ) -> Result<Self, Error> {
        if get_timezone(&config.local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(config.local_timezone));
        }

        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            http_client,
            seed_url: config.seed_url,
            local_timezone: config.local_timezone,
            pagination_config: config.pagination_config,
        })
    }
}
