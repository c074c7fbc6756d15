use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Serialize;

use crate::{AppState, Error};

use super::loader::{fetch_seed_transactions, replace_all_transactions};

/// The state needed to seed the database.
#[derive(Debug, Clone)]
pub struct SeedState {
    /// The database connection for replacing transactions.
    db_connection: Arc<Mutex<Connection>>,
    /// The client used to download the seed document.
    http_client: reqwest::Client,
    /// The URL of the seed document.
    seed_url: String,
}

impl FromRef<AppState> for SeedState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            http_client: state.http_client.clone(),
            seed_url: state.seed_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct InitializeResponse {
    message: &'static str,
    count: u32,
}

/// A route handler that replaces all stored transactions with the seed document.
pub async fn initialize_database_endpoint(State(state): State<SeedState>) -> Response {
    match initialize_database(&state).await {
        Ok(count) => Json(InitializeResponse {
            message: "Database initialized",
            count,
        })
        .into_response(),
        Err(error) => error.into_api_response("Error initializing database"),
    }
}

async fn initialize_database(state: &SeedState) -> Result<u32, Error> {
    let transactions = fetch_seed_transactions(&state.http_client, &state.seed_url).await?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let count = replace_all_transactions(&transactions, &connection)?;
    tracing::info!("Seeded database with {count} transactions from {}", state.seed_url);

    Ok(count)
}
