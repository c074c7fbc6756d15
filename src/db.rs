//! Database schema setup.

use rusqlite::{Connection, Transaction as SqlTransaction, functions::FunctionFlags};

use crate::{Error, transaction::create_transaction_table};

/// The name of the SQL function that lowercases text using Unicode case rules.
///
/// SQLite's built-in `lower` and `LIKE` only fold ASCII letters.
pub(crate) const CASEFOLD_FUNCTION: &str = "casefold";

/// Register the application's SQL functions and create its tables and
/// indexes if they do not exist yet.
///
/// SQL functions only live as long as `connection`, so this must be called
/// on every new connection.
///
/// # Errors
/// Returns an [Error::SqlError] if a function cannot be registered or any of
/// the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    register_functions(connection)?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

fn register_functions(connection: &Connection) -> Result<(), Error> {
    connection.create_scalar_function(
        CASEFOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |context| {
            let text = context.get::<Option<String>>(0)?;

            Ok(text.map(|text| text.to_lowercase()))
        },
    )?;

    Ok(())
}
