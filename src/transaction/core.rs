//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, types::Type};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// A sale event for a single product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction, in insertion order.
    pub id: TransactionId,
    /// The name of the product.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The sale price of the product, never negative.
    pub price: f64,
    /// The product category, e.g. "electronics".
    pub category: String,
    /// Whether the product was sold.
    pub sold: bool,
    /// When the sale happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
    /// A link to a picture of the product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A transaction that has not been stored yet, as found in the seed document.
///
/// Any `id` in the seed document is ignored since the store assigns its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    /// The name of the product.
    pub title: String,
    /// A text description of the product.
    pub description: String,
    /// The sale price of the product.
    ///
    /// Must be finite and not negative, see [NewTransaction::validate].
    pub price: f64,
    /// The product category, e.g. "electronics".
    pub category: String,
    /// Whether the product was sold.
    pub sold: bool,
    /// When the sale happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
    /// A link to a picture of the product.
    #[serde(default)]
    pub image: Option<String>,
}

impl NewTransaction {
    /// Check that the transaction can be stored.
    ///
    /// # Errors
    /// Returns [Error::InvalidPrice] if the price is negative, NaN or infinite.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(Error::InvalidPrice(self.title.clone(), self.price));
        }

        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// The columns of the transaction table in the order expected by [map_transaction_row].
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, title, description, price, category, sold, date_of_sale, image";

/// Insert a new transaction into the database.
///
/// The transaction is not validated, callers should use [NewTransaction::validate] first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error,
/// including when the price violates the table's check constraint.
pub fn create_transaction(
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (title, description, price, category, sold, date_of_sale, image)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                &transaction.title,
                &transaction.description,
                transaction.price,
                &transaction.category,
                transaction.sold,
                transaction.date_of_sale.unix_timestamp(),
                &transaction.image,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                price REAL NOT NULL CHECK (price >= 0),
                category TEXT NOT NULL,
                sold INTEGER NOT NULL,
                date_of_sale INTEGER NOT NULL,
                image TEXT
                )",
        (),
    )?;

    // Every query filters by the month of sale.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date_of_sale ON \"transaction\"(date_of_sale);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
///
/// The row must contain the columns listed in [TRANSACTION_COLUMNS], in order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let timestamp: i64 = row.get(6)?;
    let date_of_sale = OffsetDateTime::from_unix_timestamp(timestamp).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(6, Type::Integer, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        category: row.get(4)?,
        sold: row.get(5)?,
        date_of_sale,
        image: row.get(7)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        transaction::{NewTransaction, count_transactions, create_transaction},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_transaction(price: f64) -> NewTransaction {
        NewTransaction {
            title: "Mouse Pad".to_owned(),
            description: "A pad for your mouse".to_owned(),
            price,
            category: "electronics".to_owned(),
            sold: true,
            date_of_sale: datetime!(2022-03-15 10:30 +05:30),
            image: None,
        }
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let transaction = create_transaction(&new_transaction(12.5), &conn).unwrap();

        assert_eq!(transaction.id, 1);
        assert_eq!(transaction.price, 12.5);
        assert_eq!(transaction.title, "Mouse Pad");
        assert!(transaction.sold);
        assert_eq!(transaction.date_of_sale, datetime!(2022-03-15 05:00 UTC));
    }

    #[test]
    fn create_fails_on_negative_price() {
        let conn = get_test_connection();

        let result = create_transaction(&new_transaction(-1.0), &conn);

        assert!(matches!(result, Err(Error::SqlError(_))));
    }

    #[test]
    fn validate_rejects_invalid_prices() {
        assert_eq!(new_transaction(0.0).validate(), Ok(()));
        assert_eq!(
            new_transaction(-0.5).validate(),
            Err(Error::InvalidPrice("Mouse Pad".to_owned(), -0.5))
        );
        assert!(new_transaction(f64::INFINITY).validate().is_err());
        assert!(new_transaction(f64::NAN).validate().is_err());
    }

    #[test]
    fn get_count() {
        let conn = get_test_connection();
        let want_count = 20;
        for i in 1..=want_count {
            create_transaction(&new_transaction(i as f64), &conn)
                .expect("Could not create transaction");
        }

        let got_count = count_transactions(&conn).expect("Could not get count");

        assert_eq!(want_count, got_count);
    }

    #[test]
    fn deserializes_seed_record() {
        let json = r#"{
            "id": 1,
            "title": "Fjallraven  - Foldsack No. 1 Backpack, Fits 15 Laptops",
            "price": 329.85,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://fakestoreapi.com/img/81fPKd-2AYL._AC_SL1500_.jpg",
            "sold": false,
            "dateOfSale": "2021-11-27T20:29:54+05:30"
        }"#;

        let transaction: NewTransaction = serde_json::from_str(json).unwrap();

        assert_eq!(transaction.price, 329.85);
        assert_eq!(transaction.category, "men's clothing");
        assert!(!transaction.sold);
        assert_eq!(transaction.date_of_sale, datetime!(2021-11-27 20:29:54 +05:30));
        assert!(transaction.image.is_some());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let conn = get_test_connection();
        let transaction = create_transaction(&new_transaction(1.0), &conn).unwrap();

        let json = serde_json::to_value(&transaction).unwrap();

        assert_eq!(json["dateOfSale"], "2022-03-15T05:00:00Z");
        assert_eq!(json["id"], 1);
        assert!(json.get("image").is_none());
    }
}
