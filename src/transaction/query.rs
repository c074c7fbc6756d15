//! Database query helpers for listing a month's transactions.

use rusqlite::{Connection, params_from_iter, types::Value};

use crate::{Error, db::CASEFOLD_FUNCTION, month::MonthRange, pagination::PageWindow};

use super::core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row};

/// The character used to escape wildcards in `LIKE` patterns.
const LIKE_ESCAPE: char = '\\';

/// Which transactions to list.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TransactionFilter {
    /// Only transactions sold within this month are listed.
    pub month_range: MonthRange,
    /// Only transactions whose title or description contain this text,
    /// ignoring case in any script, are listed.
    pub search: Option<String>,
}

impl TransactionFilter {
    /// Create a filter, ignoring `search` if it is empty or only whitespace.
    pub(crate) fn new(month_range: MonthRange, search: Option<&str>) -> Self {
        let search = search
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_owned);

        Self {
            month_range,
            search,
        }
    }
}

/// Escape `text` so that it is matched literally inside a `LIKE` pattern.
fn escape_like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if c == '%' || c == '_' || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }

    escaped
}

/// Get one page of the transactions matching `filter`, in insertion order.
///
/// Requesting a page past the last page returns an empty list.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - SQL query preparation or execution fails
/// - Transaction row mapping fails
pub(crate) fn get_transactions_page(
    filter: &TransactionFilter,
    window: PageWindow,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let (start, end) = filter.month_range.as_unix_timestamps();
    let mut params = vec![Value::Integer(start), Value::Integer(end)];

    let search_clause = match &filter.search {
        Some(search) => {
            let pattern = escape_like_pattern(&search.to_lowercase());
            params.push(Value::Text(format!("%{pattern}%")));
            format!(
                "AND ({CASEFOLD_FUNCTION}(title) LIKE ?3 ESCAPE '{LIKE_ESCAPE}' \
                OR {CASEFOLD_FUNCTION}(description) LIKE ?3 ESCAPE '{LIKE_ESCAPE}')"
            )
        }
        None => String::new(),
    };

    let limit_param = params.len() + 1;
    let offset_param = params.len() + 2;
    params.push(Value::Integer(clamp_to_i64(window.limit)));
    params.push(Value::Integer(clamp_to_i64(window.offset)));

    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
        WHERE date_of_sale >= ?1 AND date_of_sale < ?2 {search_clause} \
        ORDER BY id ASC \
        LIMIT ?{limit_param} OFFSET ?{offset_param}"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::SqlError))
        .collect()
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
