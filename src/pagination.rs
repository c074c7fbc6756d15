//! This modules defines the common functionality for paging data.

use crate::Error;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to return per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
        }
    }
}

/// The slice of a result set to return for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// The number of rows to skip.
    pub offset: u64,
    /// The maximum number of rows to return.
    pub limit: u64,
}

impl PaginationConfig {
    /// Compute the window for the one-based `page` of size `page_size`,
    /// falling back to the configured defaults for missing values.
    ///
    /// Both values are taken as the raw query string text.
    ///
    /// # Errors
    /// Returns [Error::InvalidPagination] if the page or page size is not a
    /// whole number greater than zero.
    pub fn window(
        &self,
        page: Option<&str>,
        page_size: Option<&str>,
    ) -> Result<PageWindow, Error> {
        let page = parse_positive(page, "page")?.unwrap_or(self.default_page);
        let page_size = parse_positive(page_size, "perPage")?.unwrap_or(self.default_page_size);

        Ok(PageWindow {
            offset: (page - 1).saturating_mul(page_size),
            limit: page_size,
        })
    }
}

fn parse_positive(text: Option<&str>, name: &'static str) -> Result<Option<u64>, Error> {
    let Some(text) = text else {
        return Ok(None);
    };

    match text.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(Error::InvalidPagination(name)),
    }
}
