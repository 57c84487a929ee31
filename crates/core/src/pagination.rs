//! Page-based pagination parameters.
//!
//! List endpoints take 1-indexed `page`/`limit` query parameters. Values
//! arrive as raw strings and are rejected, not clamped, when non-numeric
//! or out of range, so a typo'd request fails loudly instead of silently
//! returning the wrong slice.

/// Page size applied when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size accepted from clients.
pub const MAX_PAGE_SIZE: i64 = 100;

/// A validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-indexed page number.
    pub number: i64,
    /// Rows per page, between 1 and [`MAX_PAGE_SIZE`].
    pub size: i64,
}

impl Page {
    /// SQL OFFSET for this window.
    pub fn offset(self) -> i64 {
        (self.number - 1) * self.size
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Resolve raw `page`/`limit` query values into a validated [`Page`].
///
/// Absent values fall back to page 1 / [`DEFAULT_PAGE_SIZE`].
pub fn resolve_page(page: Option<&str>, limit: Option<&str>) -> Result<Page, String> {
    let number = match page {
        None => 1,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("page must be a whole number, got '{raw}'"))?,
    };
    if number < 1 {
        return Err(format!("page must be 1 or greater, got {number}"));
    }

    let size = match limit {
        None => DEFAULT_PAGE_SIZE,
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("limit must be a whole number, got '{raw}'"))?,
    };
    if !(1..=MAX_PAGE_SIZE).contains(&size) {
        return Err(format!("limit must be between 1 and {MAX_PAGE_SIZE}, got {size}"));
    }

    Ok(Page { number, size })
}

/// Number of pages needed to hold `total` rows at `size` rows per page.
pub fn page_count(total: i64, size: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + size - 1) / size
    }
}
