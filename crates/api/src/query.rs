//! Query-string parameter types shared by list endpoints.
//!
//! `page` and `limit` are carried as raw strings so validation stays in
//! [`waterline_core::pagination::resolve_page`]: a non-numeric or
//! out-of-range value is a 400, never a silently clamped default.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use waterline_core::error::CoreError;
use waterline_core::pagination::{resolve_page, Page};

use crate::error::{AppError, AppResult};

/// 1-indexed `?page=` / `?limit=` query parameters.
///
/// Flatten into a handler's query struct:
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct ListQuery {
///     status: Option<String>,
///     #[serde(flatten)]
///     page: PageQuery,
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    /// Validate into a [`Page`], rejecting bad values with 400.
    pub fn resolve(&self) -> AppResult<Page> {
        resolve_page(self.page.as_deref(), self.limit.as_deref())
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))
    }
}

/// Optional `?from=` / `?to=` created-date bounds.
///
/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates. A bare `from`
/// date means start of that day, a bare `to` date means end of it, so
/// `?from=2026-03-01&to=2026-03-01` covers the whole day.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl DateRangeQuery {
    /// Validate into concrete UTC bounds, rejecting an inverted range.
    pub fn resolve(&self) -> AppResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let from = self
            .from
            .as_deref()
            .map(|raw| parse_bound(raw, false))
            .transpose()
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
        let to = self
            .to
            .as_deref()
            .map(|raw| parse_bound(raw, true))
            .transpose()
            .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Date range end {to} is before start {from}"
                ))));
            }
        }
        Ok((from, to))
    }
}

fn parse_bound(raw: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = if end_of_day {
            date.and_hms_opt(23, 59, 59)
        } else {
            date.and_hms_opt(0, 0, 0)
        };
        if let Some(naive) = time {
            return Ok(naive.and_utc());
        }
    }
    Err(format!(
        "Invalid date '{raw}'. Expected YYYY-MM-DD or an RFC 3339 timestamp"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query_defaults() {
        let query = PageQuery::default();
        let page = query.resolve().unwrap();
        assert_eq!(page.number, 1);
    }

    #[test]
    fn test_page_query_rejects_garbage() {
        let query = PageQuery {
            page: Some("first".into()),
            limit: None,
        };
        assert!(query.resolve().is_err());
    }

    #[test]
    fn test_date_range_bare_dates() {
        let query = DateRangeQuery {
            from: Some("2026-03-01".into()),
            to: Some("2026-03-01".into()),
        };
        let (from, to) = query.resolve().unwrap();
        // Same calendar day still forms a non-empty window.
        assert!(from.unwrap() < to.unwrap());
    }

    #[test]
    fn test_date_range_rfc3339() {
        let query = DateRangeQuery {
            from: Some("2026-03-01T08:00:00Z".into()),
            to: None,
        };
        let (from, to) = query.resolve().unwrap();
        assert!(from.is_some());
        assert!(to.is_none());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let query = DateRangeQuery {
            from: Some("2026-03-10".into()),
            to: Some("2026-03-01".into()),
        };
        assert!(query.resolve().is_err());
    }

    #[test]
    fn test_unparseable_date_rejected() {
        let query = DateRangeQuery {
            from: Some("March 1st".into()),
            to: None,
        };
        assert!(query.resolve().is_err());
    }
}
