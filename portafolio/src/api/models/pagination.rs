//! Shared pagination types for API query parameters.
//!
//! List endpoints use page-based pagination with `page` and `pageSize` parameters.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Default number of items to return per page.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum number of items that can be requested per page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Standard pagination parameters for list endpoints.
///
/// - `page`: 1-based page number (default: 1)
/// - `pageSize`: Items per page (default: 10, max: 100)
///
/// Values below 1 fall back to the defaults, so a bad query string never
/// produces an empty or unbounded page.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// Page number, starting at 1 (default: 1)
    #[param(default = 1, minimum = 1)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<i64>,

    /// Maximum number of items to return (default: 10, max: 100)
    #[param(default = 10, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page_size: Option<i64>,
}

impl Pagination {
    /// Get the page number, never below 1.
    #[inline]
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    /// Get the page size, defaulting when missing or below 1 and capped at MAX_PAGE_SIZE.
    #[inline]
    pub fn page_size(&self) -> i64 {
        self.page_size.filter(|s| *s >= 1).unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }

    /// Get offset and limit as a tuple, useful for destructuring.
    #[inline]
    pub fn params(&self) -> (i64, i64) {
        let limit = self.page_size();
        ((self.page() - 1).saturating_mul(limit), limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let pagination = Pagination::default();
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(pagination.params(), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_page_below_one_is_first_page() {
        let pagination = Pagination {
            page: Some(-3),
            page_size: Some(5),
        };
        assert_eq!(pagination.page(), 1);
        assert_eq!(pagination.params(), (0, 5));
    }

    #[test]
    fn test_page_size_bounds() {
        let zero = Pagination {
            page: Some(2),
            page_size: Some(0),
        };
        assert_eq!(zero.page_size(), DEFAULT_PAGE_SIZE);

        let huge = Pagination {
            page: Some(2),
            page_size: Some(10_000),
        };
        assert_eq!(huge.page_size(), MAX_PAGE_SIZE);
        assert_eq!(huge.params(), (MAX_PAGE_SIZE, MAX_PAGE_SIZE));
    }

    #[test]
    fn test_offset_for_later_pages() {
        let pagination = Pagination {
            page: Some(3),
            page_size: Some(20),
        };
        assert_eq!(pagination.params(), (40, 20));
    }

    #[test]
    fn test_pagination_from_query_string() {
        let pagination: Pagination = from_query("page=2&pageSize=25");
        assert_eq!(pagination.page, Some(2));
        assert_eq!(pagination.page_size, Some(25));
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let pagination = from_query("page=9223372036854775807&pageSize=10");
        let (offset, limit) = pagination.params();
        assert_eq!(limit, 10);
        assert_eq!(offset, i64::MAX);
    }

    fn from_query(query: &str) -> Pagination {
        let uri: axum::http::Uri = format!("http://localhost/?{query}").parse().unwrap();
        axum::extract::Query::<Pagination>::try_from_uri(&uri).unwrap().0
    }
}
