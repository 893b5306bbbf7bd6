//! Client supplied paging and sorting, resolved against a fixed safelist.

use std::str::FromStr;

use garde::Validate;
use marquee_types::{
    validator::{permitted_value, Validator},
    ValidationErrors,
};
use serde::Serialize;

use crate::{Batch, ListingParams, Order};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE: i64 = 10_000_000;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Sort tokens accepted for movie listings.
pub const MOVIE_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Closed set of sortable columns; the only source of column names in query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Id,
    Title,
    Year,
    Runtime,
}

impl AsRef<str> for SortColumn {
    fn as_ref(&self) -> &str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Title => "title",
            SortColumn::Year => "year",
            SortColumn::Runtime => "runtime",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort column {0:?}")]
pub struct UnknownSortColumn(String);

impl FromStr for SortColumn {
    type Err = UnknownSortColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortColumn::Id),
            "title" => Ok(SortColumn::Title),
            "year" => Ok(SortColumn::Year),
            "runtime" => Ok(SortColumn::Runtime),
            other => Err(UnknownSortColumn(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Validate)]
#[garde(allow_unvalidated)]
pub struct Filters {
    #[garde(range(min = 1, max = 10_000_000))]
    pub page: i64,
    #[garde(range(min = 1, max = 100))]
    pub page_size: i64,
    pub sort: String,
    pub sort_safelist: Vec<String>,
}

impl Filters {
    pub fn new(page: i64, page_size: i64, sort: impl Into<String>, sort_safelist: &[&str]) -> Self {
        Filters {
            page,
            page_size,
            sort: sort.into(),
            sort_safelist: sort_safelist.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Filters for movie listings with default page, page size and sort.
    pub fn for_movies() -> Self {
        Filters::new(1, DEFAULT_PAGE_SIZE, "id", MOVIE_SORT_SAFELIST)
    }

    pub fn validate_into(&self, v: &mut Validator) {
        if let Err(report) = self.validate() {
            v.merge_report(&report);
        }
        v.check(
            permitted_value(self.sort.as_str(), &self.sort_safelist),
            "sort",
            "invalid sort value",
        );
    }

    /// Validates the filters and resolves the sort token into a typed ordering.
    pub fn listing_params(&self) -> Result<ListingParams, ValidationErrors> {
        let mut v = Validator::new();
        self.validate_into(&mut v);
        let order = self.order();
        v.check(order.is_some(), "sort", "invalid sort value");
        v.finish()?;

        let mut params = ListingParams::new(self.offset(), self.limit());
        if let Some(order) = order {
            params = params.with_order(order);
        }
        Ok(params)
    }

    fn order(&self) -> Option<Order> {
        match self.sort.strip_prefix('-') {
            Some(name) => name.parse().ok().map(Order::Desc),
            None => self.sort.parse().ok().map(Order::Asc),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Pagination summary for a listing, all zero when nothing matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "is_zero")]
    pub current_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub page_size: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub first_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub last_page: i64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_records: u64,
}

fn is_zero<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

impl Metadata {
    pub fn calculate(total_records: u64, page: i64, page_size: i64) -> Self {
        if total_records == 0 || page_size < 1 {
            return Metadata::default();
        }
        let total = total_records as i64;
        Metadata {
            current_page: page,
            page_size,
            first_page: 1,
            last_page: (total + page_size - 1) / page_size,
            total_records,
        }
    }

    pub fn from_batch<T>(batch: &Batch<T>) -> Self {
        if batch.limit < 1 {
            return Metadata::default();
        }
        Metadata::calculate(batch.total, batch.offset / batch.limit + 1, batch.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_sort() {
        let filters = Filters::new(2, 10, "-year", MOVIE_SORT_SAFELIST);
        let params = filters.listing_params().unwrap();
        assert_eq!(10, params.offset);
        assert_eq!(10, params.limit);
        assert_eq!(Order::Desc(SortColumn::Year), params.order);

        let params = Filters::for_movies().listing_params().unwrap();
        assert_eq!(Order::Asc(SortColumn::Id), params.order);
        assert_eq!(0, params.offset);
    }

    #[test]
    fn test_sort_outside_safelist() {
        for sort in ["year; DROP TABLE movies", "created_at", "-version", ""] {
            let filters = Filters::new(1, 20, sort, MOVIE_SORT_SAFELIST);
            let errors = filters.listing_params().unwrap_err();
            assert_eq!(Some("invalid sort value"), errors.get("sort"));
        }

        // safelisted here, but not a known column
        let filters = Filters::new(1, 20, "rating", &["rating", "id"]);
        let errors = filters.listing_params().unwrap_err();
        assert_eq!(Some("invalid sort value"), errors.get("sort"));

        // known column, but not safelisted for this deployment
        let filters = Filters::new(1, 20, "runtime", &["id", "title"]);
        assert!(filters.listing_params().is_err());
    }

    #[test]
    fn test_page_ranges() {
        let filters = Filters::new(0, 101, "id", MOVIE_SORT_SAFELIST);
        let errors = filters.listing_params().unwrap_err();
        assert_eq!(2, errors.len());
        assert!(errors.get("page").is_some());
        assert!(errors.get("page_size").is_some());

        let filters = Filters::new(MAX_PAGE + 1, 5, "bogus", MOVIE_SORT_SAFELIST);
        let mut v = Validator::new();
        filters.validate_into(&mut v);
        assert_eq!(2, v.errors().len());

        let filters = Filters::new(MAX_PAGE, MAX_PAGE_SIZE, "-title", MOVIE_SORT_SAFELIST);
        assert!(filters.listing_params().is_ok());
    }

    #[test]
    fn test_metadata() {
        assert_eq!(Metadata::default(), Metadata::calculate(0, 1, 20));

        let m = Metadata::calculate(41, 2, 20);
        assert_eq!(2, m.current_page);
        assert_eq!(1, m.first_page);
        assert_eq!(3, m.last_page);
        assert_eq!(41, m.total_records);

        let batch: Batch<()> = Batch {
            offset: 40,
            limit: 20,
            rows: vec![()],
            total: 41,
        };
        assert_eq!(m.last_page, Metadata::from_batch(&batch).last_page);
        assert_eq!(3, Metadata::from_batch(&batch).current_page);

        let json = serde_json::to_value(Metadata::default()).unwrap();
        assert_eq!(serde_json::json!({}), json);
    }
}
