//! Search filter for query history

use crate::errors::{DashqError, Result};
use serde::{Deserialize, Serialize};

/// Page size used when the caller asks for none
pub const DEFAULT_SEARCH_LIMIT: i64 = 100;

/// Ordering of search results by creation time
///
/// Unrecognised sort names fall back to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sort {
    TimeAsc,
    #[default]
    TimeDesc,
}

impl From<String> for Sort {
    fn from(s: String) -> Self {
        match s.as_str() {
            "time-asc" => Sort::TimeAsc,
            _ => Sort::TimeDesc,
        }
    }
}

impl From<Sort> for String {
    fn from(sort: Sort) -> Self {
        sort.as_str().to_string()
    }
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::TimeAsc => "time-asc",
            Sort::TimeDesc => "time-desc",
        }
    }
}

impl std::str::FromStr for Sort {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Sort::from(s.to_string()))
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied search over their own query history
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilter {
    /// Required, non-empty
    pub datasource_uids: Vec<String>,
    /// Case-insensitive substring of the serialized queries
    pub search_string: String,
    pub only_starred: bool,
    pub sort: Sort,
    /// 1-based; values below 1 mean 1
    pub page: i64,
    /// Values below 1 mean the default limit
    pub limit: i64,
}

impl SearchFilter {
    pub fn for_datasources<I, S>(uids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            datasource_uids: uids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_search_string(mut self, search: impl Into<String>) -> Self {
        self.search_string = search.into();
        self
    }

    pub fn with_only_starred(mut self, only_starred: bool) -> Self {
        self.only_starred = only_starred;
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: i64, limit: i64) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    /// Reject filters that cannot be executed
    pub fn validate(&self) -> Result<()> {
        if self.datasource_uids.is_empty() {
            return Err(DashqError::InvalidArgument {
                reason: "no selected data source for query history search".to_string(),
            });
        }
        Ok(())
    }

    /// Validate and replace unset paging fields with their defaults
    pub fn normalized(mut self, default_limit: i64) -> Result<Self> {
        self.validate()?;
        if self.page <= 0 {
            self.page = 1;
        }
        if self.limit <= 0 {
            self.limit = if default_limit > 0 {
                default_limit
            } else {
                DEFAULT_SEARCH_LIMIT
            };
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_datasources_rejected() {
        let err = SearchFilter::default().normalized(100).unwrap_err();
        assert!(matches!(err, DashqError::InvalidArgument { .. }));
    }

    #[test]
    fn test_defaults_applied() {
        let filter = SearchFilter::for_datasources(["ds1"]).normalized(100).unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 100);
        assert_eq!(filter.sort, Sort::TimeDesc);
    }

    #[test]
    fn test_explicit_paging_kept() {
        let filter = SearchFilter::for_datasources(["ds1"])
            .with_page(2, 10)
            .normalized(100)
            .unwrap();
        assert_eq!((filter.page, filter.limit), (2, 10));
    }

    #[test]
    fn test_sort_parsing_is_lenient() {
        assert_eq!("time-asc".parse::<Sort>().unwrap(), Sort::TimeAsc);
        assert_eq!("time-desc".parse::<Sort>().unwrap(), Sort::TimeDesc);
        assert_eq!("alphabetical".parse::<Sort>().unwrap(), Sort::TimeDesc);
    }

    #[test]
    fn test_filter_from_api_payload() {
        let filter: SearchFilter = serde_json::from_value(serde_json::json!({
            "datasourceUids": ["a", "b"],
            "searchString": "rate(",
            "onlyStarred": true,
            "sort": "time-asc",
            "page": 3
        }))
        .unwrap();
        assert_eq!(filter.datasource_uids, vec!["a", "b"]);
        assert!(filter.only_starred);
        assert_eq!(filter.sort, Sort::TimeAsc);
        assert_eq!(filter.limit, 0);
    }

    #[test]
    fn test_unknown_sort_in_payload_defaults_to_desc() {
        let filter: SearchFilter = serde_json::from_value(serde_json::json!({
            "datasourceUids": ["a"],
            "sort": "random"
        }))
        .unwrap();
        assert_eq!(filter.sort, Sort::TimeDesc);
    }

    proptest! {
        #[test]
        fn prop_normalized_paging_is_positive(page in -5i64..50, limit in -5i64..500) {
            let filter = SearchFilter::for_datasources(["ds"])
                .with_page(page, limit)
                .normalized(100)
                .unwrap();
            prop_assert!(filter.page >= 1);
            prop_assert!(filter.limit >= 1);
        }
    }
}
