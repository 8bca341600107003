//! The page/sort/filter request contract and the paginated result shape.
//!
//! These types describe a page request as the boundary layer hands it to a
//! repository: which page, how many rows, an optional sort, and an ordered
//! list of field filters combined with logical AND.
//!
//! Normalization rules live here so every repository behaves identically:
//! a non-positive page becomes page 1, and a limit that is non-positive or
//! above [`MAX_LIMIT`] falls back to [`DEFAULT_LIMIT`] (it is not clamped).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page requested when none is supplied.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when none is supplied, or when the supplied one is
/// rejected by normalization.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest accepted page size. Anything above falls back to
/// [`DEFAULT_LIMIT`].
pub const MAX_LIMIT: i64 = 100;

/// Sort direction. Defaults to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sort request: a column name plus a direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    /// Column to sort by. Not validated here: an unknown column is a
    /// storage-level error when the query runs.
    pub field: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Sort {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// A filter value, typed so repositories can bind it as a SQL parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// A filter operator together with its operand(s).
///
/// `Between` carries exactly two bounds by construction, and `In` carries
/// its candidate set, so malformed combinations cannot be expressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum FilterOp {
    Eq(FilterValue),
    Lt(FilterValue),
    Lte(FilterValue),
    Gt(FilterValue),
    Gte(FilterValue),
    /// Set membership. An empty set matches nothing.
    In(Vec<FilterValue>),
    /// Substring match; the needle is wrapped in `%...%` by the
    /// repository.
    Like(String),
    /// Inclusive range with exactly two bounds.
    Between(FilterValue, FilterValue),
}

/// A single field filter. Multiple filters combine with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Column to filter on. Unknown columns surface as storage errors.
    pub field: String,
    #[serde(flatten)]
    pub op: FilterOp,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp) -> Self {
        Self {
            field: field.into(),
            op,
        }
    }
}

/// A paginated query request.
///
/// `page` and `limit` are kept as supplied; the normalizing accessors
/// [`effective_page()`](Self::effective_page),
/// [`effective_limit()`](Self::effective_limit) and
/// [`offset()`](Self::offset) apply the defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindPaginatedParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<Sort>,
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl FindPaginatedParams {
    /// Select a page.
    #[must_use]
    pub const fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    /// Select a page size.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Append a filter.
    #[must_use]
    pub fn filter(mut self, field: impl Into<String>, op: FilterOp) -> Self {
        self.filters.push(Filter::new(field, op));
        self
    }

    /// The page to fetch: the requested page, or [`DEFAULT_PAGE`] when
    /// absent or non-positive.
    #[must_use]
    pub fn effective_page(&self) -> i64 {
        match self.page {
            Some(page) if page >= 1 => page,
            _ => DEFAULT_PAGE,
        }
    }

    /// The page size to fetch: the requested limit when it lies in
    /// `1..=MAX_LIMIT`, otherwise [`DEFAULT_LIMIT`]. Out-of-range values
    /// fall back to the default rather than being clamped.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        match self.limit {
            Some(limit) if (1..=MAX_LIMIT).contains(&limit) => limit,
            _ => DEFAULT_LIMIT,
        }
    }

    /// Row offset implied by the effective page and limit. Saturates for
    /// pages far past the end, which then fetch an empty page rather
    /// than overflowing.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.effective_page() - 1).saturating_mul(self.effective_limit())
    }
}

/// One page of results plus paging metadata.
///
/// `total` counts every row matching the filters, independent of which
/// page was requested; `data` holds at most `limit` entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub data: Vec<T>,
}

impl<T> PaginatedResult<T> {
    /// Map every entity in `data`, keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResult<U> {
        PaginatedResult {
            page: self.page,
            limit: self.limit,
            total: self.total,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
