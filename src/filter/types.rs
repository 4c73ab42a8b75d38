use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// Status filter value that disables status matching
pub const STATUS_ALL: &str = "all";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self { field: field.into(), direction }
    }

    pub fn asc(field: impl Into<String>) -> Self { Self::new(field, SortDirection::Asc) }

    pub fn desc(field: impl Into<String>) -> Self { Self::new(field, SortDirection::Desc) }
}

/// Zero-based page window over the filtered rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub page_index: usize,
    pub page_size: usize,
}

impl PageSpec {
    pub fn new(page_index: usize, page_size: usize) -> Result<Self, FilterError> {
        if page_size == 0 {
            return Err(FilterError::InvalidPageSize("Page size must be positive".to_string()));
        }
        Ok(Self { page_index, page_size })
    }

    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }
}

/// Recognized filter options shared by every list view.
///
/// Empty strings and `None` impose no constraint. Member bounds are kept as the
/// raw text the user typed; anything that does not parse as a count is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSpec {
    pub name: String,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub min_members: Option<String>,
    pub max_members: Option<String>,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            status: STATUS_ALL.to_string(),
            start_date: None,
            end_date: None,
            min_members: None,
            max_members: None,
        }
    }
}

impl FilterSpec {
    /// Start date after end date. The range filter is switched off rather than
    /// producing an empty result.
    pub fn date_error(&self) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start > end,
            _ => false,
        }
    }

    /// True when any option would constrain the rows
    pub fn can_reset(&self) -> bool {
        !self.name.is_empty()
            || self.start_date.is_some()
            || self.end_date.is_some()
            || self.status != STATUS_ALL
            || self.min_members.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.max_members.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// A single comparable field value extracted from a record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl<'a> FieldValue<'a> {
    pub fn text(value: &'a str) -> Self { FieldValue::Text(Cow::Borrowed(value)) }

    /// Total order: values of one kind compare naturally (numbers via
    /// `total_cmp`), mixed kinds order by kind.
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.as_ref().cmp(b.as_ref()),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Bool(_) => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Date(_) => 2,
            FieldValue::Text(_) => 3,
        }
    }
}

/// Field accessor map for one entity type. Every list view goes through the
/// same engine by implementing this once per record type.
pub trait TableRecord {
    /// Field names accepted by `field`, used to validate sort specs
    fn sortable_fields() -> &'static [&'static str]
    where
        Self: Sized;

    fn id(&self) -> &str;

    fn field(&self, column: &str) -> Option<FieldValue<'_>>;

    /// Text matched by the name filter (name, plus email where the entity has one)
    fn search_terms(&self) -> Vec<&str>;

    fn status(&self) -> Option<Cow<'_, str>> {
        None
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn member_count(&self) -> Option<usize> {
        None
    }
}

/// One visible page plus the number of rows that survived filtering
#[derive(Debug, Clone, PartialEq)]
pub struct TablePage<'a, R> {
    pub rows: Vec<&'a R>,
    pub total_matched: usize,
}

impl<'a, R> TablePage<'a, R> {
    pub fn is_empty(&self) -> bool {
        self.total_matched == 0
    }
}

/// Serializable form of a query, used by `TableQuery::assign`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableQueryData {
    pub filters: Option<FilterSpec>,
    pub order: Option<String>,
    pub page_index: Option<usize>,
    pub page_size: Option<usize>,
}

/// Lenient timestamp parsing: RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]`
/// (taken as UTC) or a bare `YYYY-MM-DD` at midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() { return None; }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Strict variant for user input
pub fn parse_date_arg(raw: &str) -> Result<DateTime<Utc>, FilterError> {
    parse_timestamp(raw).ok_or_else(|| FilterError::InvalidDate(raw.to_string()))
}
