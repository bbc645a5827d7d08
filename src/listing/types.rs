use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Anything the list engine can search and sort
pub trait ListItem {
    /// Text matched by the search filter, `None` when the field is absent
    fn search_text(&self, field: &str) -> Option<Cow<'_, str>>;

    /// Comparable value for ordering, `None` when the field is absent
    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        let _ = field;
        None
    }
}

/// Comparable projection of a field value
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'a> {
    Bool(bool),
    Number(f64),
    Time(DateTime<Utc>),
    Text(Cow<'a, str>),
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Time(_) => 2,
            SortKey::Text(_) => 3,
        }
    }

    pub fn compare(&self, other: &SortKey<'_>) -> Ordering {
        match (self, other) {
            (SortKey::Bool(a), SortKey::Bool(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Time(a), SortKey::Time(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            // Mixed kinds only happen with loosely typed extra fields
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
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
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderInfo {
    pub field: String,
    pub sort: SortDirection,
}

/// One page of a matched list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Requested page, 1-based
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Zero-based index of the first item, clamped to the list
    pub start_index: usize,
    /// Zero-based exclusive end index, clamped to the list
    pub end_index: usize,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1 && self.total_pages > 0
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}
