use std::cmp::Ordering;

use super::types::{ListItem, OrderInfo, SortDirection};

pub struct SortOrder;

impl SortOrder {
    /// Parse `"createdAt desc, title"` into order terms; direction defaults to asc
    pub fn parse(spec: &str) -> Vec<OrderInfo> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            if let Some(field) = it.next() {
                let dir = it.next().unwrap_or("asc");
                let sort = if dir.eq_ignore_ascii_case("desc") {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                };
                out.push(OrderInfo { field: field.to_string(), sort });
            }
        }
        out
    }

    /// Compare two items term by term. Missing values sort last in either direction.
    pub fn compare<R: ListItem>(a: &R, b: &R, order: &[OrderInfo]) -> Ordering {
        for info in order {
            let ordering = match (a.sort_key(&info.field), b.sort_key(&info.field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => info.sort.apply(x.compare(&y)),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort
    pub fn sort<R: ListItem>(records: &mut [R], order: &[OrderInfo]) {
        if order.is_empty() {
            return;
        }
        records.sort_by(|a, b| Self::compare(a, b, order));
    }
}
