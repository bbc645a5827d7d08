use super::types::ListItem;

/// Keep records that pass `is_valid` and contain `search_term` in at least one
/// of `fields`, compared case-insensitively. An empty term matches every valid
/// record. Input order is preserved.
pub fn filter<'a, R, S, F>(records: &'a [R], search_term: &str, fields: &[S], is_valid: F) -> Vec<&'a R>
where
    R: ListItem,
    S: AsRef<str>,
    F: Fn(&R) -> bool,
{
    let needle = search_term.to_lowercase();
    records
        .iter()
        .filter(|record| is_valid(*record))
        .filter(|record| matches_term(*record, &needle, fields))
        .collect()
}

/// `needle` must already be lowercased
pub fn matches_term<R, S>(record: &R, needle: &str, fields: &[S]) -> bool
where
    R: ListItem,
    S: AsRef<str>,
{
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|field| {
        record
            .search_text(field.as_ref())
            .map_or(false, |text| text.to_lowercase().contains(needle))
    })
}
