use super::types::Page;

/// Number of pages needed for `len` items; zero for an empty list
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Slice one page out of `matched`.
///
/// `page` is 1-based and is not clamped: a page outside `1..=total_pages`
/// yields an empty `items` list with the totals still filled in.
pub fn paginate<T: Clone>(matched: &[T], page: usize, page_size: usize) -> Page<T> {
    let total_items = matched.len();
    let total_pages = total_pages(total_items, page_size);

    let (start_index, end_index) = if page == 0 || page_size == 0 {
        (0, 0)
    } else {
        let start = (page - 1).saturating_mul(page_size).min(total_items);
        let end = page.saturating_mul(page_size).min(total_items);
        (start, end)
    };

    Page {
        items: matched[start_index..end_index].to_vec(),
        page,
        page_size,
        total_pages,
        total_items,
        start_index,
        end_index,
    }
}

/// Up to `window` consecutive page numbers centred on `page`, kept inside
/// `1..=total_pages`. Near the right edge the window shifts left so it stays
/// full width.
pub fn windowed_page_numbers(page: usize, total_pages: usize, window: usize) -> Vec<usize> {
    if total_pages == 0 || window == 0 {
        return Vec::new();
    }

    let window = window.min(total_pages);
    let page = page.clamp(1, total_pages);

    let mut start = page.saturating_sub(window / 2).max(1);
    let mut end = start + window - 1;
    if end > total_pages {
        end = total_pages;
        start = end + 1 - window;
    }

    (start..=end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twelve_items_page_size_five() {
        let items: Vec<u32> = (1..=12).collect();

        let first = paginate(&items, 1, 5);
        assert_eq!(first.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(first.total_pages, 3);
        assert_eq!((first.start_index, first.end_index), (0, 5));

        let last = paginate(&items, 3, 5);
        assert_eq!(last.items, vec![11, 12]);
        assert_eq!((last.start_index, last.end_index), (10, 12));
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_empty_list_has_zero_pages() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1, 5);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_out_of_range_page_is_empty_not_clamped() {
        let items: Vec<u32> = (1..=7).collect();
        let page = paginate(&items, 4, 5);
        assert!(page.is_empty());
        assert_eq!(page.page, 4);
        assert_eq!(page.total_pages, 2);

        assert!(paginate(&items, 0, 5).is_empty());
    }

    #[test]
    fn test_pages_cover_every_item_exactly_once() {
        for len in 0..40usize {
            let items: Vec<usize> = (0..len).collect();
            for page_size in 1..9 {
                let pages = total_pages(len, page_size);
                let mut seen = Vec::new();
                for page in 1..=pages {
                    seen.extend(paginate(&items, page, page_size).items);
                }
                assert_eq!(seen, items, "len {} page size {}", len, page_size);
            }
        }
    }

    #[test]
    fn test_window_near_edges() {
        assert_eq!(windowed_page_numbers(1, 3, 5), vec![1, 2, 3]);
        assert_eq!(windowed_page_numbers(10, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(windowed_page_numbers(1, 10, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(windowed_page_numbers(9, 10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(windowed_page_numbers(5, 10, 5), vec![3, 4, 5, 6, 7]);
        assert_eq!(windowed_page_numbers(5, 10, 4), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_window_degenerate_inputs() {
        assert!(windowed_page_numbers(1, 0, 5).is_empty());
        assert_eq!(windowed_page_numbers(42, 3, 5), vec![1, 2, 3]);
        assert_eq!(windowed_page_numbers(0, 6, 3), vec![1, 2, 3]);
    }
}
