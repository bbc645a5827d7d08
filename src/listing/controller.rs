use std::sync::Arc;

use super::order::SortOrder;
use super::paginate::{paginate, total_pages, windowed_page_numbers};
use super::search::filter;
use super::types::{ListItem, OrderInfo, Page};

/// Page links shown around the current page when no window is configured
pub const DEFAULT_PAGE_WINDOW: usize = 5;

type Validity<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Per-list configuration: what is searchable, how big a page is, how the
/// source list is ordered and which records are renderable at all
pub struct ListOptions<R> {
    pub searchable_fields: Vec<String>,
    pub page_size: usize,
    pub window_size: usize,
    pub order: Vec<OrderInfo>,
    validity: Option<Validity<R>>,
}

impl<R> ListOptions<R> {
    pub fn new<S: AsRef<str>>(searchable_fields: &[S], page_size: usize) -> Self {
        Self {
            searchable_fields: searchable_fields.iter().map(|f| f.as_ref().to_string()).collect(),
            page_size: page_size.max(1),
            window_size: DEFAULT_PAGE_WINDOW,
            order: Vec::new(),
            validity: None,
        }
    }

    pub fn with_window(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    /// Ordering in `field dir, field dir` form
    pub fn with_order(mut self, spec: &str) -> Self {
        self.order = SortOrder::parse(spec);
        self
    }

    pub fn with_validity<F>(mut self, is_valid: F) -> Self
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.validity = Some(Arc::new(is_valid));
        self
    }

    pub fn is_valid(&self, record: &R) -> bool {
        self.validity.as_ref().map_or(true, |f| f(record))
    }
}

impl<R> Clone for ListOptions<R> {
    fn clone(&self) -> Self {
        Self {
            searchable_fields: self.searchable_fields.clone(),
            page_size: self.page_size,
            window_size: self.window_size,
            order: self.order.clone(),
            validity: self.validity.clone(),
        }
    }
}

impl<R> std::fmt::Debug for ListOptions<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListOptions")
            .field("searchable_fields", &self.searchable_fields)
            .field("page_size", &self.page_size)
            .field("window_size", &self.window_size)
            .field("order", &self.order)
            .field("validity", &self.validity.is_some())
            .finish()
    }
}

/// What the user sees right now
#[derive(Debug, Clone)]
pub struct ListView<'a, R> {
    pub page: Page<&'a R>,
    pub page_numbers: Vec<usize>,
    pub search_term: &'a str,
    /// Records passing the validity predicate, before search
    pub working_set_len: usize,
}

impl<R> ListView<'_, R> {
    pub fn is_empty(&self) -> bool {
        self.page.is_empty()
    }

    pub fn is_searching(&self) -> bool {
        !self.search_term.is_empty()
    }
}

/// Search, pagination and ordering state for one list
#[derive(Debug, Clone)]
pub struct ListController<R> {
    options: ListOptions<R>,
    records: Vec<R>,
    search_term: String,
    current_page: usize,
}

impl<R: ListItem> ListController<R> {
    pub fn new(options: ListOptions<R>) -> Self {
        Self {
            options,
            records: Vec::new(),
            search_term: String::new(),
            current_page: 1,
        }
    }

    pub fn options(&self) -> &ListOptions<R> {
        &self.options
    }

    /// Replace the source list (after a fetch or re-fetch). Always returns to page 1.
    pub fn set_records(&mut self, mut records: Vec<R>) {
        SortOrder::sort(&mut records, &self.options.order);
        self.records = records;
        self.current_page = 1;
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Change the search term. Always returns to page 1.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Jump to a page, clamped to `1..=max(total_pages, 1)`. Returns the page landed on.
    pub fn set_page(&mut self, page: usize) -> usize {
        let last = self.total_pages().max(1);
        self.current_page = page.clamp(1, last);
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.set_page(self.current_page.saturating_sub(1))
    }

    /// Records passing validity and the current search term, in source order
    pub fn matched(&self) -> Vec<&R> {
        let options = &self.options;
        filter(&self.records, &self.search_term, &options.searchable_fields, |r| options.is_valid(r))
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.matched().len(), self.options.page_size)
    }

    pub fn working_set_len(&self) -> usize {
        self.records.iter().filter(|r| self.options.is_valid(r)).count()
    }

    pub fn view(&self) -> ListView<'_, R> {
        let matched = self.matched();
        let page = paginate(&matched, self.current_page, self.options.page_size);
        let page_numbers = windowed_page_numbers(self.current_page, page.total_pages, self.options.window_size);

        ListView {
            page,
            page_numbers,
            search_term: &self.search_term,
            working_set_len: self.working_set_len(),
        }
    }
}
