pub mod controller;
pub mod order;
pub mod paginate;
pub mod search;
pub mod types;

pub use controller::{ListController, ListOptions, ListView};
pub use order::SortOrder;
pub use paginate::{paginate, total_pages, windowed_page_numbers};
pub use search::filter;
pub use types::*;
