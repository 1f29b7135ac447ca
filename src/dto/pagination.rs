use serde::{Deserialize, Serialize};

/// One page of items plus the metadata needed to walk the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedList<T> {
    pub items: Vec<T>,
    pub page_number: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T> PaginatedList<T> {
    pub fn new(items: Vec<T>, total_count: i64, page_number: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_count + page_size - 1) / page_size
        } else {
            0
        };

        Self {
            items,
            page_number,
            total_pages,
            total_count,
            has_previous_page: page_number > 1,
            has_next_page: page_number < total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedList<U> {
        PaginatedList {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            total_pages: self.total_pages,
            total_count: self.total_count,
            has_previous_page: self.has_previous_page,
            has_next_page: self.has_next_page,
        }
    }
}
