use serde::{Deserialize, Serialize};

pub const PAGE_SIZE: i64 = 10;

// Query parameters shared by every listing endpoint.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ListQuery {
    pub name: Option<String>,       // case-insensitive substring filter
    pub page: Option<u32>,          // 1-based
    pub mine: Option<bool>,         // restrict to the caller's own entries
}

impl ListQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * PAGE_SIZE
    }

    /// The filter value, if one was actually supplied.
    pub fn name_filter(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn mine(&self) -> bool {
        self.mine.unwrap_or(false)
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    // Reported only when a name filter was applied; an unfiltered listing
    // carries no search count at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_count: Option<i64>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, total: i64, filtered: bool) -> Self {
        Self {
            items,
            page,
            total_pages: total_pages(total),
            search_count: if filtered { Some(total) } else { None },
        }
    }
}

fn total_pages(total: i64) -> u32 {
    if total <= 0 {
        1
    } else {
        total.div_ceil(PAGE_SIZE) as u32
    }
}
