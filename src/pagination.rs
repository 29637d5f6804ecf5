use serde::{Deserialize, Serialize};

/// Number of posts on every listing page.
pub const PAGE_SIZE: i64 = 10;

/// `?page=` as sent by the client. Kept as a string so junk input falls back
/// to the first page instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

/// Position of one page inside an ordered listing of `count` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub per_page: i64,
}

impl PageWindow {
    /// Resolves the requested page against the row count. Missing or
    /// non-numeric input selects page 1; out-of-range numbers clamp to the
    /// nearest page that exists. An empty listing still has one page.
    pub fn new(count: i64, per_page: i64, requested: Option<&str>) -> Self {
        let count = count.max(0);
        let num_pages = ((count + per_page - 1) / per_page).max(1);
        let number = requested
            .and_then(|raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(1)
            .clamp(1, num_pages);

        Self {
            number,
            num_pages,
            count,
            per_page,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: i64,
    pub num_pages: i64,
    pub count: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn new(window: PageWindow, items: Vec<T>) -> Self {
        Self {
            items,
            number: window.number,
            num_pages: window.num_pages,
            count: window.count,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        }
    }
}
