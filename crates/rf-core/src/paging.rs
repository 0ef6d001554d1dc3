//! Pagination math shared by the forum and topic pages.

/// Default number of topics shown on one forum page.
pub const TOPICS_PER_PAGE: i64 = 10;
/// Default number of posts shown on one topic page.
pub const POSTS_PER_PAGE: i64 = 10;

/// A 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub per_page: i64,
}

impl Page {
    /// Builds a page from an optional URL parameter. Missing, zero and
    /// negative page numbers all mean the first page.
    pub fn from_param(number: Option<i64>, per_page: i64) -> Self {
        Self {
            number: number.filter(|n| *n >= 1).unwrap_or(1),
            per_page: per_page.max(1),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1).saturating_mul(self.per_page)
    }
}

/// Number of pages needed for `total` items. Zero items need zero pages.
pub fn page_count(total: i64, per_page: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    let per_page = per_page.max(1);
    (total - 1) / per_page + 1
}

/// The page the newest item lands on; never less than 1.
pub fn last_page(total: i64, per_page: i64) -> i64 {
    page_count(total, per_page).max(1)
}

/// One entry of a rendered pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub number: i64,
    pub current: bool,
}

pub fn page_links(total: i64, per_page: i64, current: i64) -> Vec<PageLink> {
    (1..=page_count(total, per_page))
        .map(|number| PageLink { number, current: number == current })
        .collect()
}
