use serde::{Deserialize, Serialize};

/// Hard cap on page size. Caller-supplied values are clamped, never
/// trusted verbatim, to bound worst-case query cost.
pub const MAX_PER_PAGE: u32 = 100;
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Query-string pagination parameters as they arrive from the caller.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, per_page: DEFAULT_PER_PAGE }
    }
}

impl PageParams {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Clamp page to >= 1 and per_page into 1..=MAX_PER_PAGE.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }
}

/// Computed window for a single page. Pure arithmetic, no I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: u32,
    pub offset: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// total = 0 yields total_pages = 0 and both flags false.
pub fn paginate(total: u64, params: PageParams) -> PageWindow {
    let PageParams { page, per_page } = params.clamped();
    let total_pages = total.div_ceil(per_page as u64);
    PageWindow {
        page,
        per_page,
        offset: (page as u64 - 1) * per_page as u64,
        total,
        total_pages,
        has_next: (page as u64) < total_pages,
        has_prev: page > 1,
    }
}

/// Uniform envelope for every list endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            total: window.total,
            page: window.page,
            per_page: window.per_page,
            total_pages: window.total_pages,
            has_next: window.has_next,
            has_prev: window.has_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(paginate(0, PageParams::new(1, 20)).total_pages, 0);
        assert_eq!(paginate(1, PageParams::new(1, 20)).total_pages, 1);
        assert_eq!(paginate(20, PageParams::new(1, 20)).total_pages, 1);
        assert_eq!(paginate(21, PageParams::new(1, 20)).total_pages, 2);
    }

    #[test]
    fn boundary_flags() {
        let first = paginate(45, PageParams::new(1, 20));
        assert!(!first.has_prev);
        assert!(first.has_next);

        let last = paginate(45, PageParams::new(3, 20));
        assert!(last.has_prev);
        assert!(!last.has_next);

        let middle = paginate(45, PageParams::new(2, 20));
        assert!(middle.has_prev);
        assert!(middle.has_next);
    }

    #[test]
    fn empty_listing_has_no_neighbors() {
        let w = paginate(0, PageParams::new(1, 20));
        assert_eq!(w.total_pages, 0);
        assert!(!w.has_next);
        assert!(!w.has_prev);
    }

    #[test]
    fn caller_values_are_clamped() {
        let w = paginate(500, PageParams::new(0, 0));
        assert_eq!(w.page, 1);
        assert_eq!(w.per_page, 1);

        let w = paginate(500, PageParams::new(1, 10_000));
        assert_eq!(w.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn offset_matches_page() {
        assert_eq!(paginate(100, PageParams::new(1, 20)).offset, 0);
        assert_eq!(paginate(100, PageParams::new(3, 20)).offset, 40);
    }
}
