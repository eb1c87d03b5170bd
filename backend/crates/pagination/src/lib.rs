//! Page-number pagination primitives shared by list endpoints.
//!
//! Callers deserialise [`PageParams`] straight from a query string, resolve
//! them into a [`ResolvedPage`] (applying defaults and the page-size cap) and
//! slice their result set into a [`Page`] envelope carrying `count`, `next`
//! and `previous` page numbers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size applied when the client does not send one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Hard upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw pagination query parameters as sent by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageParams {
    /// 1-based page number.
    pub page: Option<u32>,
    /// Requested page size; capped at [`MAX_PAGE_SIZE`].
    pub page_size: Option<u32>,
}

/// Validation errors for [`PageParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageParamsError {
    /// Page numbers are 1-based; zero is never valid.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A zero page size would make every page empty.
    #[error("page_size must be at least 1")]
    ZeroPageSize,
}

impl PageParams {
    /// Apply defaults and the page-size cap.
    ///
    /// # Errors
    ///
    /// Returns [`PageParamsError`] when an explicit zero was supplied for
    /// either parameter. Oversized page sizes are capped, not rejected.
    pub fn resolve(self) -> Result<ResolvedPage, PageParamsError> {
        let page = match self.page {
            Some(0) => return Err(PageParamsError::ZeroPage),
            Some(page) => page,
            None => 1,
        };
        let page_size = match self.page_size {
            Some(0) => return Err(PageParamsError::ZeroPageSize),
            Some(size) => size.min(MAX_PAGE_SIZE),
            None => DEFAULT_PAGE_SIZE,
        };
        Ok(ResolvedPage { page, page_size })
    }
}

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPage {
    page: u32,
    page_size: u32,
}

impl ResolvedPage {
    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Effective page size after defaulting and capping.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Zero-based offset of the first item on this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.page_size as usize)
    }
}

/// Paginated response envelope.
///
/// `next` and `previous` carry page numbers rather than URLs so the envelope
/// stays transport-agnostic; a page past the end of the collection yields an
/// empty `results` list rather than an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Total number of items across all pages.
    pub count: usize,
    /// Page number of the following page, when one exists.
    pub next: Option<u32>,
    /// Page number of the preceding page, when one exists.
    pub previous: Option<u32>,
    /// Items on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Slice `items` into the window described by `window`.
    #[must_use]
    pub fn paginate(items: Vec<T>, window: ResolvedPage) -> Self {
        let count = items.len();
        let results: Vec<T> = items
            .into_iter()
            .skip(window.offset())
            .take(window.page_size() as usize)
            .collect();
        let has_next = window.offset().saturating_add(results.len()) < count;
        Self {
            count,
            next: has_next.then(|| window.page() + 1),
            previous: (window.page() > 1).then(|| window.page() - 1),
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, DEFAULT_PAGE_SIZE)]
    #[case(Some(3), Some(25), 3, 25)]
    #[case(Some(1), Some(1000), 1, MAX_PAGE_SIZE)]
    fn resolve_applies_defaults_and_cap(
        #[case] page: Option<u32>,
        #[case] page_size: Option<u32>,
        #[case] expected_page: u32,
        #[case] expected_size: u32,
    ) {
        let window = PageParams { page, page_size }
            .resolve()
            .expect("valid params");
        assert_eq!(window.page(), expected_page);
        assert_eq!(window.page_size(), expected_size);
    }

    #[rstest]
    #[case(Some(0), None, PageParamsError::ZeroPage)]
    #[case(None, Some(0), PageParamsError::ZeroPageSize)]
    fn resolve_rejects_zero(
        #[case] page: Option<u32>,
        #[case] page_size: Option<u32>,
        #[case] expected: PageParamsError,
    ) {
        let err = PageParams { page, page_size }
            .resolve()
            .expect_err("zero rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn paginate_splits_and_links_pages() {
        let items: Vec<u32> = (1..=25).collect();
        let window = PageParams {
            page: Some(2),
            page_size: Some(10),
        }
        .resolve()
        .expect("valid params");

        let page = Page::paginate(items, window);
        assert_eq!(page.count, 25);
        assert_eq!(page.results, (11..=20).collect::<Vec<u32>>());
        assert_eq!(page.next, Some(3));
        assert_eq!(page.previous, Some(1));
    }

    #[rstest]
    fn paginate_past_the_end_is_empty() {
        let items: Vec<u32> = (1..=5).collect();
        let window = PageParams {
            page: Some(4),
            page_size: Some(10),
        }
        .resolve()
        .expect("valid params");

        let page = Page::paginate(items, window);
        assert_eq!(page.count, 5);
        assert!(page.results.is_empty());
        assert_eq!(page.next, None);
        assert_eq!(page.previous, Some(3));
    }
}
