//! Page-number pagination over attendee lists.

use serde::Serialize;

use super::validation::ValidationErrors;

/// Page size used when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A validated request for one page of results (1-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Builds a request, applying defaults (`page = 1`,
    /// `page_size = default_size`) and capping the size at `max_size`.
    ///
    /// # Errors
    ///
    /// Returns field-level failures when `page` or `page_size` is zero.
    pub fn new(
        page: Option<u32>,
        page_size: Option<u32>,
        default_size: u32,
        max_size: u32,
    ) -> Result<Self, ValidationErrors> {
        let page = page.unwrap_or(1);
        let page_size = page_size.unwrap_or(default_size);

        let mut errors = ValidationErrors::new();
        if page == 0 {
            errors.push("page", "must be a positive integer");
        }
        if page_size == 0 {
            errors.push("page_size", "must be a positive integer");
        }
        errors.into_result()?;

        Ok(Self {
            page,
            page_size: page_size.min(max_size.max(1)),
        })
    }

    /// The requested page number, starting at 1.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The effective page size after capping.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items that precede this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the metadata needed to walk the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page, in list order. Empty past the last page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total_count: u32,
    /// Page number that was requested.
    pub page: u32,
    /// Effective page size.
    pub page_size: u32,
    /// `ceil(total_count / page_size)`.
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// Assembles a page from the slice the store returned.
    #[must_use]
    pub fn new(items: Vec<T>, total_count: u32, request: PageRequest) -> Self {
        Self {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
            total_pages: total_pages(total_count, request.page_size),
        }
    }
}

/// `ceil(total_count / page_size)`, zero when the list is empty.
#[must_use]
pub const fn total_pages(total_count: u32, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let Ok(req) = PageRequest::new(None, None, 20, 100) else {
            panic!("expected valid request");
        };
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 20);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn size_is_capped() {
        let Ok(req) = PageRequest::new(Some(2), Some(500), 20, 100) else {
            panic!("expected valid request");
        };
        assert_eq!(req.page_size(), 100);
        assert_eq!(req.offset(), 100);
    }

    #[test]
    fn zero_values_are_rejected() {
        let Err(errors) = PageRequest::new(Some(0), Some(0), 20, 100) else {
            panic!("expected failure");
        };
        assert!(errors.has_field("page"));
        assert!(errors.has_field("page_size"));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(45, 20), 3);
    }

    #[test]
    fn page_carries_request_metadata() {
        let Ok(req) = PageRequest::new(Some(3), Some(20), 20, 100) else {
            panic!("expected valid request");
        };
        let page = Page::new(vec![1, 2, 3, 4, 5], 45, req);
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 20);
        assert_eq!(page.total_pages, 3);
    }
}
