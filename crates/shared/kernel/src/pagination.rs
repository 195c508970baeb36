//! Offset pagination shared by list endpoints.

use crate::validation::RequestError;
use remit_derive::api_model;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound on a single page.
pub const MAX_PAGE_SIZE: u32 = 2000;

/// A zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    /// Builds a request from optional raw query values.
    ///
    /// # Errors
    /// Returns [`RequestError::InvalidArgument`] for a negative page or a size outside
    /// `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<i64>, size: Option<i64>) -> Result<Self, RequestError> {
        let page = match page {
            None => 0,
            Some(p) => u32::try_from(p).map_err(|_| RequestError::InvalidArgument {
                message: format!("Page index must not be negative: {p}").into(),
            })?,
        };
        let size = match size {
            None => DEFAULT_PAGE_SIZE,
            Some(s) => u32::try_from(s)
                .ok()
                .filter(|s| (1..=MAX_PAGE_SIZE).contains(s))
                .ok_or_else(|| RequestError::InvalidArgument {
                    message: format!("Page size must be between 1 and {MAX_PAGE_SIZE}: {s}").into(),
                })?,
        };
        Ok(Self { page, size })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }
}

/// One page of results plus the totals needed to render pagination.
#[api_model(response)]
#[derive(Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let total_pages = total_elements.div_ceil(u64::from(request.size));
        let page = u64::from(request.page);
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            first: page == 0,
            last: page + 1 >= total_pages,
        }
    }

    /// Converts the content while keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            first: self.first,
            last: self.last,
        }
    }
}
