use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw page parameters as supplied by a caller. Nothing is validated here;
/// see [`PageRequest::normalize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

/// Normalized page parameters together with the derived offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub page_size: i64,
    pub offset: i64,
}

/// Response envelope for a single page of items.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination<T> {
    pub total: i64,
    pub page: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    pub list: Vec<T>,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self { page, page_size }
    }

    /// Clamps the request into a usable window. Invalid input never fails:
    ///
    /// - a zero page becomes the first page, negative pages are kept as is
    /// - a page size above [`MAX_PAGE_SIZE`] is clamped to it
    /// - a non-positive page size falls back to [`DEFAULT_PAGE_SIZE`]
    pub fn normalize(self) -> PageWindow {
        let page = if self.page == 0 { DEFAULT_PAGE } else { self.page };

        let page_size = match self.page_size {
            size if size > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
            size if size <= 0 => DEFAULT_PAGE_SIZE,
            size => size,
        };

        // Saturates only for pages near the i64 bounds.
        let offset = page.saturating_sub(1).saturating_mul(page_size);

        PageWindow {
            page,
            page_size,
            offset,
        }
    }
}

/// Shorthand for `PageRequest::new(page, page_size).normalize()`.
pub fn paginate(page: i64, page_size: i64) -> PageWindow {
    PageRequest::new(page, page_size).normalize()
}

impl PageWindow {
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Applies the window to an in-memory collection. A negative offset or
    /// one past the end yields an empty slice.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let Ok(start) = usize::try_from(self.offset) else {
            return &[];
        };
        if start >= items.len() {
            return &[];
        }
        let len = usize::try_from(self.page_size).unwrap_or(0);
        let end = start.saturating_add(len).min(items.len());

        &items[start..end]
    }

    pub fn into_pagination<T>(self, total: i64, list: Vec<T>) -> Pagination<T> {
        Pagination::new(self, total, list)
    }
}

impl From<PageRequest> for PageWindow {
    fn from(value: PageRequest) -> Self {
        value.normalize()
    }
}

impl<T> Pagination<T> {
    pub fn new(window: PageWindow, total: i64, list: Vec<T>) -> Self {
        Self {
            total,
            page: window.page,
            page_size: window.page_size,
            list,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Pagination<U> {
        Pagination {
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            list: self.list.into_iter().map(f).collect(),
        }
    }
}
