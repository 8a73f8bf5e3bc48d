use serde::Serialize;
use std::num::NonZeroUsize;

use crate::walk::Window;

/// One page of a listing: 1-indexed page number and a non-zero size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    page_number: usize,
    page_size: NonZeroUsize,
}

impl PageRequest {
    /// Page numbers below 1 are clamped to 1.
    pub fn new(page_number: i64, page_size: NonZeroUsize) -> Self {
        let page_number = usize::try_from(page_number.max(1)).unwrap_or(usize::MAX);
        Self {
            page_number,
            page_size,
        }
    }

    /// Page number from raw input. Missing or unparseable input is page 1;
    /// values below 1 are clamped later by [`PageRequest::new`].
    pub fn parse_page_number(raw: Option<&str>) -> i64 {
        raw.and_then(|raw| raw.trim().parse().ok()).unwrap_or(1)
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Zero-based offset of the first item: `(page_number - 1) * page_size`
    pub fn offset(&self) -> usize {
        (self.page_number - 1).saturating_mul(self.page_size())
    }

    /// Visibility window covering this page
    pub fn window(&self) -> Window {
        Window::new(self.offset(), self.page_size())
    }
}

/// Immutable page of items in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub page_size: usize,
    /// No further items were observed past this page
    pub is_last_page: bool,
}

impl<T> Page<T> {
    /// Package collected items; `more` is whether anything past the page was
    /// seen. Items are kept in the order given.
    pub fn assemble(items: Vec<T>, request: PageRequest, more: bool) -> Self {
        debug_assert!(items.len() <= request.page_size());
        Self {
            items,
            page_number: request.page_number(),
            page_size: request.page_size(),
            is_last_page: !more,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn next_page_number(&self) -> Option<usize> {
        if self.is_last_page {
            None
        } else {
            self.page_number.checked_add(1)
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
