//! Fixed-size feed pagination.

/// Number of posts on every feed page.
pub const PAGE_SIZE: i64 = 10;

/// A 1-indexed page number. Zero and missing numbers degrade to page 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    number: u32,
}

impl PageRequest {
    pub fn new(number: Option<u32>) -> Self {
        Self {
            number: number.filter(|n| *n > 0).unwrap_or(1),
        }
    }

    pub fn first() -> Self {
        Self { number: 1 }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Offset of the first item, in store terms.
    pub fn offset(&self) -> i64 {
        (i64::from(self.number) - 1) * PAGE_SIZE
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Navigation data for a page of a feed of `total` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub number: u32,
    pub num_pages: u32,
    pub total: i64,
}

impl PageInfo {
    /// At least one page is reported, even for an empty feed.
    pub fn new(request: PageRequest, total: i64) -> Self {
        let pages = (total.max(0) + PAGE_SIZE - 1) / PAGE_SIZE;
        Self {
            number: request.number(),
            num_pages: u32::try_from(pages.max(1)).unwrap_or(u32::MAX),
            total,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn previous_number(&self) -> u32 {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_number(&self) -> u32 {
        self.number.saturating_add(1)
    }
}

/// One page of a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub info: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            info: PageInfo::new(request, total),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            info: self.info,
        }
    }
}
