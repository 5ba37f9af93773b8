/// Rows revealed per page.
pub const PAGE_SIZE: usize = 50;

/// Length of a freshly reset window.
pub fn initial(result_len: usize, page_size: usize) -> usize {
    page_size.min(result_len)
}

/// Reveal one more page, clamped to the result. At or past the end this
/// returns `current` unchanged.
pub fn grow(current: usize, result_len: usize, page_size: usize) -> usize {
    if current >= result_len {
        return current;
    }
    current.saturating_add(page_size).min(result_len)
}

/// Displayed prefix `[0, len)` of the current result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    page_size: usize,
    len: usize,
}

impl DisplayWindow {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            len: 0,
        }
    }

    pub fn reset(&mut self, result_len: usize) -> usize {
        self.len = initial(result_len, self.page_size);
        self.len
    }

    pub fn grow(&mut self, result_len: usize) -> usize {
        self.len = grow(self.len, result_len, self.page_size);
        self.len
    }

    /// Shrink after rows left the result, never growing.
    pub fn clamp(&mut self, result_len: usize) -> usize {
        self.len = self.len.min(result_len);
        self.len
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        0..self.len
    }
}
