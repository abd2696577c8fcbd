//! # Paginator
//!
//! Fixed-size windowing over an ordered sequence. Pages are 1-based.

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Slice `[(page_index-1)*page_size, page_index*page_size)`, clamped to the input.
///
/// Page 0, a page past the end, or a zero page size all yield an empty slice.
pub fn page<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    if page_index == 0 || page_size == 0 {
        return &[];
    }
    let start = (page_index - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// First `page_index` pages concatenated
pub fn window<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    let end = page_index.saturating_mul(page_size).min(items.len());
    &items[..end]
}

/// Whether a page exists beyond `page_index`
pub fn has_more(total: usize, page_index: usize, page_size: usize) -> bool {
    page_index.saturating_mul(page_size) < total
}
