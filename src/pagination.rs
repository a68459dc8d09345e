//! This modules defines the common functionality for paging data.

/// The number of rows shown on each page of a paginated table.
pub const PAGE_SIZE: usize = 10;

/// The number of pages needed to show `item_count` items, `PAGE_SIZE` at a time.
///
/// An empty collection has zero pages.
pub fn page_count(item_count: usize) -> usize {
    item_count.div_ceil(PAGE_SIZE)
}

/// The items shown on the 1-based `page`.
///
/// Pages past the end, and page zero, give an empty slice rather than an error
/// so that a stale page number renders as an empty table.
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    let Some(start) = page.checked_sub(1).map(|index| index * PAGE_SIZE) else {
        return &[];
    };

    if start >= items.len() {
        return &[];
    }

    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Clamp `page` into `1..=page_count`, treating an empty collection as having one page.
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}
