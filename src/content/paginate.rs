//! Pagination over an already filtered and sorted list

use serde::Serialize;

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub posts: Vec<T>,
    /// Length of the whole listing
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    /// Convert the items of the page, keeping the counts
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            posts: self.posts.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// Slice page `page` (1-based) of `page_size` items out of `posts`.
///
/// Pages past the end are empty rather than clamped. Callers must pass
/// `page >= 1` and `page_size >= 1`; anything else is a contract violation.
pub fn paginate<T: Clone>(posts: &[T], page: usize, page_size: usize) -> Paginated<T> {
    debug_assert!(page >= 1, "page is 1-based");
    debug_assert!(page_size >= 1, "page_size must be positive");

    let total = posts.len();
    let total_pages = total.div_ceil(page_size);

    let start = page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(total);
    let end = start.saturating_add(page_size).min(total);

    Paginated {
        posts: posts[start..end].to_vec(),
        total,
        total_pages,
    }
}
