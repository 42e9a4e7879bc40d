//! Page-number pagination for Bitbucket collection endpoints.
//!
//! Bitbucket collections are requested with `page` and `pagelen` query
//! parameters. A page that comes back with exactly `pagelen` items is treated
//! as "full", meaning another page probably follows. Listing stops at the
//! first page holding fewer items, which includes an empty page.

use std::future::Future;

use tracing::debug;

use crate::error::ReviewError;

/// Number of items requested per page when listing comments.
pub const COMMENTS_PAGE_SIZE: u32 = 50;

/// A single page request.
///
/// # Example
///
/// ```
/// use pr_reviewer::bitbucket::pagination::PageRequest;
///
/// let first = PageRequest::first(50);
/// assert_eq!(first.page(), 1);
/// assert!(first.is_full(50));
/// assert!(!first.is_full(49));
/// assert_eq!(first.next().page(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_len: u32,
}

impl PageRequest {
    /// Request for the first page (1-based) with the given page length.
    #[must_use]
    pub const fn first(page_len: u32) -> Self {
        Self { page: 1, page_len }
    }

    /// Request for the page after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            page_len: self.page_len,
        }
    }

    /// Page number (1-based).
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Requested number of items per page.
    #[must_use]
    pub const fn page_len(self) -> u32 {
        self.page_len
    }

    /// Returns true when a page holding `item_count` items filled this request.
    #[must_use]
    pub fn is_full(self, item_count: usize) -> bool {
        usize::try_from(self.page_len).is_ok_and(|page_len| item_count == page_len)
    }

    /// Query parameters for this request.
    #[must_use]
    pub fn query(self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("pagelen", self.page_len.to_string()),
        ]
    }
}

/// Requests consecutive pages until one is not full, concatenating the items
/// in request order.
///
/// The first failing page aborts the listing; no partial result is returned.
///
/// # Errors
///
/// Propagates the first error returned by `fetch_page`.
pub async fn collect_pages<T, F, Fut>(
    page_len: u32,
    mut fetch_page: F,
) -> Result<Vec<T>, ReviewError>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ReviewError>>,
{
    let mut items = Vec::new();
    let mut request = PageRequest::first(page_len);

    loop {
        let page_items = fetch_page(request).await?;
        let full = request.is_full(page_items.len());
        debug!(
            page = request.page(),
            count = page_items.len(),
            full,
            "fetched page"
        );
        items.extend(page_items);

        if !full {
            return Ok(items);
        }
        request = request.next();
    }
}
