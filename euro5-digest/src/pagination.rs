//! Pagination utilities for the story list

/// Stories per page unless configured otherwise
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages
    pub total_pages: usize,
    /// Index of the first item on the page
    pub offset: usize,
}

/// Calculate pagination metadata from total results and requested page
///
/// Ensures page is within valid bounds [1, max(1, total_pages)]
///
/// # Examples
/// ```
/// use euro5_digest::pagination::calculate_pagination;
///
/// // 30 stories at 12 per page = 3 pages (12 + 12 + 6)
/// let p = calculate_pagination(30, 2, 12);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 12);
///
/// // Requesting out-of-bounds page gets clamped
/// let p = calculate_pagination(30, 99, 12);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.offset, 24);
/// ```
pub fn calculate_pagination(total_results: usize, requested_page: usize, page_size: usize) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total_results.div_ceil(page_size);
    let page = requested_page.max(1).min(total_pages.max(1));
    let offset = (page - 1) * page_size;

    Pagination {
        page,
        total_pages,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(30, 2, 12);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 12);
    }

    #[test]
    fn test_pagination_out_of_bounds_high() {
        let p = calculate_pagination(20, 99, 12);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 12);
    }

    #[test]
    fn test_pagination_out_of_bounds_low() {
        let p = calculate_pagination(20, 0, 12);
        assert_eq!(p.page, 1);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1, 12);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(24, 2, 12);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 12);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        let p = calculate_pagination(3, 2, 0);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 1);
    }
}
