//! Server-reported pagination and the page-button window shown under lists.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Page sizes offered by the page-size selector.
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 25, 50, 100];
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 10;
/// Maximum number of page-number buttons rendered at once.
pub const PAGE_WINDOW: u32 = 5;

/// Maps any page size outside [`PAGE_SIZE_OPTIONS`] to the default.
pub fn sanitize_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(limit) if PAGE_SIZE_OPTIONS.contains(&limit) => limit,
        _ => DEFAULT_ITEMS_PER_PAGE,
    }
}

/// Pages are 1-based; zero or absent becomes page 1.
pub fn sanitize_page(page: Option<u32>) -> u32 {
    page.filter(|p| *p > 0).unwrap_or(1)
}

/// Pagination block returned by the backend with every list response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDescriptor {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: u32,
}

impl Default for PaginationDescriptor {
    fn default() -> Self {
        Self::first_page(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl PaginationDescriptor {
    /// Descriptor for an empty result set.
    pub fn first_page(items_per_page: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            items_per_page,
        }
    }

    /// Total pages for display; falls back to `ceil(total / limit)` when the
    /// server reports zero pages for a non-empty set.
    pub fn display_total_pages(&self) -> u32 {
        if self.total_pages == 0 && self.total_items > 0 && self.items_per_page > 0 {
            let pages = self.total_items.div_ceil(u64::from(self.items_per_page));
            u32::try_from(pages).unwrap_or(u32::MAX)
        } else {
            self.total_pages.max(1)
        }
    }
}

/// One page of records plus the server's pagination block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub data: Vec<T>,
    pub pagination: PaginationDescriptor,
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    pagination: Option<PaginationDescriptor>,
}

impl<T> ListPage<T> {
    pub fn empty(items_per_page: u32) -> Self {
        Self {
            data: Vec::new(),
            pagination: PaginationDescriptor::first_page(items_per_page),
        }
    }
}

impl<T: DeserializeOwned> ListPage<T> {
    /// Parses the `{data, pagination}` envelope. A missing pagination block
    /// is treated as a single page holding everything that was returned.
    pub fn from_envelope(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let envelope: Envelope<T> = serde_json::from_value(value)?;
        let pagination = envelope.pagination.unwrap_or_else(|| {
            let count = u32::try_from(envelope.data.len()).unwrap_or(u32::MAX);
            PaginationDescriptor {
                current_page: 1,
                total_pages: 1,
                total_items: u64::from(count),
                items_per_page: count.max(DEFAULT_ITEMS_PER_PAGE),
            }
        });
        Ok(Self {
            data: envelope.data,
            pagination,
        })
    }
}

fn page_window(current_page: u32, total_pages: u32) -> Vec<u32> {
    let total_pages = total_pages.max(1);
    if total_pages <= PAGE_WINDOW {
        return (1..=total_pages).collect();
    }

    let half = PAGE_WINDOW / 2;
    let current_page = current_page.clamp(1, total_pages);
    let mut start = current_page.saturating_sub(half).max(1);
    let mut end = start + PAGE_WINDOW - 1;
    if end > total_pages {
        end = total_pages;
        start = total_pages - PAGE_WINDOW + 1;
    }

    (start..=end).collect()
}

/// Everything the pagination control renders, derived from a descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub limit: u32,
    /// First row shown, 1-based ("showing X").
    pub from: u64,
    /// Last row shown ("to Y").
    pub to: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub pages: Vec<u32>,
    pub page_sizes: &'static [u32],
}

impl PaginationView {
    /// Builds the view, using `page=1, totalPages=1, total=0, limit=10` when
    /// no descriptor is available yet.
    pub fn new(pagination: Option<&PaginationDescriptor>) -> Self {
        let descriptor = pagination.copied().unwrap_or_default();
        let total_pages = descriptor.display_total_pages();
        let page = descriptor.current_page.clamp(1, total_pages);
        let limit = descriptor.items_per_page.max(1);
        let total = descriptor.total_items;

        let from = (u64::from(page - 1) * u64::from(limit) + 1).min(total);
        let to = (u64::from(page) * u64::from(limit)).min(total);

        Self {
            page,
            total_pages,
            total,
            limit,
            from,
            to,
            has_previous: page > 1,
            has_next: page < total_pages,
            pages: page_window(page, total_pages),
            page_sizes: &PAGE_SIZE_OPTIONS,
        }
    }

    /// Returns the page to navigate to, or `None` when the request is out of
    /// range or already current.
    pub fn go_to(&self, page: u32) -> Option<u32> {
        if page < 1 || page > self.total_pages || page == self.page {
            None
        } else {
            Some(page)
        }
    }

    pub fn previous(&self) -> Option<u32> {
        if self.has_previous {
            self.go_to(self.page - 1)
        } else {
            None
        }
    }

    pub fn next(&self) -> Option<u32> {
        if self.has_next {
            self.go_to(self.page + 1)
        } else {
            None
        }
    }
}

/// Items of one page together with their pagination control.
#[derive(Clone, Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationView,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, pagination: &PaginationDescriptor) -> Self {
        Self {
            items,
            pagination: PaginationView::new(Some(pagination)),
        }
    }

    pub fn from_page(page: ListPage<T>) -> Self {
        Self::new(page.data, &page.pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(current_page: u32, total_pages: u32, total_items: u64, limit: u32) -> PaginationDescriptor {
        PaginationDescriptor {
            current_page,
            total_pages,
            total_items,
            items_per_page: limit,
        }
    }

    #[test]
    fn small_page_counts_show_every_page() {
        for total in 1..=5 {
            for current in 1..=total {
                let view = PaginationView::new(Some(&descriptor(current, total, 40, 10)));
                assert_eq!(view.pages, (1..=total).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn interior_pages_are_centered() {
        for current in 3..=18 {
            let view = PaginationView::new(Some(&descriptor(current, 20, 200, 10)));
            assert_eq!(view.pages, (current - 2..=current + 2).collect::<Vec<_>>());
        }
    }

    #[test]
    fn window_clamps_to_edges() {
        let first = PaginationView::new(Some(&descriptor(1, 9, 90, 10)));
        assert_eq!(first.pages, vec![1, 2, 3, 4, 5]);
        let second = PaginationView::new(Some(&descriptor(2, 9, 90, 10)));
        assert_eq!(second.pages, vec![1, 2, 3, 4, 5]);
        let last = PaginationView::new(Some(&descriptor(9, 9, 90, 10)));
        assert_eq!(last.pages, vec![5, 6, 7, 8, 9]);
        let near_last = PaginationView::new(Some(&descriptor(8, 9, 90, 10)));
        assert_eq!(near_last.pages, vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn missing_descriptor_uses_defaults() {
        let view = PaginationView::new(None);
        assert_eq!(view.page, 1);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.total, 0);
        assert_eq!(view.limit, 10);
        assert_eq!((view.from, view.to), (0, 0));
        assert_eq!(view.pages, vec![1]);
        assert!(!view.has_previous && !view.has_next);
    }

    #[test]
    fn summary_is_clamped_to_total() {
        let view = PaginationView::new(Some(&descriptor(3, 3, 25, 10)));
        assert_eq!((view.from, view.to, view.total), (21, 25, 25));
        let view = PaginationView::new(Some(&descriptor(1, 3, 25, 10)));
        assert_eq!((view.from, view.to), (1, 10));
    }

    #[test]
    fn boundaries_disable_previous_and_next() {
        let first = PaginationView::new(Some(&descriptor(1, 3, 25, 10)));
        assert_eq!(first.previous(), None);
        assert_eq!(first.next(), Some(2));

        let last = PaginationView::new(Some(&descriptor(3, 3, 25, 10)));
        assert_eq!(last.next(), None);
        assert_eq!(last.previous(), Some(2));
    }

    #[test]
    fn go_to_guards_out_of_range_pages() {
        let view = PaginationView::new(Some(&descriptor(2, 4, 40, 10)));
        assert_eq!(view.go_to(0), None);
        assert_eq!(view.go_to(5), None);
        assert_eq!(view.go_to(2), None);
        assert_eq!(view.go_to(4), Some(4));
    }

    #[test]
    fn total_pages_fallback_only_for_display() {
        let d = descriptor(1, 0, 31, 10);
        assert_eq!(d.display_total_pages(), 4);
        assert_eq!(descriptor(1, 0, 0, 10).display_total_pages(), 1);
    }

    #[test]
    fn limits_outside_the_option_set_fall_back() {
        assert_eq!(sanitize_limit(Some(25)), 25);
        assert_eq!(sanitize_limit(Some(7)), DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(sanitize_limit(None), DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(sanitize_page(Some(0)), 1);
    }

    #[test]
    fn envelope_parses_with_and_without_pagination() {
        let page: ListPage<String> = ListPage::from_envelope(serde_json::json!({
            "data": ["a", "b"],
            "pagination": {"currentPage": 1, "totalPages": 3, "totalItems": 25, "itemsPerPage": 10}
        }))
        .unwrap();
        assert_eq!(page.data, vec!["a", "b"]);
        assert_eq!(page.pagination, descriptor(1, 3, 25, 10));

        let bare: ListPage<String> =
            ListPage::from_envelope(serde_json::json!({"data": ["x"]})).unwrap();
        assert_eq!(bare.pagination.total_items, 1);
    }
}
