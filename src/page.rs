//! The paginated collection handle and the requests built from it.

use serde::{Deserialize, Serialize};

/// Opaque filter or sort criteria. The list never looks inside.
pub type Criteria = serde_json::Value;

/// A paginated collection: the rows of the last fetched page plus the
/// bookkeeping needed to ask for another one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInfo<T> {
    pub list: Vec<T>,
    pub page_num: u32,
    pub page_size: u32,
    pub total: u64,
    /// May be fractional, it is rounded up before comparing page numbers.
    pub total_pages: f64,
    pub filters: Criteria,
    pub sorts: Criteria,
}

impl<T> Default for PageInfo<T> {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            page_num: crate::DEFAULT_PAGE_START,
            page_size: crate::DEFAULT_PAGE_SIZE,
            total: 0,
            total_pages: 0.0,
            filters: Criteria::Null,
            sorts: Criteria::Null,
        }
    }
}

impl<T> PageInfo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: Criteria) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sorts(mut self, sorts: Criteria) -> Self {
        self.sorts = sorts;
        self
    }

    /// Whether `page_num` lies beyond the last page. The first page is never
    /// past the end, so an empty collection can still be (re)loaded.
    pub fn is_past_end(&self, page_num: u32) -> bool {
        page_num != 1 && f64::from(page_num) > self.total_pages.ceil()
    }

    /// Start a request for the given page window, carrying this handle's
    /// criteria. The handle itself is left untouched.
    pub fn jump_page(&self, page_num: u32, page_size: u32) -> PageRequest {
        PageRequest {
            page_num,
            page_size,
            filters: self.filters.clone(),
            sorts: self.sorts.clone(),
        }
    }
}

impl<T: Clone> PageInfo<T> {
    /// Overlay the fields present in `update` onto a copy of this handle.
    pub fn merge(&self, update: PageUpdate<T>) -> PageInfo<T> {
        PageInfo {
            list: update.list.unwrap_or_else(|| self.list.clone()),
            page_num: update.page_num.unwrap_or(self.page_num),
            page_size: update.page_size.unwrap_or(self.page_size),
            total: update.total.unwrap_or(self.total),
            total_pages: update.total_pages.unwrap_or(self.total_pages),
            filters: update.filters.unwrap_or_else(|| self.filters.clone()),
            sorts: update.sorts.unwrap_or_else(|| self.sorts.clone()),
        }
    }
}

/// Describes the page a loader should fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page_num: u32,
    pub page_size: u32,
    pub filters: Criteria,
    pub sorts: Criteria,
}

impl PageRequest {
    /// Replace the filter criteria. `None` keeps the ones inherited from the handle.
    pub fn filter(mut self, filters: Option<Criteria>) -> Self {
        if let Some(filters) = filters {
            self.filters = filters;
        }
        self
    }

    /// Replace the sort criteria. `None` keeps the ones inherited from the handle.
    pub fn sort_by(mut self, sorts: Option<Criteria>) -> Self {
        if let Some(sorts) = sorts {
            self.sorts = sorts;
        }
        self
    }

    /// Index of the first row of this page.
    pub fn offset(&self) -> usize {
        self.page_num.saturating_sub(1) as usize * self.page_size as usize
    }
}

/// What a loader hands back. Absent fields keep their previous value on merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageUpdate<T> {
    pub list: Option<Vec<T>>,
    pub page_num: Option<u32>,
    pub page_size: Option<u32>,
    pub total: Option<u64>,
    pub total_pages: Option<f64>,
    pub filters: Option<Criteria>,
    pub sorts: Option<Criteria>,
}

impl<T> Default for PageUpdate<T> {
    fn default() -> Self {
        Self {
            list: None,
            page_num: None,
            page_size: None,
            total: None,
            total_pages: None,
            filters: None,
            sorts: None,
        }
    }
}

impl<T> PageUpdate<T> {
    /// The usual answer: one page of rows and the page count.
    pub fn page(list: Vec<T>, total_pages: f64) -> Self {
        Self {
            list: Some(list),
            total_pages: Some(total_pages),
            ..Self::default()
        }
    }

    pub fn total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_page_is_never_past_end() {
        let page = PageInfo::<u32>::new();
        assert!(!page.is_past_end(1));
        assert!(page.is_past_end(2));
    }

    #[test]
    fn fractional_total_pages_round_up() {
        let page = PageInfo::<u32> {
            total_pages: 2.2,
            ..PageInfo::default()
        };
        assert!(!page.is_past_end(3));
        assert!(page.is_past_end(4));
    }

    #[test]
    fn request_composition_leaves_handle_alone() {
        let page = PageInfo::<u32>::new().with_filters(json!({"name": "a"}));
        let request = page
            .jump_page(3, 10)
            .filter(Some(json!({"name": "b"})))
            .sort_by(Some(json!({"id": "desc"})));

        assert_eq!(request.page_num, 3);
        assert_eq!(request.page_size, 10);
        assert_eq!(request.offset(), 20);
        assert_eq!(request.filters, json!({"name": "b"}));
        assert_eq!(request.sorts, json!({"id": "desc"}));
        assert_eq!(page.filters, json!({"name": "a"}));
        assert_eq!(page.sorts, Criteria::Null);
    }

    #[test]
    fn absent_criteria_are_inherited() {
        let page = PageInfo::<u32>::new()
            .with_filters(json!({"state": 1}))
            .with_sorts(json!(["id"]));
        let request = page.jump_page(1, 30).filter(None).sort_by(None);
        assert_eq!(request.filters, json!({"state": 1}));
        assert_eq!(request.sorts, json!(["id"]));
    }

    #[test]
    fn merge_overlays_present_fields_only() {
        let page = PageInfo {
            list: vec![1, 2],
            total: 7,
            total_pages: 4.0,
            ..PageInfo::default()
        }
        .with_filters(json!({"kept": true}));

        let merged = page.merge(PageUpdate::page(vec![3], 5.0));

        assert_eq!(merged.list, vec![3]);
        assert_eq!(merged.total_pages, 5.0);
        assert_eq!(merged.total, 7);
        assert_eq!(merged.filters, json!({"kept": true}));
        assert_eq!(page.list, vec![1, 2]);
    }

    #[test]
    fn update_decodes_from_partial_json() {
        let update: PageUpdate<serde_json::Value> =
            serde_json::from_value(json!({"list": [{"id": 1}], "totalPages": 2.5})).unwrap();
        assert_eq!(update.list, Some(vec![json!({"id": 1})]));
        assert_eq!(update.total_pages, Some(2.5));
        assert_eq!(update.total, None);
    }
}
