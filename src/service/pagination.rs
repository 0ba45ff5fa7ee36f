//! Page window computation and the paginated result shape.

use crate::sql::SelectQuery;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const DEFAULT_ITEMS_PER_PAGE: i64 = 20;

/// Body-level override accepted by the query endpoint.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOverride {
    #[serde(default)]
    pub pagination: Option<bool>,
    #[serde(default)]
    pub items_per_page: Option<i64>,
    #[serde(default)]
    pub page_index: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub enabled: bool,
    pub page_index: u64,
    /// `<= 0` means no limit.
    pub items_per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            enabled: true,
            page_index: 0,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// `itemsPerPage` is taken when >= 1, `pageIndex` when >= 0, anything else keeps the
    /// default. `pagination=false` turns paging off.
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let mut page = PageRequest::default();
        if let Some(n) = query.get("itemsPerPage").and_then(|v| v.parse::<i64>().ok()) {
            if n >= 1 {
                page.items_per_page = n;
            }
        }
        if let Some(n) = query.get("pageIndex").and_then(|v| v.parse::<u64>().ok()) {
            page.page_index = n;
        }
        if query.get("pagination").map(String::as_str) == Some("false") {
            page.enabled = false;
        }
        page
    }

    /// Body values win over the query string.
    pub fn with_override(mut self, o: Option<&PaginationOverride>) -> Self {
        let Some(o) = o else { return self };
        if let Some(enabled) = o.pagination {
            self.enabled = enabled;
        }
        if let Some(n) = o.items_per_page {
            self.items_per_page = n;
        }
        if let Some(n) = o.page_index {
            self.page_index = n.max(0) as u64;
        }
        self
    }

    pub fn limit(&self) -> Option<u64> {
        (self.items_per_page > 0).then_some(self.items_per_page as u64)
    }

    pub fn offset(&self) -> Option<u64> {
        self.limit().map(|l| l.saturating_mul(self.page_index))
    }

    pub fn apply(&self, query: SelectQuery) -> SelectQuery {
        query.limit(self.limit()).offset(self.offset())
    }

    pub fn result(&self, items: Vec<Value>, total_items: u64) -> PaginatedResult {
        build_result(items, total_items, self.page_index, self.items_per_page)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult {
    pub items: Vec<Value>,
    pub page_index: u64,
    pub items_per_page: i64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// `ceil(total / per_page)`; an unlimited page holds everything in one page.
pub fn total_pages(total_items: u64, items_per_page: i64) -> u64 {
    if items_per_page <= 0 {
        return u64::from(total_items > 0);
    }
    total_items.div_ceil(items_per_page as u64)
}

pub fn build_result(items: Vec<Value>, total_items: u64, page_index: u64, items_per_page: i64) -> PaginatedResult {
    PaginatedResult {
        items,
        page_index,
        items_per_page,
        total_items,
        total_pages: total_pages(total_items, items_per_page),
    }
}
