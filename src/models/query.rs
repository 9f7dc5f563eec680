use serde::{Deserialize, Serialize};
use validator::Validate;

use super::blogs::BlogSummary;

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct PageRequest {
    #[validate(range(min = 1, message = "Page number starts at 1"))]
    pub page_number: u32,
    #[validate(range(min = 1, message = "Page size must be greater than 0"))]
    pub page_size: u32,
    pub search: Option<String>,
    pub filter: Option<String>,
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
            search: None,
            filter: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Query parameters in wire order. Blank `search`/`filter` are left out
    /// rather than sent as empty values.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("pageNumber", self.page_number.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];

        if let Some(search) = non_blank(&self.search) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(filter) = non_blank(&self.filter) {
            pairs.push(("filter", filter.to_string()));
        }

        pairs
    }

    pub fn to_query_string(&self) -> String {
        encode_pairs(&self.query_pairs())
    }
}

pub fn encode_pairs(pairs: &[(&str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PageResult {
    pub items: Vec<BlogSummary>,
    #[serde(rename = "totalPages", default = "one")]
    pub total_pages: u32,
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
}

impl PageResult {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
            total_count: 0,
        }
    }

    /// The client trusts the server's page count but never goes below one page.
    pub fn normalized(mut self) -> Self {
        self.total_pages = self.total_pages.max(1);
        self
    }
}

fn one() -> u32 {
    1
}
