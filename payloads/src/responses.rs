use serde::{Deserialize, Serialize};

use crate::filters::QueryParams;

/// Pagination descriptor returned alongside every paged list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub size: u32,
    pub number: u32,
    pub total_elements: u64,
    pub total_pages: u32,
}

impl PageMeta {
    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }

    /// The page number to request after this one, if there is one.
    pub fn next_page(&self) -> Option<u32> {
        self.has_next().then_some(self.number + 1)
    }
}

/// A single page of a paged list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: PageMeta,
}

impl<T: Clone> Page<T> {
    /// Slice an in-memory list into the requested page, for resources the
    /// backend only serves as a full list.
    pub fn from_items(items: &[T], request: PageRequest) -> Self {
        let size = request.size.max(1);
        let total_elements = items.len() as u64;
        let total_pages = items.len().div_ceil(size as usize) as u32;
        let content = items
            .iter()
            .skip(request.page as usize * size as usize)
            .take(size as usize)
            .cloned()
            .collect();
        Page {
            content,
            page: PageMeta {
                size,
                number: request.page,
                total_elements,
                total_pages,
            },
        }
    }
}

/// Page number and page size for a paged list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn first(size: u32) -> Self {
        Self { page: 0, size }
    }
}

impl QueryParams for PageRequest {
    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string()), ("size", self.size.to_string())]
    }
}

/// Credentials returned after a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthData {
    pub email: String,
    pub token: String,
}
