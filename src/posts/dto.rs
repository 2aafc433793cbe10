use serde::{Deserialize, Serialize};

use super::repo_types::Post;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Raw listing query. Values are kept as strings so that junk falls back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub q: Option<String>,
}

impl ListPostsQuery {
    pub fn page(&self) -> i64 {
        match self.page.as_deref().map(|p| p.trim().parse::<i64>()) {
            Some(Ok(p)) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        }
    }

    pub fn page_size(&self) -> i64 {
        match self.page_size.as_deref().map(|p| p.trim().parse::<i64>()) {
            Some(Ok(s)) if (1..=MAX_PAGE_SIZE).contains(&s) => s,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn query(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_owned)
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub author: String,
}

#[derive(Debug, Serialize)]
pub struct ListPostsResponse {
    pub items: Vec<Post>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}
