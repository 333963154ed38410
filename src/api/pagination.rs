use serde::{Deserialize, Serialize};

// ============================================================================
// Pagination - Query Params and List Envelope
// ============================================================================

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// `?page=&limit=` query parameters. Page is 1-based.
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PageQuery {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// List response envelope: `{ items, total, page, limit }`.
#[derive(Debug, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

/// Slice an already-filtered, already-sorted collection down to one page.
pub fn paginate<T>(all: Vec<T>, query: &PageQuery) -> Paged<T> {
    let page = query.page();
    let limit = query.limit();
    let total = all.len();

    let items = all
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Paged {
        items,
        total,
        page,
        limit,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
