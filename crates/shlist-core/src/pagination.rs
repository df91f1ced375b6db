//! Pagination cursor
//!
//! A [`Cursor`] holds the lists loaded so far for one category and the
//! state needed to load more. It does no I/O: callers [`begin`] a request,
//! perform the fetch, then hand the outcome back with [`apply`] or [`fail`].
//!
//! Every request carries a generation number. Only the most recently issued
//! request may change the cursor; a response to an older request is
//! discarded, so a slow page-0 refresh and a fast load-more cannot overwrite
//! each other out of order.
//!
//! [`begin`]: Cursor::begin
//! [`apply`]: Cursor::apply
//! [`fail`]: Cursor::fail

use serde::Serialize;

use crate::models::{has_more_after, Category, ListItem, Page, ServerId};

/// Ordering applied to page content before it is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentOrder {
    /// Keep the service's order
    AsReceived,
    /// Reverse the content of replacing fetches (page 0 refreshes)
    ReversedOnRefresh,
}

impl ContentOrder {
    /// Ordering used for a category's view
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Active => ContentOrder::ReversedOnRefresh,
            Category::Completed => ContentOrder::AsReceived,
        }
    }
}

/// Pagination flags exposed to renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PaginationState {
    /// Last applied zero-based page
    pub page: u32,
    /// Whether a page after `page` exists
    pub has_more: bool,
    /// A replacing fetch is in flight
    pub is_loading: bool,
    /// A load-more fetch is in flight
    pub is_loading_more: bool,
}

/// A fetch issued by a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub category: Category,
    pub page: u32,
    /// Extend the loaded lists instead of replacing them
    pub append: bool,
    generation: u64,
}

impl PageRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of handing a response back to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The cursor changed
    Applied,
    /// A newer request was issued since; nothing changed
    Stale,
}

/// Loaded lists and pagination state for one category
#[derive(Debug, Clone)]
pub struct Cursor {
    category: Category,
    order: ContentOrder,
    state: PaginationState,
    items: Vec<ListItem>,
    total_elements: u64,
    generation: u64,
}

impl Cursor {
    /// Empty cursor using the category's default ordering
    pub fn new(category: Category) -> Self {
        Self {
            category,
            order: ContentOrder::for_category(category),
            state: PaginationState::default(),
            items: Vec::new(),
            total_elements: 0,
            generation: 0,
        }
    }

    /// Override the content ordering
    pub fn with_order(mut self, order: ContentOrder) -> Self {
        self.order = order;
        self
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn order(&self) -> ContentOrder {
        self.order
    }

    pub fn state(&self) -> PaginationState {
        self.state
    }

    /// Lists loaded so far, in display order
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    /// Total lists in the category as of the last applied page
    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Whether a list with this server id is loaded
    pub fn contains(&self, id: ServerId) -> bool {
        self.items.iter().any(|list| list.id.server_id() == Some(id))
    }

    /// Issue a request for `page`
    ///
    /// Supersedes every request issued before it.
    pub fn begin(&mut self, page: u32, append: bool) -> PageRequest {
        self.generation += 1;
        self.state.is_loading = !append;
        self.state.is_loading_more = append;

        PageRequest {
            category: self.category,
            page,
            append,
            generation: self.generation,
        }
    }

    /// Issue a request for the next page, if one should be loaded
    ///
    /// Returns `None` while any fetch for this category is in flight or
    /// when the last page has been reached.
    pub fn next_request(&mut self) -> Option<PageRequest> {
        if self.state.is_loading_more || self.state.is_loading || !self.state.has_more {
            return None;
        }
        Some(self.begin(self.state.page + 1, true))
    }

    /// Whether `request` is the latest one issued
    pub fn is_current(&self, request: &PageRequest) -> bool {
        request.generation == self.generation
    }

    /// Store a fetched page
    pub fn apply(&mut self, request: &PageRequest, page: Page<ListItem>) -> ApplyOutcome {
        if !self.is_current(request) {
            return ApplyOutcome::Stale;
        }

        let mut content = page.content;
        if !request.append && self.order == ContentOrder::ReversedOnRefresh {
            content.reverse();
        }

        if request.append {
            self.items.extend(content);
        } else {
            self.items = content;
        }

        self.total_elements = page.total_elements;
        self.state = PaginationState {
            page: request.page,
            has_more: has_more_after(request.page, page.total_pages),
            is_loading: false,
            is_loading_more: false,
        };
        ApplyOutcome::Applied
    }

    /// Record a failed fetch
    ///
    /// Only the loading flag is cleared; loaded lists, page and `has_more`
    /// stay as they were so the same page can be requested again.
    pub fn fail(&mut self, request: &PageRequest) -> ApplyOutcome {
        if !self.is_current(request) {
            return ApplyOutcome::Stale;
        }
        self.state.is_loading = false;
        self.state.is_loading_more = false;
        ApplyOutcome::Applied
    }
}
