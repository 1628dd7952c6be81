// src/feed/infinite.rs

//! Accumulating page state for one filter at a time.

use crate::models::{FeedConfig, FilterKey, PaginationQuery, Story};
use crate::utils::params::SearchParams;

/// Identifies the request a page response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    epoch: u64,
    page: u32,
}

impl PageTicket {
    /// 0-based page index
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// Infinite-scroll list.
///
/// Items always belong to the current filter key. A key change resets
/// the list, and responses issued before the reset are discarded.
#[derive(Debug, Clone)]
pub struct InfiniteFeed {
    query: PaginationQuery,
    page: u32,
    items: Vec<Story>,
    has_more: bool,
    loading: bool,
    pending: Option<u32>,
    page_size: u32,
    epoch: u64,
}

impl InfiniteFeed {
    pub fn new(params: &SearchParams, config: &FeedConfig) -> Self {
        Self {
            query: PaginationQuery::from_params(params, 1, config.page_size),
            page: 0,
            items: Vec::new(),
            has_more: true,
            loading: false,
            pending: Some(0),
            page_size: config.page_size,
            epoch: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items(&self) -> &[Story] {
        &self.items
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filter_key(&self) -> FilterKey {
        self.query.filter_key()
    }

    /// Adopt the filter in `params`. Resets when the filter key changed.
    pub fn sync_filter(&mut self, params: &SearchParams) -> bool {
        let next = PaginationQuery::from_params(params, 1, self.page_size);
        if next.filter_key() == self.query.filter_key() {
            return false;
        }
        log::debug!("Feed filter changed, resetting: {:?}", next.filter_key());
        self.query = next;
        self.page = 0;
        self.items.clear();
        self.has_more = true;
        self.loading = false;
        self.pending = Some(0);
        self.epoch += 1;
        true
    }

    /// The request for the current page, if one is due. Marks the feed loading.
    pub fn next_request(&mut self) -> Option<(PageTicket, PaginationQuery)> {
        if self.loading {
            return None;
        }
        let page = self.pending.take()?;
        self.loading = true;
        let ticket = PageTicket {
            epoch: self.epoch,
            page,
        };
        Some((ticket, self.query.clone().with_page(page + 1)))
    }

    fn is_current(&self, ticket: &PageTicket) -> bool {
        ticket.epoch == self.epoch && ticket.page == self.page
    }

    /// Record a page response. Returns `false` for stale tickets.
    pub fn on_page_loaded(&mut self, ticket: PageTicket, items: Vec<Story>) -> bool {
        if !self.is_current(&ticket) {
            log::debug!("Dropping stale page {} response", ticket.page + 1);
            return false;
        }
        self.loading = false;
        // A short page is taken as the last one.
        if items.len() < self.page_size as usize {
            self.has_more = false;
        }
        if ticket.page == 0 {
            self.items = items;
        } else {
            self.items.extend(items);
        }
        true
    }

    /// Record a failed page; the next request retries it.
    pub fn on_page_failed(&mut self, ticket: PageTicket) -> bool {
        if !self.is_current(&ticket) {
            return false;
        }
        self.loading = false;
        self.pending = Some(ticket.page);
        true
    }

    /// Advance to the next page when idle and more pages may exist.
    pub fn load_more(&mut self) -> bool {
        if self.loading || !self.has_more || self.pending.is_some() {
            return false;
        }
        self.page += 1;
        self.pending = Some(self.page);
        true
    }
}
