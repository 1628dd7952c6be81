// src/feed/loader.rs

//! Drives an [`InfiniteFeed`] through the query client.

use std::sync::Arc;

use crate::error::Result;
use crate::feed::infinite::InfiniteFeed;
use crate::models::FeedConfig;
use crate::query::{QueryClient, QueryState};
use crate::utils::params::SearchParams;

pub struct FeedLoader {
    client: Arc<QueryClient>,
    feed: InfiniteFeed,
}

impl FeedLoader {
    pub fn new(client: Arc<QueryClient>, params: &SearchParams, config: &FeedConfig) -> Self {
        Self {
            client,
            feed: InfiniteFeed::new(params, config),
        }
    }

    pub fn feed(&self) -> &InfiniteFeed {
        &self.feed
    }

    /// Follow the filter in `params`, then load whatever page is due.
    pub async fn sync(&mut self, params: &SearchParams) -> Result<usize> {
        self.feed.sync_filter(params);
        self.load_pending().await
    }

    /// Fetch the due page, if any. Returns how many items it added.
    pub async fn load_pending(&mut self) -> Result<usize> {
        let Some((ticket, query)) = self.feed.next_request() else {
            return Ok(0);
        };

        match self.client.list_stories(&query, true).await {
            QueryState::Success(stories) => {
                let count = stories.len();
                self.feed.on_page_loaded(ticket, stories);
                log::info!(
                    "Loaded page {} ({} items, {} total)",
                    ticket.page() + 1,
                    count,
                    self.feed.items().len()
                );
                Ok(count)
            }
            QueryState::Error { error, .. } => {
                self.feed.on_page_failed(ticket);
                Err(error)
            }
            QueryState::Idle => {
                self.feed.on_page_loaded(ticket, Vec::new());
                Ok(0)
            }
        }
    }

    /// Advance one page. Returns `Ok(false)` when nothing more can be loaded.
    pub async fn load_more(&mut self) -> Result<bool> {
        if !self.feed.load_more() {
            return Ok(false);
        }
        self.load_pending().await?;
        Ok(true)
    }
}
