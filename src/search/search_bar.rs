// src/search/search_bar.rs

//! Search box with a results dropdown.
//!
//! Keystrokes edit a local draft. The draft reaches the shared `search`
//! parameter only after it has been quiet for the debounce delay.

use std::time::Duration;

use tokio::time::Instant;

use crate::models::{PaginationQuery, Route, SearchConfig, Story, param};
use crate::search::debounce::Debounce;
use crate::utils::params::SearchParams;

#[derive(Debug, Clone)]
pub struct SearchBar {
    draft: String,
    debounce: Debounce<String>,
    focused: bool,
    results: Vec<Story>,
    per_page: u32,
}

impl SearchBar {
    pub fn new(params: &SearchParams, config: &SearchConfig) -> Self {
        Self {
            draft: params.get(param::SEARCH).unwrap_or_default().to_string(),
            debounce: Debounce::new(Duration::from_millis(config.debounce_ms)),
            focused: false,
            results: Vec::new(),
            per_page: config.per_page,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.draft = text.into();
        self.debounce.push(self.draft.clone(), now);
    }

    /// Commit the settled draft into `params`. Returns `true` when the
    /// `search` parameter changed.
    pub fn tick(&mut self, now: Instant, params: &mut SearchParams) -> bool {
        let Some(value) = self.debounce.poll(now) else {
            return false;
        };
        if params.get(param::SEARCH).unwrap_or_default() == value {
            return false;
        }

        if value.is_empty() {
            params.delete(param::SEARCH);
        } else {
            params.set(param::SEARCH, value);
        }
        log::debug!("Search committed: {}", params);
        true
    }

    /// When the pending draft settles.
    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn click_outside(&mut self) {
        self.focused = false;
    }

    pub fn set_results(&mut self, results: Vec<Story>) {
        self.results = results;
    }

    pub fn results(&self) -> &[Story] {
        &self.results
    }

    pub fn dropdown_visible(&self) -> bool {
        self.focused && (!self.results.is_empty() || !self.draft.trim().is_empty())
    }

    /// Close the dropdown and navigate to the chosen story.
    pub fn select_result(&mut self, id: &str) -> Route {
        self.focused = false;
        Route::StoryDetail(id.to_string())
    }

    /// Close the dropdown and navigate to a user's page.
    pub fn select_author(&mut self, username: &str) -> Route {
        self.focused = false;
        Route::Author(username.to_string())
    }

    /// Query for the dropdown results: first page of the committed search.
    pub fn query(&self, params: &SearchParams) -> PaginationQuery {
        PaginationQuery::from_params(params, 1, self.per_page)
    }

    /// Drop any pending commit.
    pub fn unmount(&mut self) {
        self.debounce.cancel();
        self.focused = false;
    }
}
