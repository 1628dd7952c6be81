//! Debounced search.
//!
//! - `debounce`: timestamp-driven trailing debounce
//! - `search_bar`: draft, commit and dropdown state

mod debounce;
mod search_bar;

pub use debounce::Debounce;
pub use search_bar::SearchBar;

use crate::models::Story;
use crate::query::{QueryClient, QueryState};
use crate::utils::params::SearchParams;

/// Fetch dropdown results for the committed search and store them in `bar`.
///
/// An empty search clears the results without a request. On error the
/// previous results stay.
pub async fn refresh_results(
    client: &QueryClient,
    bar: &mut SearchBar,
    params: &SearchParams,
) -> QueryState<Vec<Story>> {
    let state = client.list_stories(&bar.query(params), false).await;
    match &state {
        QueryState::Idle => bar.set_results(Vec::new()),
        QueryState::Success(stories) => bar.set_results(stories.clone()),
        QueryState::Error { .. } => {}
    }
    state
}
