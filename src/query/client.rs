// src/query/client.rs

//! Cached reads and cache-aware mutations over [`StoryApi`].

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{Duration, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheEvent, CacheScope, QueryCache, QueryKey, QueryStatus, invalidation};
use crate::error::{AppError, Result};
use crate::models::{
    Config, GeneratedStory, LikeStatus, PaginationQuery, Story, StoryPatch, StoryPayload,
    StorySummary,
};
use crate::query::mutation::MutationKind;
use crate::services::{Notifier, StoryApi, Toast};

/// What a read hands back to its caller.
#[derive(Debug)]
pub enum QueryState<T> {
    /// The read was disabled; nothing was requested
    Idle,
    Success(T),
    /// The fetch failed; `previous` is the last good value, if any
    Error { error: AppError, previous: Option<T> },
}

impl<T> QueryState<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, QueryState::Idle)
    }

    /// Current value, falling back to the last good one on error.
    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Idle => None,
            QueryState::Success(data) => Some(data),
            QueryState::Error { previous, .. } => previous.as_ref(),
        }
    }

    pub fn error(&self) -> Option<&AppError> {
        match self {
            QueryState::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<Option<T>> {
        match self {
            QueryState::Idle => Ok(None),
            QueryState::Success(data) => Ok(Some(data)),
            QueryState::Error { error, .. } => Err(error),
        }
    }
}

pub struct QueryClient {
    api: StoryApi,
    cache: Mutex<QueryCache>,
    notifier: Arc<dyn Notifier>,
    stale_time: Duration,
    cache_time: Duration,
    retries: u32,
    mutation_retries: u32,
    report_all_failures: bool,
}

impl QueryClient {
    pub fn new(api: StoryApi, notifier: Arc<dyn Notifier>, config: &Config) -> Self {
        let seconds = |secs| {
            Duration::from_std(std::time::Duration::from_secs(secs)).unwrap_or(Duration::MAX)
        };

        Self {
            api,
            cache: Mutex::new(QueryCache::new()),
            notifier,
            stale_time: seconds(config.query.stale_time_secs),
            cache_time: seconds(config.query.cache_time_secs),
            retries: config.query.retries,
            mutation_retries: config.query.mutation_retries,
            report_all_failures: config.notifications.report_all_failures,
        }
    }

    pub fn api(&self) -> &StoryApi {
        &self.api
    }

    fn cache(&self) -> MutexGuard<'_, QueryCache> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Last successful value for `key`, without fetching.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        self.cache().data(key)
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        self.cache().status(key)
    }

    /// Mark every entry under `prefix` stale.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.cache().invalidate(prefix)
    }

    fn apply(&self, event: CacheEvent, scope: &CacheScope<'_>) {
        invalidation::apply(&mut self.cache(), event, scope);
    }

    /// Serve `key` from cache when fresh, otherwise fetch with retries.
    ///
    /// The flag is `true` when the value came from the network.
    async fn run_query<T, F, Fut>(&self, key: QueryKey, fetch: F) -> (QueryState<T>, bool)
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let generation = {
            let mut cache = self.cache();
            let now = Utc::now();
            cache.gc(now, self.cache_time);
            if cache.is_fresh(&key, self.stale_time, now) {
                if let Some(data) = cache.data(&key) {
                    log::debug!("Serving {} from cache", key);
                    return (QueryState::Success(data), false);
                }
            }
            cache.begin_fetch(&key)
        };

        let mut attempt = 0;
        let outcome = loop {
            match fetch().await {
                Ok(data) => break Ok(data),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    log::warn!("Fetching {} failed, retrying ({}): {}", key, attempt, e);
                }
                Err(e) => break Err(e),
            }
        };

        let mut cache = self.cache();
        match outcome {
            Ok(data) => {
                let applied = match serde_json::to_value(&data) {
                    Ok(value) => cache.resolve(&key, generation, Ok(value), Utc::now()),
                    Err(e) => {
                        log::warn!("Not caching {}: {}", key, e);
                        false
                    }
                };
                if !applied && cache.status(&key) == QueryStatus::Success {
                    // A newer fetch already landed.
                    if let Some(latest) = cache.data(&key) {
                        return (QueryState::Success(latest), true);
                    }
                }
                (QueryState::Success(data), true)
            }
            Err(error) => {
                log::error!("Fetching {} failed: {}", key, error);
                cache.resolve(&key, generation, Err(error.to_string()), Utc::now());
                let previous = cache.data(&key);
                (QueryState::Error { error, previous }, true)
            }
        }
    }

    /// One page of the story list. Disabled unless the query has search
    /// text or `force` is set.
    pub async fn list_stories(
        &self,
        query: &PaginationQuery,
        force: bool,
    ) -> QueryState<Vec<Story>> {
        if !force && !query.has_search_text() {
            return QueryState::Idle;
        }
        let key = QueryKey::all_stories(query);
        self.run_query(key, || self.api.get_all(query)).await.0
    }

    pub async fn story(&self, id: &str) -> QueryState<Story> {
        if id.is_empty() {
            return QueryState::Idle;
        }
        let (state, fetched) = self
            .run_query(QueryKey::story(id), || self.api.get_single(id))
            .await;
        if let (QueryState::Success(story), true) = (&state, fetched) {
            let scope = CacheScope::story(id).author(&story.author_username);
            self.apply(CacheEvent::StoryLoaded, &scope);
        }
        state
    }

    pub async fn check_like(&self, id: &str) -> QueryState<LikeStatus> {
        if id.is_empty() {
            return QueryState::Idle;
        }
        self.run_query(QueryKey::check_like(id), || self.api.check_like(id))
            .await
            .0
    }

    pub async fn stories_by_author(&self, username: &str) -> QueryState<Vec<Story>> {
        if username.is_empty() {
            return QueryState::Idle;
        }
        self.run_query(QueryKey::stories_by_author(username), || {
            self.api.get_all_by_author(username)
        })
        .await
        .0
    }

    /// Story and the viewer's like status, fetched concurrently.
    pub async fn story_detail(&self, id: &str) -> (QueryState<Story>, QueryState<LikeStatus>) {
        futures::join!(self.story(id), self.check_like(id))
    }

    async fn mutate<T, F, Fut>(
        &self,
        kind: MutationKind,
        scope: CacheScope<'_>,
        mutation: F,
    ) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let outcome = loop {
            match mutation().await {
                Err(e) if attempt < self.mutation_retries => {
                    attempt += 1;
                    log::warn!("{:?} failed, retrying ({}): {}", kind, attempt, e);
                }
                other => break other,
            }
        };

        match outcome {
            Ok(value) => {
                self.apply(kind.event(), &scope);
                if let Some(message) = kind.success_message() {
                    self.notifier.notify(Toast::success(message));
                }
                Ok(value)
            }
            Err(error) => {
                log::error!("{:?} failed: {}", kind, error);
                if kind.always_reports_failure() || self.report_all_failures {
                    self.notifier.notify(Toast::error(kind.failure_message()));
                }
                Err(error)
            }
        }
    }

    pub async fn create_story(&self, payload: &StoryPayload) -> Result<Story> {
        self.mutate(
            MutationKind::Create,
            CacheScope::default(),
            || self.api.create(payload),
        )
        .await
    }

    pub async fn update_story(&self, id: &str, patch: &StoryPatch) -> Result<Story> {
        self.mutate(
            MutationKind::Update,
            CacheScope::story(id),
            || self.api.update(id, patch),
        )
        .await
    }

    pub async fn delete_story(&self, id: &str) -> Result<()> {
        self.mutate(
            MutationKind::Delete,
            CacheScope::story(id),
            || self.api.delete(id),
        )
        .await
    }

    pub async fn toggle_like(&self, id: &str) -> Result<()> {
        self.mutate(
            MutationKind::ToggleLike,
            CacheScope::story(id),
            || self.api.toggle_like(id),
        )
        .await
    }

    pub async fn summarize(&self, description: &str) -> Result<StorySummary> {
        self.api.summarize(description).await
    }

    pub async fn generate(&self, title: &str, description: &str) -> Result<GeneratedStory> {
        self.api.generate(title, description).await
    }
}
