// src/cache/key.rs

//! Cache keys.

use std::fmt;

use crate::models::PaginationQuery;

/// The operation a cached query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    AllStories,
    SingleStory,
    StoriesByAuthor,
    CheckStoryLike,
    UserStats,
    SingleUser,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::AllStories => "allStories",
            QueryKind::SingleStory => "singleStory",
            QueryKind::StoriesByAuthor => "allStoriesByUser",
            QueryKind::CheckStoryLike => "checkStoryLike",
            QueryKind::UserStats => "userStats",
            QueryKind::SingleUser => "singleUser",
        }
    }
}

/// Operation name plus the exact parameter values that affect the result.
///
/// A key with fewer params acts as a prefix: it matches every key of the
/// same kind whose leading params are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    kind: QueryKind,
    params: Vec<String>,
}

impl QueryKey {
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, value: impl ToString) -> Self {
        self.params.push(value.to_string());
        self
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Whether `self` falls under `prefix`.
    pub fn matches(&self, prefix: &QueryKey) -> bool {
        self.kind == prefix.kind && self.params.starts_with(&prefix.params)
    }

    /// Key for one page of the story list.
    pub fn all_stories(query: &PaginationQuery) -> Self {
        let opt = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
        Self::new(QueryKind::AllStories)
            .param(opt(query.page))
            .param(opt(query.per_page))
            .param(&query.filter)
            .param(query.order)
            .param(&query.order_by)
            .param(query.tags.as_ref().map(|t| t.as_str()).unwrap_or_default())
    }

    pub fn story(id: &str) -> Self {
        Self::new(QueryKind::SingleStory).param(id)
    }

    pub fn check_like(id: &str) -> Self {
        Self::new(QueryKind::CheckStoryLike).param(id)
    }

    pub fn stories_by_author(username: &str) -> Self {
        Self::new(QueryKind::StoriesByAuthor).param(username)
    }

    pub fn user_stats() -> Self {
        Self::new(QueryKind::UserStats)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())?;
        for param in &self.params {
            write!(f, "|{param}")?;
        }
        Ok(())
    }
}
