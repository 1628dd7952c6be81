// src/cache/invalidation.rs

//! Which cached queries each mutation or read makes stale.
//!
//! The table is data: every event maps to an ordered list of rules, and
//! [`apply`] runs them against the cache.

use crate::cache::key::{QueryKey, QueryKind};
use crate::cache::store::QueryCache;

/// Something that happened to a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Created,
    Updated,
    Deleted,
    LikeToggled,
    /// A single story was fetched successfully
    StoryLoaded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheAction {
    /// Mark stale; the next read refetches
    Invalidate,
    /// Drop entirely
    Remove,
}

/// Which family of keys a rule touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTarget {
    AllStories,
    StoriesByAuthor,
    UserStats,
    SingleUser,
    /// Narrowed to the event's story when one is given
    SingleStory,
    /// Narrowed to the event's story when one is given
    CheckStoryLike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRule {
    pub action: CacheAction,
    pub target: CacheTarget,
}

/// Identifiers that narrow scoped targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheScope<'a> {
    pub story_id: Option<&'a str>,
    pub author: Option<&'a str>,
}

impl<'a> CacheScope<'a> {
    pub fn story(id: &'a str) -> Self {
        Self {
            story_id: Some(id),
            author: None,
        }
    }

    pub fn author(mut self, username: &'a str) -> Self {
        self.author = Some(username);
        self
    }
}

impl CacheTarget {
    /// Prefix key for this target under `scope`.
    pub fn key(&self, scope: &CacheScope<'_>) -> QueryKey {
        let scoped = |kind: QueryKind, value: Option<&str>| match value {
            Some(v) if !v.is_empty() => QueryKey::new(kind).param(v),
            _ => QueryKey::new(kind),
        };
        match self {
            CacheTarget::AllStories => QueryKey::new(QueryKind::AllStories),
            CacheTarget::StoriesByAuthor => scoped(QueryKind::StoriesByAuthor, scope.author),
            CacheTarget::UserStats => QueryKey::new(QueryKind::UserStats),
            CacheTarget::SingleUser => QueryKey::new(QueryKind::SingleUser),
            CacheTarget::SingleStory => scoped(QueryKind::SingleStory, scope.story_id),
            CacheTarget::CheckStoryLike => scoped(QueryKind::CheckStoryLike, scope.story_id),
        }
    }
}

const fn invalidate(target: CacheTarget) -> CacheRule {
    CacheRule {
        action: CacheAction::Invalidate,
        target,
    }
}

const fn remove(target: CacheTarget) -> CacheRule {
    CacheRule {
        action: CacheAction::Remove,
        target,
    }
}

const CREATED: &[CacheRule] = &[
    remove(CacheTarget::AllStories),
    invalidate(CacheTarget::AllStories),
    invalidate(CacheTarget::StoriesByAuthor),
    invalidate(CacheTarget::UserStats),
];

const UPDATED: &[CacheRule] = &[
    invalidate(CacheTarget::AllStories),
    invalidate(CacheTarget::SingleStory),
    invalidate(CacheTarget::StoriesByAuthor),
];

const DELETED: &[CacheRule] = &[
    invalidate(CacheTarget::AllStories),
    invalidate(CacheTarget::StoriesByAuthor),
    invalidate(CacheTarget::UserStats),
];

const LIKE_TOGGLED: &[CacheRule] = &[
    invalidate(CacheTarget::AllStories),
    invalidate(CacheTarget::CheckStoryLike),
    invalidate(CacheTarget::SingleStory),
];

const STORY_LOADED: &[CacheRule] = &[
    invalidate(CacheTarget::StoriesByAuthor),
    invalidate(CacheTarget::SingleUser),
    invalidate(CacheTarget::UserStats),
    invalidate(CacheTarget::CheckStoryLike),
];

pub fn rules_for(event: CacheEvent) -> &'static [CacheRule] {
    match event {
        CacheEvent::Created => CREATED,
        CacheEvent::Updated => UPDATED,
        CacheEvent::Deleted => DELETED,
        CacheEvent::LikeToggled => LIKE_TOGGLED,
        CacheEvent::StoryLoaded => STORY_LOADED,
    }
}

/// Run the rules for `event`. Returns how many entries were touched.
pub fn apply(cache: &mut QueryCache, event: CacheEvent, scope: &CacheScope<'_>) -> usize {
    let mut touched = 0;
    for rule in rules_for(event) {
        let prefix = rule.target.key(scope);
        touched += match rule.action {
            CacheAction::Invalidate => cache.invalidate(&prefix),
            CacheAction::Remove => cache.remove(&prefix),
        };
    }
    log::debug!("{:?} touched {} cached queries", event, touched);
    touched
}
