// src/models/mod.rs

//! Domain models for the story client.
//!
//! This module contains all data structures used throughout the client,
//! organized by their primary purpose.

mod config;
mod query;
mod route;
mod story;

// Re-export all public types
pub use config::{
    ApiConfig, AuthConfig, Config, ENV_BASE_URL, ENV_TOKEN_FILE, FeedConfig, LoggingConfig,
    NotificationConfig, QueryConfig, SearchConfig,
};
pub use query::{
    ALL_TAGS, DEFAULT_ORDER_BY, FilterKey, PaginationQuery, SortOrder, TagFilter, param,
};
pub use route::Route;
pub use story::{
    GeneratedStory, LikeStatus, Story, StoryPatch, StoryPayload, StorySummary, normalize_tags,
};
