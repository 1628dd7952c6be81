//! Story data structures.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A story as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Unique identifier
    pub id: String,

    pub title: String,

    pub description: String,

    /// Generated summary, if one was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default)]
    pub author_id: String,

    /// Author display name
    #[serde(default)]
    pub author_name: String,

    #[serde(default)]
    pub author_username: String,

    /// Display date as sent by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub likes: u64,
}

impl Story {
    /// Format story for display using a template.
    ///
    /// Supported placeholders:
    /// - `{id}`, `{title}`, `{author}`, `{username}`
    /// - `{likes}`, `{tags}`, `{created}`
    pub fn format(&self, template: &str) -> String {
        let created = self
            .created_at
            .map(|ts| ts.format("%Y-%m-%d").to_string())
            .or_else(|| self.date.clone())
            .unwrap_or_default();

        template
            .replace("{id}", &self.id)
            .replace("{title}", &self.title)
            .replace("{author}", &self.author_name)
            .replace("{username}", &self.author_username)
            .replace("{likes}", &self.likes.to_string())
            .replace("{tags}", &self.tags.join(", "))
            .replace("{created}", &created)
    }
}

/// Body of a create request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryPayload {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl StoryPayload {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags: normalize_tags(tags),
        }
    }
}

/// Body of an update request. Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl StoryPatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = Some(normalize_tags(tags));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

/// Title and description proposed by the generate endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedStory {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorySummary {
    pub summary: String,
}

/// Whether the current user likes a story.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeStatus {
    pub liked: bool,
}

/// Trim, drop empties and deduplicate while keeping first-seen order.
pub fn normalize_tags(tags: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.into().trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
