// src/services/stories.rs

//! Story resource API.
//!
//! One method per backend endpoint. Errors are not caught here; they
//! propagate to the query client.

use reqwest::Method;
use serde_json::json;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    ApiConfig, GeneratedStory, LikeStatus, PaginationQuery, Story, StoryPatch, StoryPayload,
    StorySummary,
};
use crate::utils::http::HttpClient;
use crate::utils::{endpoint_url, with_query};

/// Client for the story collection endpoints.
#[derive(Clone)]
pub struct StoryApi {
    http: HttpClient,
    base: Url,
    resource: Vec<String>,
}

impl StoryApi {
    pub fn new(http: HttpClient, config: &ApiConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.trim())?;
        let resource: Vec<String> = config
            .resource
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if resource.is_empty() {
            return Err(AppError::config("api.resource is empty"));
        }
        Ok(Self {
            http,
            base,
            resource,
        })
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut all: Vec<&str> = self.resource.iter().map(String::as_str).collect();
        all.extend_from_slice(segments);
        endpoint_url(&self.base, &all)
    }

    pub async fn create(&self, payload: &StoryPayload) -> Result<Story> {
        let url = self.url(&[])?;
        self.http
            .request(Method::POST, url.as_str(), Some(payload))
            .await
    }

    pub async fn get_all(&self, query: &PaginationQuery) -> Result<Vec<Story>> {
        let url = with_query(self.url(&[])?, &query.encode());
        self.http.send(Method::GET, url.as_str()).await
    }

    pub async fn get_single(&self, id: &str) -> Result<Story> {
        let url = self.url(&[id])?;
        self.http.send(Method::GET, url.as_str()).await
    }

    pub async fn update(&self, id: &str, patch: &StoryPatch) -> Result<Story> {
        let url = self.url(&[id])?;
        self.http
            .request(Method::PATCH, url.as_str(), Some(patch))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self.url(&[id])?;
        self.http.send(Method::DELETE, url.as_str()).await
    }

    pub async fn summarize(&self, description: &str) -> Result<StorySummary> {
        let url = self.url(&["summarize"])?;
        self.http
            .request(
                Method::POST,
                url.as_str(),
                Some(&json!({ "description": description })),
            )
            .await
    }

    pub async fn generate(&self, title: &str, description: &str) -> Result<GeneratedStory> {
        let url = self.url(&["generate"])?;
        let generated: GeneratedStory = self
            .http
            .request(
                Method::POST,
                url.as_str(),
                Some(&json!({ "title": title, "description": description })),
            )
            .await?;
        log::debug!("Generated story: {}", generated.title);
        Ok(generated)
    }

    pub async fn get_all_by_author(&self, username: &str) -> Result<Vec<Story>> {
        let url = self.url(&["author", username])?;
        self.http.send(Method::GET, url.as_str()).await
    }

    pub async fn toggle_like(&self, id: &str) -> Result<()> {
        let url = self.url(&[id, "like"])?;
        self.http.send(Method::POST, url.as_str()).await
    }

    pub async fn check_like(&self, id: &str) -> Result<LikeStatus> {
        let url = self.url(&[id, "like"])?;
        self.http.send(Method::GET, url.as_str()).await
    }
}
