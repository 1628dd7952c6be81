// src/testing.rs

//! In-memory backend speaking the story REST contract, for tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Method;
use serde_json::{Value, json};
use url::Url;

use crate::error::Result;
use crate::models::{Config, Story};
use crate::services::StoryApi;
use crate::storage::MemoryTokenStore;
use crate::utils::http::{ApiRequest, ApiResponse, HttpClient, Transport};

pub(crate) const BASE_URL: &str = "http://fake.local/api/v1";
const API_ROOT: &str = "/api/v1";

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    /// Path relative to the API root, e.g. `/products/1`
    pub path: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub body: Option<Value>,
}

struct Failure {
    method: Method,
    path: String,
    status: u16,
}

/// Pause point for one request: `arrived` fires once the backend has
/// answered it, and the answer is delivered after `release`.
#[derive(Default)]
pub(crate) struct Hold {
    pub arrived: Notify,
    pub release: Notify,
}

#[derive(Default)]
struct State {
    stories: Vec<Story>,
    liked: HashSet<String>,
    next_id: i64,
    failures: Vec<Failure>,
    holds: Vec<(Method, String, Arc<Hold>)>,
    requests: Vec<RecordedRequest>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Backend preloaded with `count` stories titled `Story 1..=count`.
    pub fn with_stories(count: usize) -> Arc<Self> {
        let backend = Self::new();
        for i in 1..=count {
            backend.insert(&format!("Story {i}"), "seeded", &["seed"]);
        }
        backend
    }

    pub fn insert(&self, title: &str, description: &str, tags: &[&str]) -> Story {
        let mut state = self.state.lock().unwrap();
        let story = state.new_story(
            title.to_string(),
            description.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        state.stories.push(story.clone());
        story
    }

    /// Answer every `method` request to `path` with `status` until cleared.
    pub fn fail(&self, method: Method, path: &str, status: u16) {
        self.state.lock().unwrap().failures.push(Failure {
            method,
            path: path.to_string(),
            status,
        });
    }

    /// Hold the response to the next `method` request to `path`.
    pub fn hold(&self, method: Method, path: &str) -> Arc<Hold> {
        let hold = Arc::new(Hold::default());
        self.state
            .lock()
            .unwrap()
            .holds
            .push((method, path.to_string(), hold.clone()));
        hold
    }

    fn take_hold(&self, request: &RecordedRequest) -> Option<Arc<Hold>> {
        let mut state = self.state.lock().unwrap();
        let index = state
            .holds
            .iter()
            .position(|(method, path, _)| *method == request.method && *path == request.path)?;
        Some(state.holds.remove(index).2)
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self, method: &Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }

    pub fn stored(&self, id: &str) -> Option<Story> {
        self.state
            .lock()
            .unwrap()
            .stories
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    fn handle(&self, request: &ApiRequest) -> ApiResponse {
        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(_) => return respond(400, json!({"message": "bad url"})),
        };
        let path = url
            .path()
            .strip_prefix(API_ROOT)
            .unwrap_or(url.path())
            .to_string();

        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        state.requests.push(RecordedRequest {
            method: request.method.clone(),
            path: path.clone(),
            query: url.query().map(str::to_string),
            token: request.bearer_token().map(str::to_string),
            body: request.body.clone(),
        });

        if let Some(failure) = state
            .failures
            .iter()
            .find(|f| f.method == request.method && f.path == path)
        {
            return respond(failure.status, json!({"message": "injected failure"}));
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let body = request.body.clone().unwrap_or(Value::Null);

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["products"]) => {
                let stories = state.list(&url);
                respond(200, json!(stories))
            }
            ("POST", ["products"]) => {
                let tags = body["tags"]
                    .as_array()
                    .map(|a| {
                        a.iter()
                            .filter_map(|t| t.as_str().map(str::to_string))
                            .collect()
                    })
                    .unwrap_or_default();
                let story = state.new_story(
                    body["title"].as_str().unwrap_or_default().to_string(),
                    body["description"].as_str().unwrap_or_default().to_string(),
                    tags,
                );
                state.stories.push(story.clone());
                respond(201, json!(story))
            }
            ("POST", ["products", "summarize"]) => {
                let description = body["description"].as_str().unwrap_or_default();
                let summary: String = description.chars().take(12).collect();
                respond(200, json!({ "summary": summary }))
            }
            ("POST", ["products", "generate"]) => respond(
                200,
                json!({
                    "title": format!("{} (expanded)", body["title"].as_str().unwrap_or_default()),
                    "description": body["description"],
                }),
            ),
            ("GET", ["products", "author", username]) => {
                let stories: Vec<&Story> = state
                    .stories
                    .iter()
                    .filter(|s| s.author_username == *username)
                    .collect();
                respond(200, json!(stories))
            }
            ("GET", ["products", id]) => match state.find(id) {
                Some(story) => respond(200, json!(story)),
                None => not_found(),
            },
            ("PATCH", ["products", id]) => {
                let Some(story) = state.stories.iter_mut().find(|s| s.id == *id) else {
                    return not_found();
                };
                if let Some(title) = body["title"].as_str() {
                    story.title = title.to_string();
                }
                if let Some(description) = body["description"].as_str() {
                    story.description = description.to_string();
                }
                if let Some(tags) = body["tags"].as_array() {
                    story.tags = tags
                        .iter()
                        .filter_map(|t| t.as_str().map(str::to_string))
                        .collect();
                }
                respond(200, json!(story))
            }
            ("DELETE", ["products", id]) => {
                let before = state.stories.len();
                state.stories.retain(|s| s.id != *id);
                if state.stories.len() == before {
                    not_found()
                } else {
                    ApiResponse {
                        status: 204,
                        body: String::new(),
                    }
                }
            }
            ("POST", ["products", id, "like"]) => {
                let id = id.to_string();
                let liked = !state.liked.contains(&id);
                let Some(story) = state.stories.iter_mut().find(|s| s.id == id) else {
                    return not_found();
                };
                if liked {
                    story.likes += 1;
                    state.liked.insert(id);
                } else {
                    story.likes = story.likes.saturating_sub(1);
                    state.liked.remove(&id);
                }
                ApiResponse {
                    status: 200,
                    body: String::new(),
                }
            }
            ("GET", ["products", id, "like"]) => {
                let liked = state.liked.contains(*id);
                respond(200, json!({ "liked": liked }))
            }
            _ => not_found(),
        }
    }
}

impl State {
    fn new_story(&mut self, title: String, description: String, tags: Vec<String>) -> Story {
        self.next_id += 1;
        Story {
            id: self.next_id.to_string(),
            title,
            description,
            summary: None,
            author_id: "u1".to_string(),
            author_name: "Test Author".to_string(),
            author_username: "tester".to_string(),
            date: None,
            created_at: DateTime::from_timestamp(1_700_000_000 + self.next_id, 0),
            tags,
            likes: 0,
        }
    }

    fn find(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    fn list(&self, url: &Url) -> Vec<Story> {
        let mut text = None;
        let mut tag = None;
        let mut order = None;
        let mut page = 1usize;
        let mut per_page = usize::MAX;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "filter" => {
                    for clause in value.split(',') {
                        let parts: Vec<&str> = clause.splitn(3, ':').collect();
                        match parts.as_slice() {
                            ["title", "ilike", v] => text = Some(v.to_lowercase()),
                            ["tags", "in", v] => tag = Some(v.to_string()),
                            _ => {}
                        }
                    }
                }
                "page" => page = value.parse().unwrap_or(1),
                "per_page" => per_page = value.parse().unwrap_or(usize::MAX),
                "order" => order = Some(value.into_owned()),
                _ => {}
            }
        }

        let mut stories: Vec<Story> = self
            .stories
            .iter()
            .filter(|s| {
                text.as_ref().is_none_or(|t| {
                    s.title.to_lowercase().contains(t) || s.description.to_lowercase().contains(t)
                })
            })
            .filter(|s| tag.as_ref().is_none_or(|t| s.tags.contains(t)))
            .cloned()
            .collect();

        match order.as_deref() {
            Some("title:asc") => stories.sort_by(|a, b| a.title.cmp(&b.title)),
            Some("title:desc") => stories.sort_by(|a, b| b.title.cmp(&a.title)),
            Some("createdAt:desc") => stories.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            _ => stories.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        }

        stories
            .into_iter()
            .skip(page.saturating_sub(1).saturating_mul(per_page))
            .take(per_page)
            .collect()
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.handle(&request);
        let recorded = self.state.lock().unwrap().requests.last().cloned();
        if let Some(hold) = recorded.and_then(|r| self.take_hold(&r)) {
            hold.arrived.notify_one();
            hold.release.notified().await;
        }
        Ok(response)
    }
}

fn respond(status: u16, body: Value) -> ApiResponse {
    ApiResponse {
        status,
        body: body.to_string(),
    }
}

fn not_found() -> ApiResponse {
    respond(404, json!({"message": "not found"}))
}

/// Configuration pointing at the fake backend.
pub(crate) fn config() -> Config {
    let mut config = Config::default();
    config.api.base_url = BASE_URL.to_string();
    config
}

/// Story API wired to `backend` with a logged-in token.
pub(crate) fn story_api(backend: Arc<FakeBackend>) -> StoryApi {
    let http = HttpClient::new(backend, Arc::new(MemoryTokenStore::with_token("test-token")));
    StoryApi::new(http, &config().api).unwrap()
}
