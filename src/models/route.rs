//! Client routes.

use std::fmt;

/// A navigable location in the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Stories,
    StoryDetail(String),
    CreateStory,
    EditStory(String),
    Author(String),
    Unauthorized,
    Forbidden,
    NotFound,
}

impl Route {
    /// Resolve a path (query string ignored) to a route.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Home,
            ["products"] => Route::Stories,
            ["products", "create"] => Route::CreateStory,
            ["products", id] => Route::StoryDetail(id.to_string()),
            ["products", id, "edit"] => Route::EditStory(id.to_string()),
            ["user", username] => Route::Author(username.to_string()),
            ["unauthorized"] => Route::Unauthorized,
            ["forbidden"] => Route::Forbidden,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Stories => "/products".to_string(),
            Route::StoryDetail(id) => format!("/products/{id}"),
            Route::CreateStory => "/products/create".to_string(),
            Route::EditStory(id) => format!("/products/{id}/edit"),
            Route::Author(username) => format!("/user/{username}"),
            Route::Unauthorized => "/unauthorized".to_string(),
            Route::Forbidden => "/forbidden".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Status code shown by error pages.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Route::Unauthorized => Some(401),
            Route::Forbidden => Some(403),
            Route::NotFound => Some(404),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
