//! Utility functions and helpers.

pub mod http;
pub mod params;

use url::Url;

use crate::error::{AppError, Result};

/// Append path segments to a base URL, percent-encoding each segment.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| AppError::config(format!("'{base}' cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Attach an already-encoded query string.
pub fn with_query(mut url: Url, query: &str) -> Url {
    url.set_query((!query.is_empty()).then_some(query));
    url
}
