// src/utils/http.rs

//! HTTP client utilities.
//!
//! `HttpClient` is the single request function every API call goes
//! through. The network itself sits behind the `Transport` trait so the
//! layers above can run against an in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::ApiConfig;
use crate::storage::TokenStore;

/// A fully prepared request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Bearer token carried by the request, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

/// Raw response: status plus undecoded body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network seam.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Create a configured asynchronous HTTP client.
///
/// Without `timeout_secs` requests wait indefinitely.
pub fn create_async_client(config: &ApiConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// `Transport` backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}

/// JSON request wrapper that attaches the stored bearer token.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { transport, tokens }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Issue a request without a body.
    pub async fn send<T: DeserializeOwned>(&self, method: Method, url: &str) -> Result<T> {
        self.request::<T, ()>(method, url, None).await
    }

    /// Issue a request and decode the JSON response.
    ///
    /// Non-2xx answers become `AppError::Status`. An empty body decodes as
    /// `null`, so `T = ()` works for endpoints that return nothing.
    pub async fn request<T, B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.load_token().await? {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                AppError::validation("stored token contains characters not allowed in a header")
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let body = body.map(serde_json::to_value).transpose()?;
        let request = ApiRequest {
            method: method.clone(),
            url: url.to_string(),
            headers,
            body,
        };

        log::debug!("{} {}", method, url);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            log::debug!("{} {} -> {}", method, url, response.status);
            return Err(AppError::status(response.status, url, response.body));
        }

        let text = response.body.trim();
        let text = if text.is_empty() { "null" } else { text };
        Ok(serde_json::from_str(text)?)
    }
}
