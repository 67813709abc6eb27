use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::telemetry::RequestBuilderExt;
use shared::ApiConfig;
use std::fmt;
use tracing::{debug, error};

use crate::error::{ClientError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    /// Query-string pairs; repeated keys carry list values.
    Query(Vec<(String, String)>),
    Body(Value),
}

/// One outbound call against the recipe API. Paths are relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub payload: Payload,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            payload: Payload::Empty,
        }
    }

    pub fn get_with_query(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            payload: Payload::Query(query),
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            payload: Payload::Body(body),
        }
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Put,
            path: path.into(),
            payload: Payload::Body(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            path: path.into(),
            payload: Payload::Empty,
        }
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        match &self.payload {
            Payload::Query(pairs) => pairs,
            _ => &[],
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Body(body) => Some(body),
            _ => None,
        }
    }

    /// Encoded query string without the leading `?`.
    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

/// The HTTP seam. Everything above it speaks `ApiRequest` and JSON.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issues exactly one request. Success bodies are returned as JSON; an empty body is `Null`.
    async fn send(&self, request: &ApiRequest) -> Result<Value>;
}

pub async fn send_json<T>(transport: &dyn HttpTransport, request: &ApiRequest) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = transport.send(request).await?;
    serde_json::from_value(value).map_err(|e| {
        ClientError::InvalidResponse(format!(
            "{} {}: {}",
            request.method, request.path, e
        ))
    })
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl ReqwestTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::from_config(&ApiConfig::new(base_url))
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn builder(&self, request: &ApiRequest) -> RequestBuilder {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Patch => self.client.patch(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        builder = match &request.payload {
            Payload::Empty => builder,
            Payload::Query(pairs) => builder.query(pairs),
            Payload::Body(body) => builder.json(body),
        };

        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        builder
            .header("Accept", "application/json")
            .with_trace_context()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value> {
        debug!("{} {}", request.method, self.url(&request.path));

        let response = self
            .builder(request)
            .send()
            .await
            .map_err(|e| ClientError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                "{} {} failed: {} - {}",
                request.method, request.path, status, body
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_string_repeats_list_keys() {
        let request = ApiRequest::get_with_query(
            "/recipes/",
            vec![
                ("tags".to_string(), "quick".to_string()),
                ("tags".to_string(), "vegan & gluten-free".to_string()),
                ("ordering".to_string(), "newest".to_string()),
            ],
        );

        assert_eq!(
            request.query_string(),
            "tags=quick&tags=vegan+%26+gluten-free&ordering=newest"
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn test_body_accessors() {
        let request = ApiRequest::post("/recipes/search/advanced/", json!({"page": 1}));
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body(), Some(&json!({"page": 1})));
        assert!(request.query_pairs().is_empty());
        assert_eq!(request.query_string(), "");
    }

    #[test]
    fn test_url_joining() {
        let transport = ReqwestTransport::new("http://localhost:8000/api/v1/").unwrap();
        assert_eq!(
            transport.url("/recipes/"),
            "http://localhost:8000/api/v1/recipes/"
        );
        assert_eq!(
            transport.url("categories/"),
            "http://localhost:8000/api/v1/categories/"
        );
    }
}
