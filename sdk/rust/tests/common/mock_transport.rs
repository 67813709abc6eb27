use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use cookbook_sdk::transport::{ApiRequest, HttpMethod, HttpTransport};
use cookbook_sdk::{ClientError, LoadingState, Result};

#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(Value),
    Status(u16),
}

#[derive(Debug, Clone)]
pub struct MethodCall {
    pub request: ApiRequest,
    pub loading: Option<bool>,
}

/// Scripted transport. Responses are keyed by method and path; the last scripted
/// response for a route keeps answering once earlier ones are used up.
pub struct MockTransport {
    responses: Mutex<HashMap<(HttpMethod, String), Vec<MockResponse>>>,
    observed: Mutex<Option<LoadingState>>,
    pub calls: Mutex<Vec<MethodCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            observed: Mutex::new(None),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn respond(&self, method: HttpMethod, path: &str, response: MockResponse) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push(response);
        self
    }

    pub fn respond_json(&self, method: HttpMethod, path: &str, body: Value) -> &Self {
        self.respond(method, path, MockResponse::Json(body))
    }

    pub fn fail(&self, method: HttpMethod, path: &str, status: u16) -> &Self {
        self.respond(method, path, MockResponse::Status(status))
    }

    /// Records the loading flag as seen from inside each call.
    pub fn observe_loading(&self, loading: LoadingState) {
        *self.observed.lock().unwrap() = Some(loading);
    }

    pub fn calls(&self) -> Vec<MethodCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.calls().into_iter().map(|c| c.request).collect()
    }

    pub fn get_calls_for(&self, method: HttpMethod, path: &str) -> Vec<MethodCall> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.request.method == method && c.request.path == path)
            .cloned()
            .collect()
    }

    fn next_response(&self, request: &ApiRequest) -> Option<MockResponse> {
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&(request.method, request.path.clone()))?;
        if queue.len() > 1 {
            Some(queue.remove(0))
        } else {
            queue.first().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<Value> {
        let loading = self
            .observed
            .lock()
            .unwrap()
            .as_ref()
            .map(LoadingState::is_loading);
        self.calls.lock().unwrap().push(MethodCall {
            request: request.clone(),
            loading,
        });

        match self.next_response(request) {
            Some(MockResponse::Json(body)) => Ok(body),
            Some(MockResponse::Status(status)) => Err(ClientError::Api {
                status,
                message: format!("mock status {}", status),
            }),
            None => Err(ClientError::Api {
                status: 404,
                message: format!("no mock for {} {}", request.method, request.path),
            }),
        }
    }
}
