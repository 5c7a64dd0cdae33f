//! In-memory transport for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::Entries;
use crate::transport::{ApiRequest, ApiResponse, Method, Transport, TransportError};

struct Route {
    method: Method,
    path: String,
    outcome: Result<ApiResponse, TransportError>,
}

/// Records every request and answers from registered routes. Unrouted
/// requests get `200` with an empty body.
#[derive(Default)]
pub struct ScriptedTransport {
    requests: Mutex<Vec<ApiRequest>>,
    routes: Mutex<Vec<Route>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: &str) {
        self.route(method, path, Ok(ApiResponse::new(status, body)));
    }

    pub fn fail(&self, method: Method, path: &str, error: TransportError) {
        self.route(method, path, Err(error));
    }

    fn route(&self, method: Method, path: &str, outcome: Result<ApiResponse, TransportError>) {
        self.routes.lock().unwrap().push(Route {
            method,
            path: path.to_string(),
            outcome,
        });
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }

    /// Request bodies in call order; `Null` for requests without a body.
    pub fn bodies(&self) -> Vec<Value> {
        self.requests()
            .into_iter()
            .map(|r| r.body.unwrap_or(Value::Null))
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let outcome = self
            .routes
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.method == request.method && r.path == request.path)
            .map(|r| r.outcome.clone())
            .unwrap_or_else(|| Ok(ApiResponse::new(200, "")));
        self.requests.lock().unwrap().push(request);
        outcome
    }
}

pub fn entries(pairs: &[(&str, &str)]) -> Entries {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
