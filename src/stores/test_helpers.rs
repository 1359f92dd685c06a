//! Scripted [`ApiClient`] for store tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use reqwest::Method;
use serde_json::Value;

use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Replays queued responses in order and records every request.
/// An exhausted queue answers with a transport error.
pub struct MockApi {
    responses: Mutex<VecDeque<Result<Value, ApiError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockApi {
    pub fn new(responses: Vec<Result<Value, ApiError>>) -> Self {
        Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("mock mutex should lock").clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().pop().expect("at least one request recorded")
    }
}

#[async_trait::async_trait]
impl ApiClient for MockApi {
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError> {
        self.requests
            .lock()
            .expect("mock mutex should lock")
            .push(RecordedRequest { method, path: path.to_owned(), body });
        self.responses
            .lock()
            .expect("mock mutex should lock")
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response".into())))
    }
}

/// Backend error with a structured `error` body.
pub fn backend_error(status: u16, message: &str) -> ApiError {
    ApiError::Response { status, message: Some(message.to_owned()) }
}

/// Backend error with no structured body.
pub fn bare_error(status: u16) -> ApiError {
    ApiError::Response { status, message: None }
}
