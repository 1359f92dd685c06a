//! API: the HTTP seam between the stores and the poll backend.
//!
//! DESIGN
//! ======
//! Stores talk to the backend through the `ApiClient` trait, which speaks
//! raw JSON values. `HttpApi` is the production implementation; tests swap
//! in a scripted mock. Decoding into typed records happens in the stores so
//! that payloads the stores return verbatim (vote results) stay untouched.

pub mod http;
pub mod types;

pub use http::HttpApi;
pub use types::ApiError;

use reqwest::Method;
use serde_json::Value;

// =============================================================================
// API CLIENT TRAIT
// =============================================================================

/// Async JSON request interface. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    /// Issue one request against `path` (relative to the API base URL).
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails, the backend answers
    /// with a non-success status, or the success body is not JSON.
    async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ApiError>;

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, path, None).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    async fn post(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, path, None).await
    }
}
