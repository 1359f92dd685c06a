//! Poll store: the poll list, the poll being viewed, and action status.
//!
//! DESIGN
//! ======
//! Every action issues exactly one request. List-shaping actions (fetch,
//! create, delete) update `polls` on success; all failures record the
//! surfaced message in `error`. Only `fetch_polls` absorbs its failure; the
//! rest also return it to the caller.
//!
//! `loading` is a single flag, not a counter. Fetches and creates raise it
//! for their duration; votes, result lookups, and deletes leave it alone.

#[cfg(test)]
#[path = "polls_test.rs"]
mod tests;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, warn};

use super::{StoreError, decode};
use crate::api::{ApiClient, ApiError};
use crate::models::{CreatePollRequest, Poll, VoteRequest};

const FETCH_POLLS_FAILED: &str = "Failed to fetch polls";
const FETCH_POLL_FAILED: &str = "Failed to fetch poll";
const CREATE_POLL_FAILED: &str = "Failed to create poll";
const VOTE_FAILED: &str = "Failed to vote";
const RESULTS_FAILED: &str = "Failed to get results";
const DELETE_POLL_FAILED: &str = "Failed to delete poll";

/// Observable poll state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollState {
    /// Display order; new polls are prepended.
    pub polls: Vec<Poll>,
    pub current_poll: Option<Poll>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct PollStore {
    api: Arc<dyn ApiClient>,
    state: Mutex<PollState>,
}

impl PollStore {
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self { api, state: Mutex::new(PollState::default()) }
    }

    // =========================================================================
    // READERS
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> PollState {
        self.lock().clone()
    }

    #[must_use]
    pub fn polls(&self) -> Vec<Poll> {
        self.lock().polls.clone()
    }

    #[must_use]
    pub fn current_poll(&self) -> Option<Poll> {
        self.lock().current_poll.clone()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.lock().loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.lock().error = None;
    }

    pub fn clear_current_poll(&self) {
        self.lock().current_poll = None;
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Replace the poll list with the backend's. Failures land in `error`
    /// only.
    pub async fn fetch_polls(&self) {
        debug!("fetching polls");
        let _loading = self.begin_loading();

        // The backend encodes an empty list as `null`.
        match self.api.get("/polls").await.and_then(decode::<Option<Vec<Poll>>>) {
            Ok(polls) => {
                let mut state = self.lock();
                state.polls = polls.unwrap_or_default();
                state.error = None;
            }
            Err(e) => {
                self.fail(&e, FETCH_POLLS_FAILED);
            }
        }
    }

    /// Load one poll, with its options, into `current_poll`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poll`] with the backend's message or
    /// `"Failed to fetch poll"`; the same message is left in `error`.
    pub async fn fetch_poll_by_id(&self, id: i64, public: bool) -> Result<Poll, StoreError> {
        debug!(poll_id = id, public, "fetching poll");
        let _loading = self.begin_loading();

        match self.api.get(&poll_path(id, public)).await.and_then(decode::<Poll>) {
            Ok(poll) => {
                let mut state = self.lock();
                state.current_poll = Some(poll.clone());
                state.error = None;
                Ok(poll)
            }
            Err(e) => Err(self.fail(&e, FETCH_POLL_FAILED)),
        }
    }

    /// Create a poll and prepend it to the list.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poll`] with the backend's message or
    /// `"Failed to create poll"`; the same message is left in `error`.
    pub async fn create_poll(&self, request: &CreatePollRequest) -> Result<Poll, StoreError> {
        debug!(title = %request.title, options = request.options.len(), "creating poll");
        let _loading = self.begin_loading();

        let result = match serde_json::to_value(request) {
            Ok(body) => self.api.post("/polls", body).await.and_then(decode::<Poll>),
            Err(e) => Err(ApiError::Parse(e.to_string())),
        };

        match result {
            Ok(poll) => {
                let mut state = self.lock();
                state.polls.insert(0, poll.clone());
                state.error = None;
                Ok(poll)
            }
            Err(e) => Err(self.fail(&e, CREATE_POLL_FAILED)),
        }
    }

    /// Cast a vote. The backend's response body is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poll`] with the backend's message or
    /// `"Failed to vote"`; the same message is left in `error`.
    pub async fn vote_poll(&self, vote: &VoteRequest, public: bool) -> Result<Value, StoreError> {
        debug!(poll_id = vote.poll_id, option_id = vote.option_id, public, "voting");

        let result = match serde_json::to_value(vote) {
            Ok(body) => self.api.post(vote_path(public), body).await,
            Err(e) => Err(ApiError::Parse(e.to_string())),
        };

        match result {
            Ok(body) => {
                self.lock().error = None;
                Ok(body)
            }
            Err(e) => Err(self.fail(&e, VOTE_FAILED)),
        }
    }

    /// Fetch a poll with per-option vote counts. The backend's response
    /// body is returned untouched. Does not touch `current_poll`, and a
    /// success does not clear `error`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poll`] with the backend's message or
    /// `"Failed to get results"`; the same message is left in `error`.
    pub async fn get_poll_results(&self, id: i64, public: bool) -> Result<Value, StoreError> {
        debug!(poll_id = id, public, "fetching results");
        self.api
            .get(&results_path(id, public))
            .await
            .map_err(|e| self.fail(&e, RESULTS_FAILED))
    }

    /// Delete a poll and drop it from the list. Deleting an id that is not
    /// in the list leaves the list unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poll`] with the backend's message or
    /// `"Failed to delete poll"`; the same message is left in `error`.
    pub async fn delete_poll(&self, id: i64) -> Result<(), StoreError> {
        debug!(poll_id = id, "deleting poll");
        match self.api.delete(&poll_path(id, false)).await {
            Ok(_) => {
                let mut state = self.lock();
                state.polls.retain(|p| p.id() != id);
                state.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail(&e, DELETE_POLL_FAILED)),
        }
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    fn fail(&self, err: &ApiError, fallback: &str) -> StoreError {
        let err = StoreError::poll(err, fallback);
        warn!(status = ?err.status(), message = err.message(), "poll action failed");
        self.lock().error = Some(err.message().to_owned());
        err
    }

    fn begin_loading(&self) -> LoadingGuard<'_> {
        self.lock().loading = true;
        LoadingGuard { state: &self.state }
    }

    fn lock(&self) -> MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lowers `loading` when the action finishes, including when its future is
/// dropped mid-request.
struct LoadingGuard<'a> {
    state: &'a Mutex<PollState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).loading = false;
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

fn poll_path(id: i64, public: bool) -> String {
    if public { format!("/public/polls/{id}") } else { format!("/polls/{id}") }
}

fn results_path(id: i64, public: bool) -> String {
    format!("{}/results", poll_path(id, public))
}

fn vote_path(public: bool) -> &'static str {
    if public { "/public/vote" } else { "/vote" }
}
