//! Session store: auth token and user, mirrored to durable storage.
//!
//! DESIGN
//! ======
//! Login and register share one code path: post, decode `{ token, user }`,
//! then update memory and storage together. A failed call leaves both
//! untouched. `init_auth` is both-or-nothing: a session is restored only
//! when the token and a parseable user are both persisted.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{StoreError, decode};
use crate::api::{ApiClient, ApiError};
use crate::models::{Credentials, RegisterRequest, SessionData, User};
use crate::storage::{KeyValueStore, TOKEN_KEY, USER_KEY};

const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";

const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";

/// In-memory session state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl Session {
    /// True when both a token and a user are present. An empty token
    /// counts as absent.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty()) && self.user.is_some()
    }
}

pub struct SessionStore {
    api: Arc<dyn ApiClient>,
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<Session>,
}

impl SessionStore {
    /// Create an empty, unauthenticated store. Call [`Self::init_auth`] to
    /// restore a persisted session.
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { api, storage, state: Mutex::new(Session::default()) }
    }

    // =========================================================================
    // READERS
    // =========================================================================

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().token.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.lock().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated
    }

    /// Recomputed from the current token and user on every call.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.lock().is_logged_in()
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Authenticate with username and password.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Auth`] carrying the backend's message, or
    /// `"Login failed"` when none was given. State is unchanged on failure.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionData, StoreError> {
        self.authenticate(LOGIN_PATH, credentials, LOGIN_FAILED).await
    }

    /// Create an account and start a session for it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Auth`] carrying the backend's message, or
    /// `"Registration failed"` when none was given. State is unchanged on
    /// failure.
    pub async fn register(&self, request: &RegisterRequest) -> Result<SessionData, StoreError> {
        self.authenticate(REGISTER_PATH, request, REGISTER_FAILED).await
    }

    /// Drop the session from memory and storage.
    pub fn logout(&self) {
        {
            let mut state = self.lock();
            *state = Session::default();
        }
        self.storage.remove(TOKEN_KEY);
        self.storage.remove(USER_KEY);
        info!("session cleared");
    }

    /// Restore a persisted session, if one is complete and readable.
    ///
    /// A persisted user that does not decode counts as no session: memory
    /// stays empty and storage is left as found.
    pub fn init_auth(&self) {
        let token = self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let raw_user = self.storage.get(USER_KEY).filter(|u| !u.is_empty());
        let (Some(token), Some(raw_user)) = (token, raw_user) else {
            debug!("no persisted session");
            return;
        };

        let user: User = match serde_json::from_str(&raw_user) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "persisted user unreadable, ignoring session");
                return;
            }
        };

        info!(user_id = user.id, "session restored");
        let mut state = self.lock();
        state.token = Some(token);
        state.user = Some(user);
        state.is_authenticated = true;
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn authenticate<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<SessionData, StoreError> {
        debug!(path, "authenticating");
        let payload = serde_json::to_value(body)
            .map_err(|e| StoreError::auth(&ApiError::Parse(e.to_string()), fallback))?;

        let data = match self.api.post(path, payload).await.and_then(decode::<SessionData>) {
            Ok(data) => data,
            Err(e) => {
                let err = StoreError::auth(&e, fallback);
                warn!(path, status = ?err.status(), message = err.message(), "authentication failed");
                return Err(err);
            }
        };

        {
            let mut state = self.lock();
            state.token = Some(data.token.clone());
            state.user = Some(data.user.clone());
            state.is_authenticated = true;
        }
        self.persist(&data);

        info!(path, user_id = data.user.id, "session started");
        Ok(data)
    }

    fn persist(&self, data: &SessionData) {
        self.storage.set(TOKEN_KEY, &data.token);
        match serde_json::to_string(&data.user) {
            Ok(raw) => self.storage.set(USER_KEY, &raw),
            Err(e) => warn!(error = %e, "user serialize failed, session not persisted"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
