//! Typed failures surfaced by the stores.

use crate::api::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Auth,
    Poll,
}

/// A failed store action. `message` is the backend's `error` field when it
/// sent one, otherwise the action's fallback text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{message}")]
    Auth { message: String, status: Option<u16> },

    #[error("{message}")]
    Poll { message: String, status: Option<u16> },
}

impl StoreError {
    pub(crate) fn auth(err: &ApiError, fallback: &str) -> Self {
        Self::Auth { message: surfaced_message(err, fallback), status: err.status() }
    }

    pub(crate) fn poll(err: &ApiError, fallback: &str) -> Self {
        Self::Poll { message: surfaced_message(err, fallback), status: err.status() }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Poll { .. } => ErrorKind::Poll,
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Auth { message, .. } | Self::Poll { message, .. } => message,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Poll { status, .. } => *status,
        }
    }
}

pub(crate) fn surfaced_message(err: &ApiError, fallback: &str) -> String {
    err.backend_message().unwrap_or(fallback).to_owned()
}
