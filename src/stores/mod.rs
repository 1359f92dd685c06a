//! Client-side state containers.
//!
//! DESIGN
//! ======
//! Each store is an explicit value built from its collaborators (`ApiClient`
//! and, for the session, `KeyValueStore`) and shared by `Arc`. State lives
//! behind a `std::sync::Mutex` that is only held for field updates, never
//! across an `.await`, so concurrent actions interleave at network calls and
//! the last writer wins.

pub mod error;
pub mod polls;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{ErrorKind, StoreError};
pub use polls::{PollState, PollStore};
pub use session::{Session, SessionStore};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::ApiError;

/// Decode a success payload into a typed record.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Parse(e.to_string()))
}
