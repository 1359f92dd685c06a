//! Wire records exchanged with the poll backend.
//!
//! `User` keeps unrecognized fields in a flattened `extra` map. `Poll` is
//! held verbatim and only its `id` is interpreted, so a round trip through
//! this crate never adds, drops, or rewrites backend data.

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// SESSION
// =============================================================================

/// Profile of the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload returned by `POST /login` and `POST /register`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// POLLS
// =============================================================================

/// A voteable question, kept as the backend sent it.
///
/// Only `id` is interpreted on decode. The accessors below are read-only
/// views over the raw fields, so serializing a `Poll` emits exactly the
/// object that was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Poll {
    id: i64,
    fields: Map<String, Value>,
}

impl TryFrom<Map<String, Value>> for Poll {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = fields
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| "poll record has no integer `id`".to_owned())?;
        Ok(Self { id, fields })
    }
}

impl From<Poll> for Map<String, Value> {
    fn from(poll: Poll) -> Self {
        poll.fields
    }
}

impl Poll {
    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Raw field as sent by the backend.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.get("title").and_then(Value::as_str)
    }

    /// `total_votes`, or `0` when absent or not an integer.
    #[must_use]
    pub fn total_votes(&self) -> i64 {
        self.get("total_votes").and_then(Value::as_i64).unwrap_or(0)
    }

    /// Options that decode as [`PollOption`]; malformed entries are skipped.
    #[must_use]
    pub fn options(&self) -> Vec<PollOption> {
        self.get("options")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Percentage of `total_votes` cast for `option_id`, in `0.0..=100.0`.
    ///
    /// Returns `0.0` when no votes have been cast or the option is not part
    /// of this poll.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn vote_share(&self, option_id: i64) -> f64 {
        let total = self.total_votes();
        if total <= 0 {
            return 0.0;
        }
        let Some(option) = self.options().into_iter().find(|o| o.id == option_id) else {
            return 0.0;
        };
        (option.vote_count as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: i64,
    #[serde(default)]
    pub poll_id: i64,
    #[serde(default)]
    pub option_text: String,
    #[serde(default)]
    pub vote_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePollRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub poll_id: i64,
    pub option_id: i64,
}
