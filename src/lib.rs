//! Client-side state for the poll backend.
//!
//! DESIGN
//! ======
//! Two independent stores sit on top of shared collaborators:
//!
//! - `SessionStore` keeps the auth token and user, mirrored to a
//!   `KeyValueStore` so a later process can restore them.
//! - `PollStore` keeps the poll list, the poll being viewed, a loading
//!   flag, and the last error.
//!
//! Both reach the backend through the `ApiClient` trait. `HttpApi` reads
//! the token from the same storage the session store writes, so auth
//! state flows to requests without the stores knowing about headers.

pub mod api;
pub mod config;
pub mod models;
pub mod storage;
pub mod stores;

pub use api::{ApiClient, ApiError, HttpApi};
pub use config::{ClientConfig, ConfigError};
pub use storage::{FileStorage, KeyValueStore, MemoryStorage};
pub use stores::{ErrorKind, PollState, PollStore, Session, SessionStore, StoreError};
