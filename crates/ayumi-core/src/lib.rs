//! Ayumi core: a local-first childcare episode journal.
//!
//! The whole journal lives in one durable key-value slot as a single JSON
//! array. [`store::EpisodeStore`] owns the in-memory collection, loads it
//! once at construction and writes it back in full on every mutation. The
//! callers (a CLI, a UI layer) only go through the store's operations and
//! re-render from their return values.

pub mod config;
pub mod error;
pub mod model;
pub mod storage;
pub mod store;

pub use error::{AyumiError, Result};
pub use model::{Episode, EpisodeFilter, EpisodeInput, Stats, SupportLevel};
pub use storage::{create_backend, Storage, StorageBackend};
pub use store::EpisodeStore;
